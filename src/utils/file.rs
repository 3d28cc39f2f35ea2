use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves a path against the working directory unless it is already
/// absolute.
pub fn absolute_from(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Path label for a coverage target. Integral values drop the decimal
/// point so a target of 15 lands in "15x", not "15.0x".
pub fn coverage_label(coverage: f64) -> String {
    if coverage.fract() == 0.0 {
        format!("{}x", coverage as u64)
    } else {
        format!("{}x", coverage)
    }
}

/// Scratch directory for intermediates: {tmp}/{sample}/{label} when an
/// explicit scratch root is given, {out_dir}/{sample}/tmp otherwise.
pub fn workspace_dir(out_dir: &Path, tmp: Option<&Path>, sample: &str, label: &str) -> PathBuf {
    match tmp {
        Some(tmp) => tmp.join(sample).join(label),
        None => out_dir.join(sample).join("tmp"),
    }
}

/// Creates the scratch directory and any missing parents.
pub fn create_workspace(
    out_dir: &Path,
    tmp: Option<&Path>,
    sample: &str,
    label: &str,
) -> Result<PathBuf> {
    let workspace = workspace_dir(out_dir, tmp, sample, label);
    info!("Creating temp folder {}", workspace.display());
    fs::create_dir_all(&workspace)
        .with_context(|| format!("Cannot create temp folder {}", workspace.display()))?;
    Ok(workspace)
}

/// Deletes the scratch directory. This runs on every exit path, so a
/// missing or undeletable directory is only worth a warning.
pub fn remove_workspace(workspace: &Path) {
    info!("Cleaning up, deleting {}", workspace.display());
    if let Err(e) = fs::remove_dir_all(workspace) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Could not delete {}: {}", workspace.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_coverage_label() {
        assert_eq!(coverage_label(15.0), "15x");
        assert_eq!(coverage_label(7.5), "7.5x");
    }

    #[test]
    fn test_workspace_dir_default_mode() {
        let dir = workspace_dir(Path::new("/out"), None, "sample1", "15x");
        assert_eq!(dir, PathBuf::from("/out/sample1/tmp"));
    }

    #[test]
    fn test_workspace_dir_tmp_mode() {
        let dir = workspace_dir(Path::new("/out"), Some(Path::new("/scratch")), "sample1", "15x");
        assert_eq!(dir, PathBuf::from("/scratch/sample1/15x"));
    }

    #[test]
    fn test_create_and_remove_workspace() -> Result<()> {
        let root = TempDir::new()?;
        let workspace = create_workspace(root.path(), None, "sample1", "15x")?;
        assert!(workspace.is_dir());
        fs::write(workspace.join("leftover.bam"), b"x")?;

        remove_workspace(&workspace);
        assert!(!workspace.exists());

        // a second removal is a no-op
        remove_workspace(&workspace);
        Ok(())
    }

    #[test]
    fn test_absolute_from() {
        assert_eq!(
            absolute_from(Path::new("rel/a.bam"), Path::new("/cwd")),
            PathBuf::from("/cwd/rel/a.bam")
        );
        assert_eq!(
            absolute_from(Path::new("/abs/a.bam"), Path::new("/cwd")),
            PathBuf::from("/abs/a.bam")
        );
    }
}
