/// Functions for constructing and running external tool command lines.

use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use tokio::process::Command;

use crate::config::defs::{MOSDEPTH_TAG, SAMBAMBA_TAG, TOOL_VERSIONS};

pub mod sambamba {
    use anyhow::{anyhow, Result};
    use std::path::Path;
    use tokio::process::Command;

    use crate::config::defs::{AlignmentKind, SAMBAMBA_TAG, SUBSAMPLING_SEED};

    pub async fn presence_check() -> Result<String> {
        let output = Command::new(SAMBAMBA_TAG)
            .arg("--version")
            .output()
            .await
            .map_err(|e| {
                anyhow!(
                    "Failed to spawn {}: {}. Is sambamba installed?",
                    SAMBAMBA_TAG,
                    e
                )
            })?;

        // sambamba prints its banner on stderr
        let text = [output.stdout, output.stderr].concat();
        let text = String::from_utf8_lossy(&text);
        let version = text
            .lines()
            .find_map(|line| line.trim().strip_prefix("sambamba "))
            .map(|v| v.split_whitespace().next().unwrap_or_default().to_string())
            .ok_or_else(|| anyhow!("Invalid sambamba --version output"))?;
        if version.is_empty() {
            return Err(anyhow!("Empty version number in sambamba --version output"));
        }
        Ok(version)
    }

    /// Filter handed to sambamba view: always drop unmapped, mate-unmapped
    /// and unpaired reads; drop duplicate-flagged reads unless told not to.
    pub fn filter_expression(skip_dup_rm: bool) -> &'static str {
        if skip_dup_rm {
            "not (unmapped or mate_is_unmapped) and paired"
        } else {
            "not (unmapped or mate_is_unmapped) and paired and not duplicate"
        }
    }

    pub fn view_args(
        input_file: &Path,
        output_file: &Path,
        kind: AlignmentKind,
        skip_dup_rm: bool,
        threads: usize,
    ) -> Vec<String> {
        let mut args_vec: Vec<String> = Vec::new();
        args_vec.push("view".to_string());
        args_vec.push("-F".to_string());
        args_vec.push(filter_expression(skip_dup_rm).to_string());
        args_vec.push("-q".to_string());
        if kind == AlignmentKind::Cram {
            // CRAM has to be inflated on the way through
            args_vec.push("-C".to_string());
        }
        args_vec.push("-f".to_string());
        args_vec.push("bam".to_string());
        args_vec.push("-t".to_string());
        args_vec.push(threads.to_string());
        args_vec.push("-o".to_string());
        args_vec.push(output_file.display().to_string());
        args_vec.push(input_file.display().to_string());
        args_vec
    }

    pub fn subsample_args(input_file: &Path, output_file: &Path, fraction: f64) -> Vec<String> {
        let mut args_vec: Vec<String> = Vec::new();
        args_vec.push("view".to_string());
        args_vec.push("-s".to_string());
        args_vec.push(format!("{:.6}", fraction));
        args_vec.push(format!("--subsampling-seed={}", SUBSAMPLING_SEED));
        args_vec.push("-f".to_string());
        args_vec.push("bam".to_string());
        args_vec.push("-o".to_string());
        args_vec.push(output_file.display().to_string());
        args_vec.push(input_file.display().to_string());
        args_vec
    }
}

pub mod mosdepth {
    use anyhow::{anyhow, Result};
    use std::path::Path;
    use tokio::process::Command;

    use crate::config::defs::MOSDEPTH_TAG;

    pub async fn presence_check() -> Result<String> {
        let output = Command::new(MOSDEPTH_TAG)
            .arg("--version")
            .output()
            .await
            .map_err(|e| {
                anyhow!(
                    "Failed to spawn {}: {}. Is mosdepth installed?",
                    MOSDEPTH_TAG,
                    e
                )
            })?;

        let text = String::from_utf8_lossy(&output.stdout);
        let first_line = text
            .lines()
            .next()
            .ok_or_else(|| anyhow!("No output from mosdepth --version"))?;
        let version = first_line
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| anyhow!("Invalid mosdepth --version output: {}", first_line))?
            .to_string();
        if version.is_empty() {
            return Err(anyhow!(
                "Empty version number in mosdepth --version output: {}",
                first_line
            ));
        }
        Ok(version)
    }

    pub fn depth_args(out_prefix: &Path, input_file: &Path, threads: usize) -> Vec<String> {
        let mut args_vec: Vec<String> = Vec::new();
        args_vec.push("--no-per-base".to_string());
        args_vec.push("--threads".to_string());
        args_vec.push(threads.to_string());
        args_vec.push(out_prefix.display().to_string());
        args_vec.push(input_file.display().to_string());
        args_vec
    }
}

pub async fn check_version(tool: &str) -> Result<String> {
    let version = match tool {
        SAMBAMBA_TAG => sambamba::presence_check().await,
        MOSDEPTH_TAG => mosdepth::presence_check().await,
        _ => return Err(anyhow!("Unknown tool: {}", tool)),
    };
    version
}

/// Verifies every external tool is on the search path before any work
/// starts, logging the version found and warning when it is older than the
/// tested minimum.
pub async fn check_versions() -> Result<()> {
    for tool in [SAMBAMBA_TAG, MOSDEPTH_TAG] {
        let version = check_version(tool).await?;
        info!("Found {} {}", tool, version);
        if let (Some(minimum), Ok(numeric)) = (TOOL_VERSIONS.get(tool), major_minor(&version)) {
            if numeric < *minimum {
                warn!(
                    "{} {} is older than the tested minimum {:.2}",
                    tool, version, minimum
                );
            }
        }
    }
    Ok(())
}

fn major_minor(version: &str) -> Result<f32> {
    let mut parts = version.split('.');
    let major = parts.next().unwrap_or_default();
    let minor = parts.next().unwrap_or("0");
    Ok(format!("{}.{}", major, minor).parse::<f32>()?)
}

/// Runs one external tool to completion, inheriting its stdout/stderr.
/// A non-zero exit is an error; there are no retries.
pub async fn run_tool(tool: &str, args: &[String]) -> Result<()> {
    debug!("{} {}", tool, args.join(" "));
    let status = Command::new(tool)
        .args(args)
        .status()
        .await
        .map_err(|e| anyhow!("Failed to spawn {}: {}. Is {} installed?", tool, e, tool))?;
    if !status.success() {
        return Err(anyhow!("{} exited with status {}", tool, status));
    }
    Ok(())
}
