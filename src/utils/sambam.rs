/// Classifying alignment containers and deriving sample labels.
use anyhow::{anyhow, Result};
use std::path::Path;

use crate::config::defs::{AlignmentKind, BAM_EXT, CRAM_EXT};

/// Decides BAM vs CRAM from the filename suffix, case-insensitive.
/// Any other suffix is a configuration error.
pub fn alignment_kind(input_file: &Path) -> Result<AlignmentKind> {
    let ext = input_file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some(CRAM_EXT) => Ok(AlignmentKind::Cram),
        Some(BAM_EXT) => Ok(AlignmentKind::Bam),
        _ => Err(anyhow!(
            "{} is neither a BAM nor a CRAM file",
            input_file.display()
        )),
    }
}

/// Sample ID used to namespace all intermediate and output paths: the
/// explicit override when given, otherwise the first dot-delimited token of
/// the file name (sample1.bqsr.sorted.bam -> sample1).
pub fn sample_id(input_file: &Path, sample_name: Option<&str>) -> String {
    if let Some(name) = sample_name {
        return name.to_string();
    }
    let file_name = input_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    file_name.split('.').next().unwrap_or_default().to_string()
}
