/// Parsing of mosdepth summary reports and the downsampling arithmetic.
use anyhow::{anyhow, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    // autosomes 1-22, with or without the chr prefix
    static ref PRIMARY_CONTIG: Regex = Regex::new(r"^(chr)?[0-9]{1,2}").unwrap();
}

/// Mean coverage across the primary numbered chromosomes, from the text of
/// a mosdepth summary report. Rows are tab-separated name/length/bases
/// (further columns ignored); the header, the total row, sex chromosomes
/// and decoys never match the contig pattern.
pub fn mean_coverage(summary: &str) -> Result<f64> {
    let mut length: u64 = 0;
    let mut bases: u64 = 0;
    for line in summary.lines() {
        if !PRIMARY_CONTIG.is_match(line) {
            continue;
        }
        let fields: Vec<&str> = line.trim().split('\t').collect();
        if fields.len() < 3 {
            return Err(anyhow!("Malformed summary row: {}", line));
        }
        length += fields[1]
            .parse::<u64>()
            .with_context(|| format!("Bad contig length in row: {}", line))?;
        bases += fields[2]
            .parse::<u64>()
            .with_context(|| format!("Bad base count in row: {}", line))?;
    }
    if length == 0 {
        return Err(anyhow!(
            "No contigs matching 1-22 or chr1-22 in summary; cannot compute coverage"
        ));
    }
    Ok(bases as f64 / length as f64)
}

/// Reads a mosdepth summary file and reduces it to mean coverage.
pub fn summary_mean_coverage(summary_file: &Path) -> Result<f64> {
    let text = std::fs::read_to_string(summary_file)
        .with_context(|| format!("Cannot open summary report {}", summary_file.display()))?;
    mean_coverage(&text)
}

/// Subsampling fraction that brings the observed coverage down to the
/// requested one. Requesting at or above what is already present is an
/// input error, not a fraction of 1.0.
pub fn subsample_fraction(requested: f64, observed: f64) -> Result<f64> {
    if requested >= observed {
        return Err(anyhow!(
            "Needed coverage ({:.2}) is not below the input's coverage ({:.2}): unable to downsample",
            requested,
            observed
        ));
    }
    Ok(requested / observed)
}
