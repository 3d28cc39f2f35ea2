use crate::cli::Arguments;
use lazy_static::lazy_static;
use log::LevelFilter;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

// External software
pub const SAMBAMBA_TAG: &str = "sambamba";
pub const MOSDEPTH_TAG: &str = "mosdepth";

lazy_static! {
    pub static ref TOOL_VERSIONS: HashMap<&'static str, f32> = {
        let mut m = HashMap::new();
        m.insert(SAMBAMBA_TAG, 0.8);
        m.insert(MOSDEPTH_TAG, 0.3);

        m
    };
}

// Static Parameters

// mosdepth misbehaves below four decompression threads
pub const MIN_THREADS: usize = 4;

// Fixed so repeated runs keep the same reads
pub const SUBSAMPLING_SEED: u64 = 10;

pub const BAM_EXT: &str = "bam";
pub const CRAM_EXT: &str = "cram";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlignmentKind {
    Cram,
    Bam,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{tool} failed: {error}")]
    ToolExecution { tool: String, error: String },
    #[error("IO error: {0}")]
    IOError(String),
    #[error("{0}")]
    ParseError(String),
    #[error("{0}")]
    InvalidCoverage(String),
}

pub struct RunConfig {
    pub cwd: PathBuf,
    pub input_file: PathBuf,
    pub out_dir: PathBuf,
    pub args: Arguments,
    pub log_level: LevelFilter,
}
