use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, ValueEnum, Default, PartialEq)]
pub enum LogLevel {
    #[default]
    Debug,
    Info,
    Warning,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "covdown", version = "0.1.0")]
pub struct Arguments {
    #[arg(long = "input_file", help = "Input CRAM or BAM file.")]
    pub input_file: String,

    #[arg(long = "output_dir", default_value = "./", help = "Path to output directory.")]
    pub output_dir: String,

    #[arg(long, default_value_t = 15.0, help = "Desired coverage for the new BAM file.")]
    pub coverage: f64,

    #[arg(
        long,
        default_value_t = 4,
        help = "Number of threads passed to the external tools (mosdepth needs at least 4)."
    )]
    pub thread: usize,

    #[arg(
        long = "sample_name",
        help = "Sample name to use, otherwise derived from the input file name. Useful for benchmarking data to avoid overwriting e.g. SRR11321732_hg19 vs SRR11321732_GRCh38."
    )]
    pub sample_name: Option<String>,

    #[arg(
        long = "skip_dupRm",
        action,
        help = "Do not remove duplicates (directly downsample the original reads)."
    )]
    pub skip_dup_rm: bool,

    #[arg(long, help = "Scratch directory, deleted after processing. Default: <output_dir>/<sample>/tmp")]
    pub tmp: Option<String>,

    #[arg(long, default_value = "debug", value_enum, help = "Set logging level to debug (default), info or warning.")]
    pub loglevel: LogLevel,
}
