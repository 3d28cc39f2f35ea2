mod cli;
mod config;
mod pipelines;
mod utils;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use std::{env, fs};

use anyhow::Result;
use env_logger::Builder;
use log::{self, debug, error, info, LevelFilter};

use crate::cli::args::LogLevel;
use crate::cli::parse;
use crate::config::defs::{RunConfig, MIN_THREADS};
use crate::utils::file::absolute_from;
use pipelines::downsample;

#[tokio::main]
async fn main() -> Result<()> {
    let run_start = Instant::now();

    let args = parse();

    let log_level = match args.loglevel {
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Warning => LevelFilter::Warn,
    };

    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    let dir = env::current_dir()?;
    debug!("The current directory is {:?}", dir);

    let input_file = absolute_from(&PathBuf::from(&args.input_file), &dir);
    if !input_file.exists() {
        error!("Input file not found: {}", input_file.display());
        std::process::exit(1);
    }

    if args.thread < MIN_THREADS {
        error!(
            "At least {} threads are required, got {}",
            MIN_THREADS, args.thread
        );
        std::process::exit(1);
    }

    let out_dir = absolute_from(&PathBuf::from(&args.output_dir), &dir);
    fs::create_dir_all(&out_dir)?;

    let run_config = Arc::new(RunConfig {
        cwd: dir,
        input_file,
        out_dir,
        args,
        log_level,
    });

    if let Err(e) = downsample::run(run_config).await {
        error!(
            "Pipeline failed: {} at {} milliseconds.",
            e,
            run_start.elapsed().as_millis()
        );
        std::process::exit(1);
    }

    info!(
        "Done! Run complete: {} milliseconds.",
        run_start.elapsed().as_millis()
    );
    Ok(())
}
