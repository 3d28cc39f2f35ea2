use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use covdown::cli::args::{Arguments, LogLevel};
use covdown::config::defs::{PipelineError, RunConfig};
use covdown::pipelines::downsample;
use log::LevelFilter;
use tempfile::TempDir;

// Stand-in sambamba: answers --version, otherwise copies the last argument
// (the input) to whatever follows -o.
const FAKE_SAMBAMBA: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "sambamba 0.8.2"
  exit 0
fi
out=""
prev=""
last=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then out="$a"; fi
  prev="$a"
  last="$a"
done
cp "$last" "$out"
"#;

// Stand-in mosdepth: answers --version, otherwise writes a fixed summary
// report next to the output prefix (second-to-last argument). chr1 carries
// 30x; chrX and the total row must be ignored by the parser.
const FAKE_MOSDEPTH: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "mosdepth 0.3.8"
  exit 0
fi
prefix=""
prev=""
for a in "$@"; do
  prefix="$prev"
  prev="$a"
done
{
  printf 'chrom\tlength\tbases\tmean\tmin\tmax\n'
  printf 'chr1\t1000\t30000\t30.00\t0\t100\n'
  printf 'chrX\t800\t800\t1.00\t0\t2\n'
  printf 'total\t1800\t30800\t17.11\t0\t100\n'
} > "$prefix.mosdepth.summary.txt"
"#;

fn install_stub(dir: &Path, name: &str, body: &str) -> Result<()> {
    let path = dir.join(name);
    fs::write(&path, body)?;
    let mut perms = fs::metadata(&path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms)?;
    Ok(())
}

fn run_config(work: &Path, coverage: f64) -> Arc<RunConfig> {
    Arc::new(RunConfig {
        cwd: work.to_path_buf(),
        input_file: work.join("sample1.bqsr.sorted.bam"),
        out_dir: work.join("out"),
        args: Arguments {
            input_file: "sample1.bqsr.sorted.bam".to_string(),
            output_dir: "out".to_string(),
            coverage,
            thread: 4,
            sample_name: None,
            skip_dup_rm: false,
            tmp: None,
            loglevel: LogLevel::Debug,
        },
        log_level: LevelFilter::Debug,
    })
}

#[tokio::test]
async fn test_pipeline_end_to_end() -> Result<()> {
    let stub_dir = TempDir::new()?;
    install_stub(stub_dir.path(), "sambamba", FAKE_SAMBAMBA)?;
    install_stub(stub_dir.path(), "mosdepth", FAKE_MOSDEPTH)?;
    let path = format!(
        "{}:{}",
        stub_dir.path().display(),
        std::env::var("PATH").unwrap_or_default()
    );
    std::env::set_var("PATH", &path);

    let work = TempDir::new()?;
    fs::write(work.path().join("sample1.bqsr.sorted.bam"), b"fake bam payload")?;
    fs::create_dir_all(work.path().join("out"))?;
    let workspace = work.path().join("out/sample1/tmp");

    // Stub coverage is 30x, so 15x succeeds with fraction 0.5.
    downsample::run(run_config(work.path(), 15.0)).await?;

    let final_bam = work.path().join("out/sample1/15x/sample1.dupRm.subsam.bam");
    assert!(final_bam.exists(), "final artifact missing");
    assert_eq!(fs::read(&final_bam)?, b"fake bam payload");
    assert!(
        !workspace.exists(),
        "workspace should be removed after success"
    );

    // Asking for more coverage than the input carries must fail, and the
    // workspace must still be gone afterwards.
    let err = downsample::run(run_config(work.path(), 60.0))
        .await
        .expect_err("coverage inversion accepted");
    assert!(matches!(err, PipelineError::InvalidCoverage(_)));
    assert!(
        !workspace.exists(),
        "workspace should be removed after failure too"
    );

    Ok(())
}
