use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::defs::{AlignmentKind, PipelineError, RunConfig, MOSDEPTH_TAG, SAMBAMBA_TAG};
use crate::utils::command::{check_versions, mosdepth, run_tool, sambamba};
use crate::utils::coverage::{subsample_fraction, summary_mean_coverage};
use crate::utils::file::{absolute_from, coverage_label, create_workspace, remove_workspace};
use crate::utils::sambam::{alignment_kind, sample_id};

/// Downsamples a BAM/CRAM to the requested mean coverage: sanitise with
/// sambamba, measure with mosdepth, subsample with sambamba at a fixed
/// seed, measure again for the record, then drop the scratch directory.
pub async fn run(config: Arc<RunConfig>) -> Result<(), PipelineError> {
    check_versions()
        .await
        .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;

    let kind = alignment_kind(&config.input_file)
        .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
    let sample = sample_id(&config.input_file, config.args.sample_name.as_deref());
    info!(
        "Processing {} as sample {}",
        config.input_file.display(),
        sample
    );

    let label = coverage_label(config.args.coverage);
    let tmp_root = config
        .args
        .tmp
        .as_deref()
        .map(|tmp| absolute_from(Path::new(tmp), &config.cwd));
    let workspace = create_workspace(&config.out_dir, tmp_root.as_deref(), &sample, &label)
        .map_err(|e| PipelineError::IOError(e.to_string()))?;

    // The scratch directory goes away on every exit path, failures included.
    let result = downsample(&config, kind, &sample, &label, &workspace).await;
    remove_workspace(&workspace);
    result
}

async fn downsample(
    config: &RunConfig,
    kind: AlignmentKind,
    sample: &str,
    label: &str,
    workspace: &Path,
) -> Result<(), PipelineError> {
    let filtered_bam = remove_dup(config, kind, sample, workspace).await?;

    let observed = get_coverage(config, &filtered_bam, sample, workspace, "R1").await?;
    let fraction = subsample_fraction(config.args.coverage, observed)
        .map_err(|e| PipelineError::InvalidCoverage(e.to_string()))?;
    info!(
        "Downsampling {} with factor {:.6}",
        filtered_bam.display(),
        fraction
    );

    let downsampled_bam = downsample_bam(config, &filtered_bam, sample, label, fraction).await?;

    let achieved = get_coverage(config, &downsampled_bam, sample, workspace, "R2").await?;
    info!(
        "Downsampled bam found at {} ({:.2}x)",
        downsampled_bam.display(),
        achieved
    );
    Ok(())
}

/// Drops unmapped, mate-unmapped and unpaired reads (plus duplicates unless
/// skipped) into {workspace}/{sample}.dupRm.bam.
async fn remove_dup(
    config: &RunConfig,
    kind: AlignmentKind,
    sample: &str,
    workspace: &Path,
) -> Result<PathBuf, PipelineError> {
    info!("Sanitising input {}", config.input_file.display());
    if config.args.skip_dup_rm {
        info!("Not removing duplicate reads");
    }

    let bam_loc = workspace.join(format!("{}.dupRm.bam", sample));
    let args_vec = sambamba::view_args(
        &config.input_file,
        &bam_loc,
        kind,
        config.args.skip_dup_rm,
        config.args.thread,
    );
    run_tool(SAMBAMBA_TAG, &args_vec)
        .await
        .map_err(|e| PipelineError::ToolExecution {
            tool: SAMBAMBA_TAG.to_string(),
            error: e.to_string(),
        })?;

    info!("Sanitised bam found at {}", bam_loc.display());
    Ok(bam_loc)
}

/// One mosdepth pass under {workspace}/{round}, reduced to mean coverage
/// over the primary numbered chromosomes. Rounds R1 (before downsampling)
/// and R2 (after) keep their reports apart.
async fn get_coverage(
    config: &RunConfig,
    bam: &Path,
    sample: &str,
    workspace: &Path,
    round: &str,
) -> Result<f64, PipelineError> {
    let sub_tmp = workspace.join(round);
    fs::create_dir_all(&sub_tmp).map_err(|e| PipelineError::IOError(e.to_string()))?;

    let out_prefix = sub_tmp.join(sample);
    let args_vec = mosdepth::depth_args(&out_prefix, bam, config.args.thread);
    run_tool(MOSDEPTH_TAG, &args_vec)
        .await
        .map_err(|e| PipelineError::ToolExecution {
            tool: MOSDEPTH_TAG.to_string(),
            error: e.to_string(),
        })?;

    let summary_file = PathBuf::from(format!("{}.mosdepth.summary.txt", out_prefix.display()));
    let cov = summary_mean_coverage(&summary_file)
        .map_err(|e| PipelineError::ParseError(e.to_string()))?;
    info!("{} coverage is: {:.6}", bam.display(), cov);
    Ok(cov)
}

/// Randomly retains the computed fraction of reads, writing the final
/// artifact to {out_dir}/{sample}/{label}/{sample}.dupRm.subsam.bam.
async fn downsample_bam(
    config: &RunConfig,
    filtered_bam: &Path,
    sample: &str,
    label: &str,
    fraction: f64,
) -> Result<PathBuf, PipelineError> {
    let out_prefix = config.out_dir.join(sample).join(label);
    fs::create_dir_all(&out_prefix).map_err(|e| PipelineError::IOError(e.to_string()))?;

    let bam_loc = out_prefix.join(format!("{}.dupRm.subsam.bam", sample));
    let args_vec = sambamba::subsample_args(filtered_bam, &bam_loc, fraction);
    run_tool(SAMBAMBA_TAG, &args_vec)
        .await
        .map_err(|e| PipelineError::ToolExecution {
            tool: SAMBAMBA_TAG.to_string(),
            error: e.to_string(),
        })?;

    Ok(bam_loc)
}
