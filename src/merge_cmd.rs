//! Merge command: runs -> lead-year archive (and optional anomalies).

use anyhow::{Context, Result, anyhow, bail};
use tracing::{info, info_span};

use decadal_archive::{LeadYearMeans, anomalies};
use decadal_io::{merge_files, read_climatology, write_archive, write_lead_year_means};

use crate::cli::MergeArgs;
use crate::config::DecadalConfig;
use crate::convert;

/// Run the merge pipeline.
pub fn run(args: MergeArgs) -> Result<()> {
    let _cmd = info_span!("merge").entered();

    // 1. Load project TOML
    let toml_str = std::fs::read_to_string(&args.config)
        .with_context(|| format!("failed to read config file: {}", args.config.display()))?;
    let config: DecadalConfig = toml::from_str(&toml_str).context("failed to parse TOML config")?;

    // 2. Resolve inputs and output
    let files = if args.files.is_empty() {
        config.input.files.clone()
    } else {
        args.files
    };
    if files.is_empty() {
        bail!("no input files: set [input].files in config or pass FILES");
    }
    let output = args
        .output
        .or_else(|| config.output.path.clone())
        .ok_or_else(|| anyhow!("no output path: set [output].path in config or use --output"))?;

    let load_cfg = convert::build_load_config(&config.input)?;
    let reader_cfg = convert::build_reader_config(&config.reader)?;
    let writer_cfg = convert::build_writer_config(&config.output)?;

    // 3. Merge
    info!(n_files = files.len(), field = load_cfg.field(), "merging runs");
    let archive = merge_files(&files, &load_cfg, &reader_cfg).context("merge failed")?;
    info!(
        initialization_years = ?archive.initialization_years(),
        max_lead_year = archive.max_lead_year(),
        missing = archive.n_missing_cells(),
        "archive assembled"
    );

    // 4. Write archive
    write_archive(&output, &archive, &writer_cfg)
        .with_context(|| format!("failed to write archive: {}", output.display()))?;

    // 5. Optional anomalies
    if let Some(ref anomaly) = config.anomaly {
        let field = anomaly.field.as_deref().unwrap_or(load_cfg.field());
        let climatology = read_climatology(&anomaly.climatology, field, &reader_cfg)
            .with_context(|| {
                format!(
                    "failed to read climatology: {}",
                    anomaly.climatology.display()
                )
            })?;
        let means = LeadYearMeans::from_archive(&archive);
        let anom = anomalies(&means, &climatology).context("failed to compute anomalies")?;
        write_lead_year_means(&anomaly.output, &anom, anom.field(), &writer_cfg).with_context(
            || format!("failed to write anomalies: {}", anomaly.output.display()),
        )?;
    }

    Ok(())
}
