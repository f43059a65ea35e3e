//! Inspect command: per-run JSON summary.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, info_span};

use decadal_archive::{LoadConfig, RawRun};
use decadal_io::{ReaderConfig, read_run, validate_inputs};

use crate::cli::InspectArgs;

#[derive(Debug, Serialize)]
struct RunSummary {
    source: String,
    field: String,
    initialization_year: i32,
    initialization_month: u8,
    first_month: String,
    last_month: String,
    n_months: usize,
    max_lead_year: u32,
    n_lat: usize,
    n_lon: usize,
}

impl RunSummary {
    fn new(run: &RawRun) -> Self {
        let months = run.months();
        Self {
            source: run.source_id().to_string(),
            field: run.field().to_string(),
            initialization_year: run.initialization_year(),
            initialization_month: run.initialization_month(),
            first_month: months.first().map(ToString::to_string).unwrap_or_default(),
            last_month: months.last().map(ToString::to_string).unwrap_or_default(),
            n_months: run.n_months(),
            max_lead_year: run.max_lead_year(),
            n_lat: run.lat().len(),
            n_lon: run.lon().len(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    runs: Vec<RunSummary>,
    /// Initialization years claimed by more than one run.
    duplicate_initialization_years: Vec<i32>,
}

fn summarize(runs: Vec<RunSummary>) -> Summary {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for run in &runs {
        *counts.entry(run.initialization_year).or_default() += 1;
    }
    let duplicate_initialization_years = counts
        .into_iter()
        .filter(|&(_, n)| n > 1)
        .map(|(year, _)| year)
        .collect();
    Summary {
        runs,
        duplicate_initialization_years,
    }
}

/// Load each run and print (or write) a JSON summary.
pub fn run(args: InspectArgs) -> Result<()> {
    let _cmd = info_span!("inspect").entered();

    let load_cfg = LoadConfig::new(&args.field);
    load_cfg.validate().context("invalid --field")?;
    let reader_cfg = ReaderConfig::default();
    validate_inputs(&args.files)?;

    let mut runs = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let run = read_run(path, &load_cfg, &reader_cfg)
            .with_context(|| format!("failed to load run: {}", path.display()))?;
        runs.push(RunSummary::new(&run));
    }

    let json =
        serde_json::to_string_pretty(&summarize(runs)).context("failed to serialize summary")?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, &json)
                .with_context(|| format!("failed to write summary: {}", path.display()))?;
            info!(path = %path.display(), "summary written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
