//! Merge engine: folds loaded runs into one lead-year-indexed archive.
//!
//! Each run occupies the block of its initialization year; its month `t`
//! lands in cell `(initialization_year, lead_year, lead_month + 1)`. Runs
//! may have different horizons; cells no run reaches stay missing.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::{debug, info};

use crate::archive::MergedArchive;
use crate::config::LoadConfig;
use crate::dataset::Dataset;
use crate::error::ArchiveError;
use crate::run::{RawRun, load_run};
use crate::store::{ArchiveShape, CellStore, DenseStore, same_bits};

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Coordinates of an archive, derived from a set of runs before any grid is
/// copied.
#[derive(Debug, Clone)]
pub struct MergePlan {
    pub(crate) field: String,
    pub(crate) initialization_years: Vec<i32>,
    pub(crate) initialization_months: Vec<u8>,
    pub(crate) sources: Vec<String>,
    pub(crate) max_lead_year: u32,
    pub(crate) lat: Vec<f64>,
    pub(crate) lon: Vec<f64>,
}

impl PartialEq for MergePlan {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field
            && self.initialization_years == other.initialization_years
            && self.initialization_months == other.initialization_months
            && self.sources == other.sources
            && self.max_lead_year == other.max_lead_year
            && same_bits(&self.lat, &other.lat)
            && same_bits(&self.lon, &other.lon)
    }
}

impl MergePlan {
    /// Name of the merged field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Initialization years, ascending.
    pub fn initialization_years(&self) -> &[i32] {
        &self.initialization_years
    }

    /// Initialization month per initialization year.
    pub fn initialization_months(&self) -> &[u8] {
        &self.initialization_months
    }

    /// Source of each initialization year.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Highest lead year of any run.
    pub fn max_lead_year(&self) -> u32 {
        self.max_lead_year
    }

    /// Latitude coordinate shared by all runs.
    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    /// Longitude coordinate shared by all runs.
    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    /// Dimensions of the archive this plan describes.
    pub fn shape(&self) -> ArchiveShape {
        ArchiveShape::new(
            self.initialization_years.len(),
            self.max_lead_year as usize,
            self.lat.len(),
            self.lon.len(),
        )
    }

    /// Position of `year` on the initialization axis.
    pub fn init_index(&self, year: i32) -> Option<usize> {
        self.initialization_years.binary_search(&year).ok()
    }
}

/// Checks runs against each other and derives the archive coordinates.
///
/// Runs are checked in input order against the first run.
///
/// # Errors
///
/// - [`ArchiveError::EmptyInputSet`] if `runs` is empty.
/// - [`ArchiveError::SpatialGridMismatch`] if a run's lat/lon differ from
///   the first run's.
/// - [`ArchiveError::Validation`] if runs carry different fields.
/// - [`ArchiveError::DuplicateInitializationYear`] if two runs share an
///   initialization year.
pub fn plan_merge(runs: &[RawRun]) -> Result<MergePlan, ArchiveError> {
    let Some(first) = runs.first() else {
        return Err(ArchiveError::EmptyInputSet);
    };

    let mut by_year: BTreeMap<i32, (u8, &str)> = BTreeMap::new();
    for run in runs {
        check_grid(first, run)?;
        if run.field() != first.field() {
            return Err(ArchiveError::Validation {
                count: 1,
                details: format!(
                    "{} carries field '{}', expected '{}' as in {}",
                    run.source_id(),
                    run.field(),
                    first.field(),
                    first.source_id()
                ),
            });
        }
        match by_year.entry(run.initialization_year()) {
            Entry::Occupied(e) => {
                return Err(ArchiveError::DuplicateInitializationYear {
                    year: run.initialization_year(),
                    first: e.get().1.to_string(),
                    second: run.source_id().to_string(),
                });
            }
            Entry::Vacant(e) => {
                e.insert((run.initialization_month(), run.source_id()));
            }
        }
    }

    let max_lead_year = runs.iter().map(RawRun::max_lead_year).max().unwrap_or(1);
    let mut initialization_years = Vec::with_capacity(by_year.len());
    let mut initialization_months = Vec::with_capacity(by_year.len());
    let mut sources = Vec::with_capacity(by_year.len());
    for (year, (month, source)) in by_year {
        initialization_years.push(year);
        initialization_months.push(month);
        sources.push(source.to_string());
    }

    Ok(MergePlan {
        field: first.field().to_string(),
        initialization_years,
        initialization_months,
        sources,
        max_lead_year,
        lat: first.lat().to_vec(),
        lon: first.lon().to_vec(),
    })
}

fn check_grid(reference: &RawRun, run: &RawRun) -> Result<(), ArchiveError> {
    let reason = compare_axis("lat", reference.lat(), run.lat())
        .or_else(|| compare_axis("lon", reference.lon(), run.lon()));
    match reason {
        None => Ok(()),
        Some(reason) => Err(ArchiveError::SpatialGridMismatch {
            source_id: run.source_id().to_string(),
            reference: reference.source_id().to_string(),
            reason,
        }),
    }
}

/// Describes the first difference between two coordinate vectors, using
/// exact equality.
pub(crate) fn compare_axis(name: &str, reference: &[f64], other: &[f64]) -> Option<String> {
    if reference.len() != other.len() {
        return Some(format!(
            "{name} has {} points, expected {}",
            other.len(),
            reference.len()
        ));
    }
    reference
        .iter()
        .zip(other)
        .position(|(a, b)| a != b)
        .map(|i| format!("{name}[{i}] = {} differs from {}", other[i], reference[i]))
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

fn project<S: CellStore>(
    plan: &MergePlan,
    runs: &[RawRun],
    store: &mut S,
) -> Result<(), ArchiveError> {
    let shape = store.shape();
    if shape != plan.shape() {
        return Err(ArchiveError::Store {
            reason: format!(
                "store dimensions {:?} do not match the runs {:?}",
                shape.dims(),
                plan.shape().dims()
            ),
        });
    }

    for run in runs {
        let year = run.initialization_year();
        let init_idx = plan.init_index(year).ok_or_else(|| ArchiveError::Store {
            reason: format!("{}: initialization year {year} not in plan", run.source_id()),
        })?;

        for (_, lead, grid) in run.time_series() {
            let month = lead.month_of_lead_year();
            let cell = shape
                .cell_index(init_idx, lead.lead_year(), month)
                .ok_or_else(|| ArchiveError::Store {
                    reason: format!(
                        "{}: lead year {} month {month} outside the archive",
                        run.source_id(),
                        lead.lead_year()
                    ),
                })?;
            if store.is_filled(cell) {
                return Err(ArchiveError::OverlappingAssignment {
                    source_id: run.source_id().to_string(),
                    initialization_year: year,
                    lead_year: lead.lead_year(),
                    month,
                });
            }
            store.fill(cell, grid)?;
        }
        debug!(
            source = run.source_id(),
            initialization_year = year,
            n_months = run.n_months(),
            "projected run"
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Merges loaded runs into a new in-memory archive.
///
/// Runs are processed in the order given; the initialization-year axis of
/// the result is sorted. No partial archive is returned on error.
///
/// # Errors
///
/// Every error of [`plan_merge`], plus
/// [`ArchiveError::OverlappingAssignment`] if a cell would be written twice.
///
/// # Example
///
/// ```
/// use decadal_archive::{LoadConfig, MemoryDataset, load_run, merge_runs};
/// use decadal_calendar::YearMonth;
///
/// let runs = [1990, 1991]
///     .into_iter()
///     .map(|year| {
///         let start = YearMonth::new(year, 1).unwrap();
///         let ds = MemoryDataset::monthly(format!("run_{year}"), start, 24, vec![0.0], vec![0.0])
///             .with_field("tas", vec![1.0; 24]);
///         load_run(&ds, &LoadConfig::new("tas"))
///     })
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
///
/// let archive = merge_runs(&runs).unwrap();
/// assert_eq!(archive.initialization_years(), &[1990, 1991]);
/// assert_eq!(archive.lead_years(), vec![1, 2]);
/// assert_eq!(archive.n_missing_cells(), 0);
/// ```
pub fn merge_runs(runs: &[RawRun]) -> Result<MergedArchive, ArchiveError> {
    let plan = plan_merge(runs)?;
    let mut store = DenseStore::new(plan.shape());
    project(&plan, runs, &mut store)?;

    let archive = MergedArchive::from_parts(plan, store);
    info!(
        n_runs = runs.len(),
        n_init = archive.initialization_years().len(),
        max_lead_year = archive.max_lead_year(),
        filled = archive.n_filled_cells(),
        missing = archive.n_missing_cells(),
        "merged runs"
    );
    Ok(archive)
}

/// Merges loaded runs into a caller-supplied store.
///
/// The store must have the dimensions of [`plan_merge`] for these runs and
/// every cell must be missing for the merge to succeed. Its contents are
/// unspecified after an error.
///
/// # Errors
///
/// Every error of [`plan_merge`], [`ArchiveError::Store`] on a dimension
/// mismatch or rejected write, and [`ArchiveError::OverlappingAssignment`]
/// if a target cell is already filled.
pub fn merge_into<S: CellStore>(runs: &[RawRun], store: &mut S) -> Result<MergePlan, ArchiveError> {
    let plan = plan_merge(runs)?;
    project(&plan, runs, store)?;
    Ok(plan)
}

/// Loads every dataset with [`load_run`] and merges the results.
///
/// # Errors
///
/// [`ArchiveError::EmptyInputSet`] if `datasets` is empty, the first loader
/// error encountered, or any error of [`merge_runs`].
pub fn merge_datasets<D: Dataset>(
    datasets: &[D],
    config: &LoadConfig,
) -> Result<MergedArchive, ArchiveError> {
    if datasets.is_empty() {
        return Err(ArchiveError::EmptyInputSet);
    }
    let runs = datasets
        .iter()
        .map(|d| load_run(d, config))
        .collect::<Result<Vec<_>, _>>()?;
    merge_runs(&runs)
}
