//! Single-run loader.
//!
//! Turns one [`Dataset`] into a validated [`RawRun`]: a contiguous monthly
//! series of `(lat, lon)` grids whose first month is the initialization
//! month.

use std::path::Path;

use decadal_calendar::{CalendarDate, LeadPosition, YearMonth, calendar_month, lead_position};
use tracing::debug;

use crate::config::LoadConfig;
use crate::dataset::{Dataset, GridSeries};
use crate::error::ArchiveError;
use crate::store::same_bits;

/// One forecast run after loading.
///
/// Immutable once constructed. Grids are stored flat in `(time, lat, lon)`
/// order; missing source values are `NaN`. Equality compares floats bit for
/// bit, so two loads of the same input are equal even where values are
/// missing.
#[derive(Debug, Clone)]
pub struct RawRun {
    source_id: String,
    field: String,
    months: Vec<YearMonth>,
    leads: Vec<LeadPosition>,
    lat: Vec<f64>,
    lon: Vec<f64>,
    values: Vec<f64>,
}

impl RawRun {
    /// Identity of the input this run was loaded from.
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Name of the extracted field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The first month of the run.
    pub fn initialization(&self) -> YearMonth {
        self.months[0]
    }

    /// Calendar year of the first timestamp.
    pub fn initialization_year(&self) -> i32 {
        self.initialization().year()
    }

    /// Calendar month of the first timestamp.
    pub fn initialization_month(&self) -> u8 {
        self.initialization().month()
    }

    /// Months covered, ascending and contiguous.
    pub fn months(&self) -> &[YearMonth] {
        &self.months
    }

    /// Lead position of each month, parallel to [`months`](Self::months).
    pub fn leads(&self) -> &[LeadPosition] {
        &self.leads
    }

    /// Number of monthly time steps.
    pub fn n_months(&self) -> usize {
        self.months.len()
    }

    /// Highest lead year reached (at least 1).
    pub fn max_lead_year(&self) -> u32 {
        self.leads.last().map_or(1, |p| p.lead_year())
    }

    /// Latitude coordinate values.
    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    /// Longitude coordinate values.
    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    /// Number of points in one `(lat, lon)` grid.
    pub fn grid_len(&self) -> usize {
        self.lat.len() * self.lon.len()
    }

    /// The grid at time index `t`, or `None` past the end.
    pub fn value_grid(&self, t: usize) -> Option<&[f64]> {
        let n = self.grid_len();
        self.values.get(t * n..(t + 1) * n)
    }

    /// Iterates `(month, lead position, grid)` in time order.
    pub fn time_series(&self) -> impl Iterator<Item = (YearMonth, LeadPosition, &[f64])> {
        self.months
            .iter()
            .zip(&self.leads)
            .zip(self.values.chunks_exact(self.grid_len()))
            .map(|((&month, &lead), grid)| (month, lead, grid))
    }
}

impl PartialEq for RawRun {
    fn eq(&self, other: &Self) -> bool {
        self.source_id == other.source_id
            && self.field == other.field
            && self.months == other.months
            && self.leads == other.leads
            && same_bits(&self.lat, &other.lat)
            && same_bits(&self.lon, &other.lon)
            && same_bits(&self.values, &other.values)
    }
}

/// Loads one run from `dataset`.
///
/// The initialization year and month are those of the first timestamp.
///
/// # Errors
///
/// - [`ArchiveError::Validation`] if `config` is invalid.
/// - [`ArchiveError::Dataset`] if the dataset fails to deliver metadata or
///   a time step.
/// - [`ArchiveError::MalformedTimeAxis`] if the time axis is empty, repeats a
///   month, runs backwards, or skips a month.
/// - [`ArchiveError::EmptyGrid`] if lat or lon has no points.
/// - [`ArchiveError::InitializationYearConflict`] if a file-name marker is
///   configured and the name disagrees with the time axis.
/// - [`ArchiveError::FieldShapeMismatch`] if the field is not
///   `(time, lat, lon)` over the dataset's axes.
pub fn load_run<D: Dataset>(dataset: &D, config: &LoadConfig) -> Result<RawRun, ArchiveError> {
    config.validate()?;
    let source_id = dataset.source_id().to_string();

    let times = dataset
        .time_axis()
        .map_err(|e| dataset_error(&source_id, e))?;
    let months = validate_time_axis(&source_id, &times)?;
    let init = months[0];

    let lat = dataset.lat().map_err(|e| dataset_error(&source_id, e))?;
    let lon = dataset.lon().map_err(|e| dataset_error(&source_id, e))?;
    if lat.is_empty() || lon.is_empty() {
        return Err(ArchiveError::EmptyGrid {
            source_id,
            n_lat: lat.len(),
            n_lon: lon.len(),
        });
    }

    if let Some(marker) = config.init_year_marker() {
        check_name_marker(&source_id, marker, init.year())?;
    }

    let leads = lead_positions(&source_id, init, &months)?;

    let field = dataset
        .field(config.field())
        .map_err(|e| dataset_error(&source_id, e))?;
    let expected = [months.len(), lat.len(), lon.len()];
    let got = field.shape();
    if got != expected {
        return Err(ArchiveError::FieldShapeMismatch {
            source_id,
            field: config.field().to_string(),
            expected,
            got,
        });
    }

    let grid_len = lat.len() * lon.len();
    let mut values = Vec::with_capacity(months.len() * grid_len);
    for t in 0..months.len() {
        let grid = field
            .read_step(t)
            .map_err(|e| dataset_error(&source_id, e))?;
        if grid.len() != grid_len {
            return Err(ArchiveError::Dataset {
                source_id,
                reason: format!(
                    "time step {t} of '{}' returned {} values, expected {grid_len}",
                    config.field(),
                    grid.len()
                ),
            });
        }
        values.extend_from_slice(&grid);
    }

    let run = RawRun {
        source_id,
        field: config.field().to_string(),
        months,
        leads,
        lat,
        lon,
        values,
    };
    debug!(
        source = %run.source_id,
        initialization = %init,
        n_months = run.n_months(),
        max_lead_year = run.max_lead_year(),
        "loaded run"
    );
    Ok(run)
}

fn dataset_error(source_id: &str, e: impl std::fmt::Display) -> ArchiveError {
    ArchiveError::Dataset {
        source_id: source_id.to_string(),
        reason: e.to_string(),
    }
}

/// Checks that `times` is a non-empty run of consecutive months and returns
/// them at month resolution.
fn validate_time_axis(
    source_id: &str,
    times: &[CalendarDate],
) -> Result<Vec<YearMonth>, ArchiveError> {
    let malformed = |reason: String| ArchiveError::MalformedTimeAxis {
        source_id: source_id.to_string(),
        reason,
    };
    if times.is_empty() {
        return Err(malformed("time axis is empty".to_string()));
    }

    let months: Vec<YearMonth> = times.iter().map(|d| d.year_month()).collect();
    for (i, pair) in months.windows(2).enumerate() {
        let (prev, next) = (pair[0], pair[1]);
        match next.months_since(prev) {
            1 => {}
            0 => {
                return Err(malformed(format!(
                    "month {next} repeated at indices {i} and {}",
                    i + 1
                )));
            }
            step if step < 0 => {
                return Err(malformed(format!(
                    "time decreases from {prev} to {next} at index {}",
                    i + 1
                )));
            }
            step => {
                return Err(malformed(format!(
                    "gap of {} month(s) between {prev} and {next} at index {}",
                    step - 1,
                    i + 1
                )));
            }
        }
    }
    Ok(months)
}

fn lead_positions(
    source_id: &str,
    init: YearMonth,
    months: &[YearMonth],
) -> Result<Vec<LeadPosition>, ArchiveError> {
    let malformed = |reason: String| ArchiveError::MalformedTimeAxis {
        source_id: source_id.to_string(),
        reason,
    };
    months
        .iter()
        .map(|&at| {
            let pos = lead_position(init, at).map_err(|e| malformed(e.to_string()))?;
            let expected = calendar_month(init.month(), pos.lead_month())?;
            if expected != at.month() {
                return Err(malformed(format!(
                    "{at} is lead month {} of a run initialized {init}, expected calendar month {expected}",
                    pos.lead_month()
                )));
            }
            Ok(pos)
        })
        .collect()
}

/// Extracts the four-digit year following `marker` in the file name of
/// `source_id`.
pub(crate) fn init_year_from_name(source_id: &str, marker: &str) -> Option<i32> {
    let name = Path::new(source_id).file_name()?.to_str()?;
    let (_, rest) = name.split_once(marker)?;
    let digits = rest.get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn check_name_marker(source_id: &str, marker: &str, year: i32) -> Result<(), ArchiveError> {
    match init_year_from_name(source_id, marker) {
        Some(named) if named == year => Ok(()),
        Some(named) => Err(ArchiveError::InitializationYearConflict {
            source_id: source_id.to_string(),
            from_time_axis: year,
            from_name: named.to_string(),
        }),
        None => Err(ArchiveError::InitializationYearConflict {
            source_id: source_id.to_string(),
            from_time_axis: year,
            from_name: format!("no '{marker}YYYY' in name"),
        }),
    }
}
