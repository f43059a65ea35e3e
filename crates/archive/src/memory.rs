//! In-memory [`Dataset`] implementation.

use std::collections::BTreeMap;

use decadal_calendar::{CalendarDate, CfCalendar, YearMonth, monthly_sequence};

use crate::dataset::{Dataset, GridSeries};
use crate::store::same_bits;

/// Errors raised by [`MemoryDataset`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MemoryDatasetError {
    /// No field with this name was added.
    #[error("field '{name}' not present")]
    MissingField {
        /// Requested field name.
        name: String,
    },

    /// The value buffer is not a whole number of `(lat, lon)` grids.
    #[error("field '{name}' has {len} values, not a multiple of the {cells}-point grid")]
    RaggedField {
        /// Field name.
        name: String,
        /// Number of values supplied.
        len: usize,
        /// Number of grid points per time step.
        cells: usize,
    },

    /// A time step past the end of the field was requested.
    #[error("time step {t} out of range (n_time = {n_time})")]
    StepOutOfRange {
        /// Requested index.
        t: usize,
        /// Number of steps held.
        n_time: usize,
    },
}

/// A run held entirely in memory.
///
/// Field values are stored flat in `(time, lat, lon)` order.
///
/// # Example
///
/// ```
/// use decadal_archive::{LoadConfig, MemoryDataset, load_run};
/// use decadal_calendar::YearMonth;
///
/// let start = YearMonth::new(1990, 11).unwrap();
/// let values: Vec<f64> = (0..24 * 2).map(f64::from).collect();
/// let ds = MemoryDataset::monthly("run_1990", start, 24, vec![10.0], vec![0.0, 5.0])
///     .with_field("tas", values);
///
/// let run = load_run(&ds, &LoadConfig::new("tas")).unwrap();
/// assert_eq!(run.initialization_year(), 1990);
/// assert_eq!(run.max_lead_year(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryDataset {
    source_id: String,
    times: Vec<CalendarDate>,
    lat: Vec<f64>,
    lon: Vec<f64>,
    fields: BTreeMap<String, Vec<f64>>,
}

impl PartialEq for MemoryDataset {
    fn eq(&self, other: &Self) -> bool {
        self.source_id == other.source_id
            && self.times == other.times
            && same_bits(&self.lat, &other.lat)
            && same_bits(&self.lon, &other.lon)
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|((ka, va), (kb, vb))| ka == kb && same_bits(va, vb))
    }
}

impl MemoryDataset {
    /// Creates a dataset with an explicit time axis and no fields.
    pub fn new(
        source_id: impl Into<String>,
        times: Vec<CalendarDate>,
        lat: Vec<f64>,
        lon: Vec<f64>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            times,
            lat,
            lon,
            fields: BTreeMap::new(),
        }
    }

    /// Creates a dataset with `n_months` consecutive mid-month timestamps
    /// starting at `start`.
    pub fn monthly(
        source_id: impl Into<String>,
        start: YearMonth,
        n_months: usize,
        lat: Vec<f64>,
        lon: Vec<f64>,
    ) -> Self {
        let times = monthly_sequence(start, n_months)
            .into_iter()
            .map(mid_month)
            .collect();
        Self::new(source_id, times, lat, lon)
    }

    /// Adds (or replaces) a field.
    pub fn with_field(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.fields.insert(name.into(), values);
        self
    }

    /// Returns the timestamps.
    pub fn times(&self) -> &[CalendarDate] {
        &self.times
    }
}

// Day 15 exists in every CF calendar.
fn mid_month(ym: YearMonth) -> CalendarDate {
    match CalendarDate::new(ym.year(), ym.month(), 15, CfCalendar::Day360) {
        Ok(date) => date,
        Err(_) => unreachable!("day 15 is valid in every month"),
    }
}

/// Borrowed view of one field of a [`MemoryDataset`].
#[derive(Debug, Clone, Copy)]
pub struct MemoryField<'a> {
    values: &'a [f64],
    n_lat: usize,
    n_lon: usize,
}

impl GridSeries for MemoryField<'_> {
    type Error = MemoryDatasetError;

    fn shape(&self) -> Vec<usize> {
        let cells = self.n_lat * self.n_lon;
        let n_time = if cells == 0 { 0 } else { self.values.len() / cells };
        vec![n_time, self.n_lat, self.n_lon]
    }

    fn read_step(&self, t: usize) -> Result<Vec<f64>, MemoryDatasetError> {
        let cells = self.n_lat * self.n_lon;
        let n_time = self.shape()[0];
        if t >= n_time {
            return Err(MemoryDatasetError::StepOutOfRange { t, n_time });
        }
        Ok(self.values[t * cells..(t + 1) * cells].to_vec())
    }
}

impl Dataset for MemoryDataset {
    type Error = MemoryDatasetError;
    type Field<'a> = MemoryField<'a>;

    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn time_axis(&self) -> Result<Vec<CalendarDate>, MemoryDatasetError> {
        Ok(self.times.clone())
    }

    fn field(&self, name: &str) -> Result<MemoryField<'_>, MemoryDatasetError> {
        let values = self
            .fields
            .get(name)
            .ok_or_else(|| MemoryDatasetError::MissingField {
                name: name.to_string(),
            })?;
        let cells = self.lat.len() * self.lon.len();
        if cells > 0 && values.len() % cells != 0 {
            return Err(MemoryDatasetError::RaggedField {
                name: name.to_string(),
                len: values.len(),
                cells,
            });
        }
        Ok(MemoryField {
            values,
            n_lat: self.lat.len(),
            n_lon: self.lon.len(),
        })
    }

    fn lat(&self) -> Result<Vec<f64>, MemoryDatasetError> {
        Ok(self.lat.clone())
    }

    fn lon(&self) -> Result<Vec<f64>, MemoryDatasetError> {
        Ok(self.lon.clone())
    }
}
