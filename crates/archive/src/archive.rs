//! The merged `(initialization_year, lead_year, month, lat, lon)` archive.

use decadal_calendar::YearMonth;

use crate::merge::MergePlan;
use crate::store::{ArchiveShape, CellStore, DenseStore, MONTHS_PER_LEAD_YEAR, same_bits};

/// Output of the merge engine.
///
/// Every `(initialization_year, lead_year, month)` cell is either filled
/// from exactly one run or missing. Immutable once returned.
#[derive(Debug, Clone)]
pub struct MergedArchive {
    field: String,
    initialization_years: Vec<i32>,
    initialization_months: Vec<u8>,
    sources: Vec<String>,
    max_lead_year: u32,
    lat: Vec<f64>,
    lon: Vec<f64>,
    store: DenseStore,
}

impl PartialEq for MergedArchive {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field
            && self.initialization_years == other.initialization_years
            && self.initialization_months == other.initialization_months
            && self.sources == other.sources
            && self.max_lead_year == other.max_lead_year
            && same_bits(&self.lat, &other.lat)
            && same_bits(&self.lon, &other.lon)
            && self.store == other.store
    }
}

impl MergedArchive {
    pub(crate) fn from_parts(plan: MergePlan, store: DenseStore) -> Self {
        Self {
            field: plan.field,
            initialization_years: plan.initialization_years,
            initialization_months: plan.initialization_months,
            sources: plan.sources,
            max_lead_year: plan.max_lead_year,
            lat: plan.lat,
            lon: plan.lon,
            store,
        }
    }

    /// Name of the merged field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Initialization years, ascending.
    pub fn initialization_years(&self) -> &[i32] {
        &self.initialization_years
    }

    /// Calendar month each run started in, parallel to
    /// [`initialization_years`](Self::initialization_years).
    pub fn initialization_months(&self) -> &[u8] {
        &self.initialization_months
    }

    /// Input each initialization year came from.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Input that supplied `initialization_year`.
    pub fn source_of(&self, initialization_year: i32) -> Option<&str> {
        let i = self.init_index(initialization_year)?;
        Some(self.sources[i].as_str())
    }

    /// Highest lead year.
    pub fn max_lead_year(&self) -> u32 {
        self.max_lead_year
    }

    /// Lead-year coordinate: `1..=max_lead_year`.
    pub fn lead_years(&self) -> Vec<u32> {
        (1..=self.max_lead_year).collect()
    }

    /// Month coordinate: `1..=12`, the month of the lead year.
    pub fn months(&self) -> Vec<u8> {
        (1..=MONTHS_PER_LEAD_YEAR as u8).collect()
    }

    /// Latitude coordinate.
    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    /// Longitude coordinate.
    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    /// Dimension lengths.
    pub fn shape(&self) -> ArchiveShape {
        self.store.shape()
    }

    /// The underlying cell store.
    pub fn store(&self) -> &DenseStore {
        &self.store
    }

    fn init_index(&self, initialization_year: i32) -> Option<usize> {
        self.initialization_years
            .binary_search(&initialization_year)
            .ok()
    }

    fn cell(&self, initialization_year: i32, lead_year: u32, month: u8) -> Option<usize> {
        let i = self.init_index(initialization_year)?;
        self.shape().cell_index(i, lead_year, month)
    }

    /// The `(lat, lon)` grid of a cell, or `None` if it is missing or the
    /// coordinates are out of range.
    pub fn grid(&self, initialization_year: i32, lead_year: u32, month: u8) -> Option<&[f64]> {
        self.store
            .grid(self.cell(initialization_year, lead_year, month)?)
    }

    /// Whether a cell holds data.
    pub fn is_filled(&self, initialization_year: i32, lead_year: u32, month: u8) -> bool {
        self.cell(initialization_year, lead_year, month)
            .is_some_and(|c| self.store.is_filled(c))
    }

    /// Calendar month a cell refers to: the initialization month advanced by
    /// `(lead_year - 1) * 12 + month - 1` months.
    pub fn valid_month(&self, initialization_year: i32, lead_year: u32, month: u8) -> Option<YearMonth> {
        let i = self.init_index(initialization_year)?;
        let lead = i64::from(lead_year.checked_sub(1)?);
        let offset = i64::from(month.checked_sub(1)?);
        if offset >= MONTHS_PER_LEAD_YEAR as i64 {
            return None;
        }
        YearMonth::new(initialization_year, self.initialization_months[i])
            .ok()?
            .checked_add_months(lead * MONTHS_PER_LEAD_YEAR as i64 + offset)
    }

    /// Total number of cells.
    pub fn n_cells(&self) -> usize {
        self.shape().n_cells()
    }

    /// Number of filled cells.
    pub fn n_filled_cells(&self) -> usize {
        self.store.n_filled()
    }

    /// Number of missing cells.
    pub fn n_missing_cells(&self) -> usize {
        self.n_cells() - self.n_filled_cells()
    }

    /// All values in storage order with every `NaN` (missing cells and
    /// missing source values alike) replaced by `fill_value`.
    pub fn to_filled_values(&self, fill_value: f64) -> Vec<f64> {
        self.store
            .values()
            .iter()
            .map(|&v| if v.is_nan() { fill_value } else { v })
            .collect()
    }
}
