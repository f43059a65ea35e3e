//! Lead-year means and anomalies against a climatology.

use tracing::info;

use crate::archive::MergedArchive;
use crate::error::ArchiveError;
use crate::merge::compare_axis;
use crate::store::{MONTHS_PER_LEAD_YEAR, same_bits};

/// Annual means of an archive, shaped `(initialization_year, lead_year, lat,
/// lon)`.
///
/// A lead year with any missing month is missing; missing values are `NaN`.
#[derive(Debug, Clone)]
pub struct LeadYearMeans {
    field: String,
    initialization_years: Vec<i32>,
    max_lead_year: u32,
    lat: Vec<f64>,
    lon: Vec<f64>,
    values: Vec<f64>,
    filled: Vec<bool>,
}

impl PartialEq for LeadYearMeans {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field
            && self.initialization_years == other.initialization_years
            && self.max_lead_year == other.max_lead_year
            && self.filled == other.filled
            && same_bits(&self.lat, &other.lat)
            && same_bits(&self.lon, &other.lon)
            && same_bits(&self.values, &other.values)
    }
}

impl LeadYearMeans {
    /// Averages the twelve monthly grids of every complete lead year.
    pub fn from_archive(archive: &MergedArchive) -> Self {
        let shape = archive.shape();
        let grid_len = shape.grid_len();
        let n_blocks = shape.n_init() * shape.n_lead();
        let mut values = vec![f64::NAN; n_blocks * grid_len];
        let mut filled = vec![false; n_blocks];

        let store = archive.store();
        for block in 0..n_blocks {
            let first_cell = block * MONTHS_PER_LEAD_YEAR;
            let grids: Option<Vec<&[f64]>> = (first_cell..first_cell + MONTHS_PER_LEAD_YEAR)
                .map(|cell| store.grid(cell))
                .collect();
            let Some(grids) = grids else {
                continue;
            };
            let out = &mut values[block * grid_len..(block + 1) * grid_len];
            for (j, v) in out.iter_mut().enumerate() {
                let sum: f64 = grids.iter().map(|g| g[j]).sum();
                *v = sum / MONTHS_PER_LEAD_YEAR as f64;
            }
            filled[block] = true;
        }

        Self {
            field: archive.field().to_string(),
            initialization_years: archive.initialization_years().to_vec(),
            max_lead_year: archive.max_lead_year(),
            lat: archive.lat().to_vec(),
            lon: archive.lon().to_vec(),
            values,
            filled,
        }
    }

    /// Name of the averaged field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Initialization years, ascending.
    pub fn initialization_years(&self) -> &[i32] {
        &self.initialization_years
    }

    /// Highest lead year.
    pub fn max_lead_year(&self) -> u32 {
        self.max_lead_year
    }

    /// Lead-year coordinate: `1..=max_lead_year`.
    pub fn lead_years(&self) -> Vec<u32> {
        (1..=self.max_lead_year).collect()
    }

    /// Latitude coordinate.
    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    /// Longitude coordinate.
    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    /// Dimension lengths: `[init, lead, lat, lon]`.
    pub fn dims(&self) -> [usize; 4] {
        [
            self.initialization_years.len(),
            self.max_lead_year as usize,
            self.lat.len(),
            self.lon.len(),
        ]
    }

    fn block(&self, initialization_year: i32, lead_year: u32) -> Option<usize> {
        let i = self
            .initialization_years
            .binary_search(&initialization_year)
            .ok()?;
        if lead_year == 0 || lead_year > self.max_lead_year {
            return None;
        }
        Some(i * self.max_lead_year as usize + (lead_year - 1) as usize)
    }

    /// Mean grid of one lead year, or `None` if it is missing.
    pub fn grid(&self, initialization_year: i32, lead_year: u32) -> Option<&[f64]> {
        let block = self.block(initialization_year, lead_year)?;
        if !self.filled[block] {
            return None;
        }
        let n = self.lat.len() * self.lon.len();
        self.values.get(block * n..(block + 1) * n)
    }

    /// Number of complete lead years.
    pub fn n_filled(&self) -> usize {
        self.filled.iter().filter(|&&f| f).count()
    }

    /// All values in storage order with `NaN` replaced by `fill_value`.
    pub fn to_filled_values(&self, fill_value: f64) -> Vec<f64> {
        self.values
            .iter()
            .map(|&v| if v.is_nan() { fill_value } else { v })
            .collect()
    }
}

/// A single `(lat, lon)` reference grid.
#[derive(Debug, Clone)]
pub struct Climatology {
    lat: Vec<f64>,
    lon: Vec<f64>,
    grid: Vec<f64>,
}

impl PartialEq for Climatology {
    fn eq(&self, other: &Self) -> bool {
        same_bits(&self.lat, &other.lat)
            && same_bits(&self.lon, &other.lon)
            && same_bits(&self.grid, &other.grid)
    }
}

impl Climatology {
    /// Creates a climatology over the given coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Validation`] if `grid` does not have
    /// `lat.len() * lon.len()` values.
    pub fn new(lat: Vec<f64>, lon: Vec<f64>, grid: Vec<f64>) -> Result<Self, ArchiveError> {
        let expected = lat.len() * lon.len();
        if grid.len() != expected {
            return Err(ArchiveError::Validation {
                count: 1,
                details: format!(
                    "climatology grid has {} values, expected {expected} ({} lat x {} lon)",
                    grid.len(),
                    lat.len(),
                    lon.len()
                ),
            });
        }
        Ok(Self { lat, lon, grid })
    }

    /// Latitude coordinate.
    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    /// Longitude coordinate.
    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    /// Reference values, longitude varying fastest.
    pub fn grid(&self) -> &[f64] {
        &self.grid
    }
}

/// Subtracts `climatology` from every complete lead year of `means`.
///
/// The result's field is named `<field>_anomaly`.
///
/// # Errors
///
/// Returns [`ArchiveError::SpatialGridMismatch`] if the climatology grid
/// differs from the archive grid. Grids are never reprojected.
pub fn anomalies(
    means: &LeadYearMeans,
    climatology: &Climatology,
) -> Result<LeadYearMeans, ArchiveError> {
    let reason = compare_axis("lat", means.lat(), climatology.lat())
        .or_else(|| compare_axis("lon", means.lon(), climatology.lon()));
    if let Some(reason) = reason {
        return Err(ArchiveError::SpatialGridMismatch {
            source_id: "climatology".to_string(),
            reference: "archive".to_string(),
            reason,
        });
    }

    let mut out = means.clone();
    out.field = format!("{}_anomaly", means.field);
    let n = climatology.grid.len();
    for (block, values) in out.values.chunks_exact_mut(n).enumerate() {
        if !out.filled[block] {
            continue;
        }
        for (v, c) in values.iter_mut().zip(&climatology.grid) {
            *v -= c;
        }
    }
    info!(
        field = %out.field,
        n_lead_years = out.n_filled(),
        "computed lead-year anomalies"
    );
    Ok(out)
}
