//! NetCDF archive writer.

use std::path::Path;

use decadal_archive::{LeadYearMeans, MergedArchive};
use tracing::info;

use crate::error::IoError;
use crate::validate::ValidationCollector;

const INIT_DIM: &str = "initialization_year";
const LEAD_DIM: &str = "lead_year";
const MONTH_DIM: &str = "month";
const LAT_DIM: &str = "lat";
const LON_DIM: &str = "lon";

/// Default `_FillValue` for written data variables.
pub const DEFAULT_FILL_VALUE: f64 = 1.0e20;

/// Configuration for writing archives to NetCDF.
#[derive(Debug, Clone, PartialEq)]
pub struct WriterConfig {
    /// Value written for missing cells, also stored as `_FillValue`.
    fill_value: f64,
    /// Deflate level (0..=9) for the data variable; `None` disables compression.
    deflate_level: Option<u8>,
    /// Whether to add the `valid_time` variable.
    valid_time: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            fill_value: DEFAULT_FILL_VALUE,
            deflate_level: None,
            valid_time: false,
        }
    }
}

impl WriterConfig {
    /// Sets the fill value.
    pub fn with_fill_value(mut self, fill_value: f64) -> Self {
        self.fill_value = fill_value;
        self
    }

    /// Sets the deflate level, or `None` to disable compression.
    pub fn with_deflate_level(mut self, level: Option<u8>) -> Self {
        self.deflate_level = level;
        self
    }

    /// Enables or disables the `valid_time` variable.
    pub fn with_valid_time(mut self, valid_time: bool) -> Self {
        self.valid_time = valid_time;
        self
    }

    /// Returns the fill value.
    pub fn fill_value(&self) -> f64 {
        self.fill_value
    }

    /// Returns the deflate level.
    pub fn deflate_level(&self) -> Option<u8> {
        self.deflate_level
    }

    /// Returns whether `valid_time` is written.
    pub fn valid_time(&self) -> bool {
        self.valid_time
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if the fill value is not finite or the
    /// deflate level exceeds 9.
    pub fn validate(&self) -> Result<(), IoError> {
        let mut c = ValidationCollector::new();
        if !self.fill_value.is_finite() {
            c.push(format!("fill_value must be finite, got {}", self.fill_value));
        }
        if let Some(level) = self.deflate_level
            && level > 9
        {
            c.push(format!("deflate_level {level} not in 0..=9"));
        }
        c.finish()
    }
}

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

fn put_grid_coordinates(
    file: &mut netcdf::FileMut,
    lat: &[f64],
    lon: &[f64],
) -> Result<(), IoError> {
    file.add_dimension(LAT_DIM, lat.len())?;
    file.add_dimension(LON_DIM, lon.len())?;
    {
        let mut var = file.add_variable::<f64>(LAT_DIM, &[LAT_DIM])?;
        var.put_attribute("units", "degrees_north")?;
        var.put_attribute("standard_name", "latitude")?;
        var.put_values(lat, ..)?;
    }
    {
        let mut var = file.add_variable::<f64>(LON_DIM, &[LON_DIM])?;
        var.put_attribute("units", "degrees_east")?;
        var.put_attribute("standard_name", "longitude")?;
        var.put_values(lon, ..)?;
    }
    Ok(())
}

fn put_lead_axes(
    file: &mut netcdf::FileMut,
    initialization_years: &[i32],
    max_lead_year: u32,
) -> Result<(), IoError> {
    file.add_dimension(INIT_DIM, initialization_years.len())?;
    file.add_dimension(LEAD_DIM, max_lead_year as usize)?;
    {
        let mut var = file.add_variable::<i32>(INIT_DIM, &[INIT_DIM])?;
        var.put_attribute("long_name", "year of forecast initialization")?;
        var.put_values(initialization_years, ..)?;
    }
    {
        let leads: Vec<i32> = (1..=max_lead_year as i32).collect();
        let mut var = file.add_variable::<i32>(LEAD_DIM, &[LEAD_DIM])?;
        var.put_attribute("long_name", "forecast year counted from initialization")?;
        var.put_values(&leads, ..)?;
    }
    Ok(())
}

fn put_data_variable(
    file: &mut netcdf::FileMut,
    name: &str,
    dims: &[&str],
    values: &[f64],
    config: &WriterConfig,
) -> Result<(), IoError> {
    let mut var = file.add_variable::<f64>(name, dims)?;
    if let Some(level) = config.deflate_level {
        var.set_compression(i32::from(level), true)?;
    }
    var.put_attribute("_FillValue", config.fill_value)?;
    var.put_attribute("missing_value", config.fill_value)?;
    var.put_values(values, ..)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Write a merged archive.
///
/// The data variable is named after the archive's field and laid out
/// `(initialization_year, lead_year, month, lat, lon)`. Missing cells hold
/// the configured fill value. With `valid_time` enabled an `i32` variable
/// over `(initialization_year, lead_year, month)` gives each cell's calendar
/// month as `YYYYMM`, or `-1` where that does not fit an `i32`. An `i8`
/// `filled` variable over the same dimensions is 1 where a run covered the
/// cell, so a fill value inside a covered cell stays distinguishable from
/// no coverage.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if `config` is invalid, or
/// [`IoError::Netcdf`] if the file cannot be written.
pub fn write_archive(
    path: &Path,
    archive: &MergedArchive,
    config: &WriterConfig,
) -> Result<(), IoError> {
    config.validate()?;
    let mut file = netcdf::create(path)?;

    put_lead_axes(&mut file, archive.initialization_years(), archive.max_lead_year())?;
    file.add_dimension(MONTH_DIM, 12)?;
    {
        let months: Vec<i32> = archive.months().into_iter().map(i32::from).collect();
        let mut var = file.add_variable::<i32>(MONTH_DIM, &[MONTH_DIM])?;
        var.put_attribute("long_name", "month of the lead year")?;
        var.put_values(&months, ..)?;
    }
    {
        let months: Vec<i32> = archive
            .initialization_months()
            .iter()
            .map(|&m| i32::from(m))
            .collect();
        let mut var = file.add_variable::<i32>("initialization_month", &[INIT_DIM])?;
        var.put_attribute("long_name", "calendar month of forecast initialization")?;
        var.put_values(&months, ..)?;
    }
    put_grid_coordinates(&mut file, archive.lat(), archive.lon())?;

    if config.valid_time {
        let mut stamps = Vec::with_capacity(archive.n_cells());
        for &year in archive.initialization_years() {
            for lead in archive.lead_years() {
                for month in archive.months() {
                    let stamp = archive
                        .valid_month(year, lead, month)
                        .and_then(|ym| ym.yyyymm())
                        .unwrap_or(-1);
                    stamps.push(stamp);
                }
            }
        }
        let mut var = file.add_variable::<i32>("valid_time", &[INIT_DIM, LEAD_DIM, MONTH_DIM])?;
        var.put_attribute("long_name", "calendar month of each cell (YYYYMM)")?;
        var.put_attribute("_FillValue", -1_i32)?;
        var.put_values(&stamps, ..)?;
    }

    {
        let mask: Vec<i8> = archive
            .store()
            .filled_mask()
            .iter()
            .map(|&f| i8::from(f))
            .collect();
        let mut var = file.add_variable::<i8>("filled", &[INIT_DIM, LEAD_DIM, MONTH_DIM])?;
        var.put_attribute("long_name", "1 where a run covered the cell")?;
        var.put_values(&mask, ..)?;
    }

    put_data_variable(
        &mut file,
        archive.field(),
        &[INIT_DIM, LEAD_DIM, MONTH_DIM, LAT_DIM, LON_DIM],
        &archive.to_filled_values(config.fill_value),
        config,
    )?;

    file.add_attribute("title", "decadal hindcast archive by lead year")?;
    file.add_attribute("source_files", archive.sources().join(", "))?;

    info!(
        path = %path.display(),
        field = archive.field(),
        dims = ?archive.shape().dims(),
        missing = archive.n_missing_cells(),
        "wrote archive"
    );
    Ok(())
}

/// Write lead-year means (or anomalies) as `var_name` over
/// `(initialization_year, lead_year, lat, lon)`.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if `config` is invalid or `var_name` is
/// blank, or [`IoError::Netcdf`] if the file cannot be written.
pub fn write_lead_year_means(
    path: &Path,
    means: &LeadYearMeans,
    var_name: &str,
    config: &WriterConfig,
) -> Result<(), IoError> {
    config.validate()?;
    if var_name.trim().is_empty() {
        return Err(IoError::Validation {
            count: 1,
            details: "variable name is empty".to_string(),
        });
    }
    let mut file = netcdf::create(path)?;

    put_lead_axes(&mut file, means.initialization_years(), means.max_lead_year())?;
    put_grid_coordinates(&mut file, means.lat(), means.lon())?;
    put_data_variable(
        &mut file,
        var_name,
        &[INIT_DIM, LEAD_DIM, LAT_DIM, LON_DIM],
        &means.to_filled_values(config.fill_value),
        config,
    )?;

    file.add_attribute("title", "decadal hindcast lead-year means")?;
    file.add_attribute("source_field", means.field())?;

    info!(
        path = %path.display(),
        var = var_name,
        dims = ?means.dims(),
        "wrote lead-year means"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_defaults() {
        let cfg = WriterConfig::default();
        assert_eq!(cfg.fill_value(), 1.0e20);
        assert_eq!(cfg.deflate_level(), None);
        assert!(!cfg.valid_time());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn writer_builder() {
        let cfg = WriterConfig::default()
            .with_fill_value(-999.0)
            .with_deflate_level(Some(4))
            .with_valid_time(true);
        assert_eq!(cfg.fill_value(), -999.0);
        assert_eq!(cfg.deflate_level(), Some(4));
        assert!(cfg.valid_time());
    }

    #[test]
    fn writer_validate_collects_problems() {
        let err = WriterConfig::default()
            .with_fill_value(f64::NAN)
            .with_deflate_level(Some(12))
            .validate()
            .unwrap_err();
        match err {
            IoError::Validation { count, details } => {
                assert_eq!(count, 2);
                assert!(details.contains("fill_value"));
                assert!(details.contains("deflate_level 12"));
            }
            other => panic!("expected IoError::Validation, got {other:?}"),
        }
    }
}
