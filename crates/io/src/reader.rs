//! High-level NetCDF reader configuration and orchestration.

use std::path::{Path, PathBuf};

use decadal_archive::{
    Climatology, Dataset, GridSeries, LoadConfig, MergedArchive, RawRun, load_run, merge_runs,
};
use decadal_calendar::CfCalendar;
use tracing::info;

use crate::dataset::NetcdfDataset;
use crate::error::IoError;
use crate::validate::{ValidationCollector, validate_inputs};

// ---------------------------------------------------------------------------
// ReaderConfig
// ---------------------------------------------------------------------------

/// Configuration for reading runs from NetCDF files.
///
/// Use the builder methods (`with_*`) to customise the time variable,
/// coordinate aliases, and the calendar assumed when a time variable has no
/// `calendar` attribute. The [`Default`] implementation supplies CF-convention
/// names suitable for CMIP-style model output.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderConfig {
    /// NetCDF variable name for the time axis.
    time_var: String,
    /// Aliases to try when looking up latitude coordinates.
    lat_aliases: Vec<String>,
    /// Aliases to try when looking up longitude coordinates.
    lon_aliases: Vec<String>,
    /// Calendar used when the time variable carries none.
    default_calendar: CfCalendar,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            time_var: "time".into(),
            lat_aliases: vec!["lat".into(), "latitude".into(), "y".into()],
            lon_aliases: vec!["lon".into(), "longitude".into(), "x".into()],
            default_calendar: CfCalendar::ProlepticGregorian,
        }
    }
}

impl ReaderConfig {
    /// Set the time variable name.
    pub fn with_time_var(mut self, name: impl Into<String>) -> Self {
        self.time_var = name.into();
        self
    }

    /// Replace the latitude aliases.
    pub fn with_lat_aliases(mut self, aliases: Vec<String>) -> Self {
        self.lat_aliases = aliases;
        self
    }

    /// Replace the longitude aliases.
    pub fn with_lon_aliases(mut self, aliases: Vec<String>) -> Self {
        self.lon_aliases = aliases;
        self
    }

    /// Set the calendar assumed for time variables without one.
    pub fn with_default_calendar(mut self, calendar: CfCalendar) -> Self {
        self.default_calendar = calendar;
        self
    }

    /// Returns the time variable name.
    pub fn time_var(&self) -> &str {
        &self.time_var
    }

    /// Returns the latitude aliases.
    pub fn lat_aliases(&self) -> &[String] {
        &self.lat_aliases
    }

    /// Returns the longitude aliases.
    pub fn lon_aliases(&self) -> &[String] {
        &self.lon_aliases
    }

    /// Returns the fallback calendar.
    pub fn default_calendar(&self) -> CfCalendar {
        self.default_calendar
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] listing every blank name or empty
    /// alias list.
    pub fn validate(&self) -> Result<(), IoError> {
        let mut c = ValidationCollector::new();
        if self.time_var.trim().is_empty() {
            c.push("time_var is empty");
        }
        for (label, aliases) in [("lat", &self.lat_aliases), ("lon", &self.lon_aliases)] {
            if aliases.is_empty() {
                c.push(format!("no {label} aliases"));
            } else if aliases.iter().any(|a| a.trim().is_empty()) {
                c.push(format!("blank {label} alias"));
            }
        }
        c.finish()
    }
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

/// Load one run from a NetCDF file.
///
/// # Errors
///
/// Returns [`IoError`] if the file cannot be opened, or
/// [`IoError::Archive`] carrying the loader's error.
pub fn read_run(
    path: &Path,
    load: &LoadConfig,
    reader: &ReaderConfig,
) -> Result<RawRun, IoError> {
    let dataset = NetcdfDataset::open(path, reader)?;
    Ok(load_run(&dataset, load)?)
}

/// Validate, load and merge a set of run files.
///
/// Files are opened one at a time, in the order given.
///
/// # Errors
///
/// Returns the first validation, open, or loader error, or
/// [`IoError::Archive`] with the merge engine's error.
pub fn merge_files(
    paths: &[PathBuf],
    load: &LoadConfig,
    reader: &ReaderConfig,
) -> Result<MergedArchive, IoError> {
    load.validate()?;
    reader.validate()?;
    validate_inputs(paths)?;

    let mut runs = Vec::with_capacity(paths.len());
    for path in paths {
        let run = read_run(path, load, reader)?;
        info!(
            path = %path.display(),
            initialization_year = run.initialization_year(),
            n_months = run.n_months(),
            "read run"
        );
        runs.push(run);
    }
    Ok(merge_runs(&runs)?)
}

// ---------------------------------------------------------------------------
// Climatology
// ---------------------------------------------------------------------------

/// Read a reference grid for anomaly computation.
///
/// `field` must be `(lat, lon)`, or `(time, lat, lon)` with a single time
/// step. Missing markers become `NaN`.
///
/// # Errors
///
/// Returns [`IoError::MissingVariable`] if `field` is absent,
/// [`IoError::DimensionMismatch`] for any other layout, or
/// [`IoError::Archive`] if the grid does not match the coordinates.
pub fn read_climatology(
    path: &Path,
    field: &str,
    reader: &ReaderConfig,
) -> Result<Climatology, IoError> {
    let dataset = NetcdfDataset::open(path, reader)?;
    let lat = dataset.lat()?;
    let lon = dataset.lon()?;

    let series = dataset.field(field)?;
    let shape = series.shape();
    let grid = match shape.as_slice() {
        [_, _] => series.read_all()?,
        [1, _, _] => series.read_step(0)?,
        [n_time, _, _] => {
            return Err(IoError::DimensionMismatch {
                name: format!("{field} time"),
                expected: 1,
                got: *n_time,
            });
        }
        other => {
            return Err(IoError::DimensionMismatch {
                name: format!("{field} dimensions"),
                expected: 2,
                got: other.len(),
            });
        }
    };

    info!(path = %path.display(), field, n_points = grid.len(), "read climatology");
    Ok(Climatology::new(lat, lon, grid)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_defaults() {
        let cfg = ReaderConfig::default();
        assert_eq!(cfg.time_var(), "time");
        assert_eq!(cfg.lat_aliases(), &["lat", "latitude", "y"]);
        assert_eq!(cfg.lon_aliases(), &["lon", "longitude", "x"]);
        assert_eq!(cfg.default_calendar(), CfCalendar::ProlepticGregorian);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn reader_builder() {
        let cfg = ReaderConfig::default()
            .with_time_var("t")
            .with_lat_aliases(vec!["nav_lat".into()])
            .with_default_calendar(CfCalendar::NoLeap);
        assert_eq!(cfg.time_var(), "t");
        assert_eq!(cfg.lat_aliases(), &["nav_lat"]);
        assert_eq!(cfg.default_calendar(), CfCalendar::NoLeap);
    }

    #[test]
    fn reader_validate_collects_problems() {
        let err = ReaderConfig::default()
            .with_time_var(" ")
            .with_lon_aliases(vec![])
            .validate()
            .unwrap_err();
        match err {
            IoError::Validation { count, details } => {
                assert_eq!(count, 2);
                assert!(details.contains("time_var is empty"));
                assert!(details.contains("no lon aliases"));
            }
            other => panic!("expected IoError::Validation, got {other:?}"),
        }
    }
}
