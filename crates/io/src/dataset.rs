//! [`Dataset`] implementation over a NetCDF file.

use std::path::{Path, PathBuf};

use decadal_archive::{Dataset, GridSeries};
use decadal_calendar::CalendarDate;
use tracing::debug;

use crate::error::IoError;
use crate::netcdf_read;
use crate::reader::ReaderConfig;

/// One forecast run stored in a NetCDF file.
///
/// Metadata is read on demand; field values are read one `(lat, lon)` slice
/// per time step.
pub struct NetcdfDataset {
    path: PathBuf,
    source_id: String,
    file: netcdf::File,
    config: ReaderConfig,
}

impl std::fmt::Debug for NetcdfDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetcdfDataset")
            .field("path", &self.path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl NetcdfDataset {
    /// Opens `path` for reading.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if `config` is invalid,
    /// [`IoError::FileNotFound`] if the file does not exist, or
    /// [`IoError::Netcdf`] if it cannot be opened.
    pub fn open(path: &Path, config: &ReaderConfig) -> Result<Self, IoError> {
        config.validate()?;
        let file = netcdf_read::open_file(path)?;
        debug!(path = %path.display(), "opened run");
        Ok(Self {
            path: path.to_path_buf(),
            source_id: path.display().to_string(),
            file,
            config: config.clone(),
        })
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A `(time, lat, lon)` variable of a [`NetcdfDataset`].
pub struct NetcdfField<'f> {
    var: netcdf::Variable<'f>,
    shape: Vec<usize>,
    markers: Vec<f64>,
}

impl NetcdfField<'_> {
    /// Reads the whole variable, whatever its rank.
    pub(crate) fn read_all(&self) -> Result<Vec<f64>, IoError> {
        let mut values = self.var.get_values::<f64, _>(..)?;
        netcdf_read::mask_missing(&mut values, &self.markers);
        Ok(values)
    }
}

impl GridSeries for NetcdfField<'_> {
    type Error = IoError;

    fn shape(&self) -> Vec<usize> {
        self.shape.clone()
    }

    fn read_step(&self, t: usize) -> Result<Vec<f64>, IoError> {
        let [n_time, n_lat, n_lon] = self.shape[..] else {
            return Err(IoError::DimensionMismatch {
                name: format!("{} dimensions", self.var.name()),
                expected: 3,
                got: self.shape.len(),
            });
        };
        if t >= n_time {
            return Err(IoError::DimensionMismatch {
                name: format!("{} time index", self.var.name()),
                expected: n_time,
                got: t,
            });
        }
        let mut values = self.var.get_values::<f64, _>((t, 0..n_lat, 0..n_lon))?;
        netcdf_read::mask_missing(&mut values, &self.markers);
        Ok(values)
    }
}

impl Dataset for NetcdfDataset {
    type Error = IoError;
    type Field<'a> = NetcdfField<'a>;

    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn time_axis(&self) -> Result<Vec<CalendarDate>, IoError> {
        netcdf_read::read_time_axis(
            &self.file,
            self.config.time_var(),
            self.config.default_calendar(),
            &self.path,
        )
    }

    fn field(&self, name: &str) -> Result<NetcdfField<'_>, IoError> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| IoError::MissingVariable {
                name: name.to_string(),
                path: self.path.clone(),
            })?;
        let shape = var.dimensions().iter().map(|d| d.len()).collect();
        let markers = netcdf_read::missing_markers(&var);
        Ok(NetcdfField {
            var,
            shape,
            markers,
        })
    }

    fn lat(&self) -> Result<Vec<f64>, IoError> {
        netcdf_read::read_1d_f64(&self.file, self.config.lat_aliases(), &self.path)
    }

    fn lon(&self) -> Result<Vec<f64>, IoError> {
        netcdf_read::read_1d_f64(&self.file, self.config.lon_aliases(), &self.path)
    }
}
