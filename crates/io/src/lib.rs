//! # decadal-io
//!
//! Read decadal hindcast runs from NetCDF files and write merged lead-year
//! archives back to NetCDF. Bridges the file format into the
//! `decadal-archive` [`Dataset`](decadal_archive::Dataset) interface.
//!
//! ## Quick Start
//!
//! ```ignore
//! use decadal_archive::LoadConfig;
//! use decadal_io::{ReaderConfig, WriterConfig, merge_files, write_archive};
//!
//! let archive = merge_files(&paths, &LoadConfig::new("tas"), &ReaderConfig::default())?;
//! write_archive(Path::new("archive.nc"), &archive, &WriterConfig::default())?;
//! ```

mod dataset;
mod error;
mod netcdf_read;
mod reader;
mod validate;
mod writer;

pub use dataset::{NetcdfDataset, NetcdfField};
pub use error::IoError;
pub use reader::{ReaderConfig, merge_files, read_climatology, read_run};
pub use validate::validate_inputs;
pub use writer::{DEFAULT_FILL_VALUE, WriterConfig, write_archive, write_lead_year_means};
