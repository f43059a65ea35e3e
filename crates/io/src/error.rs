//! Error types for decadal-io.

use std::path::PathBuf;

use decadal_archive::ArchiveError;

/// Error type for all fallible operations in the decadal-io crate.
///
/// This enum covers I/O failures, NetCDF library errors, time-axis decoding
/// issues, validation problems, and data-model mismatches encountered when
/// reading runs or writing archives. Errors from the merge itself pass
/// through unchanged as [`IoError::Archive`].
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Returned when an input does not carry the `.nc` extension.
    #[error("not a NetCDF file: {}", path.display())]
    NotNetcdf {
        /// Offending path.
        path: PathBuf,
    },

    /// Wraps an error originating from the NetCDF library.
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// Description of the underlying NetCDF failure.
        reason: String,
    },

    /// Returned when one or more validation checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Returned when a required variable is not present in a file.
    #[error("variable '{name}' not found in {}", path.display())]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when a dimension has an unexpected size.
    #[error("dimension '{name}' mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Name of the dimension.
        name: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when a time coordinate cannot be decoded.
    #[error("invalid time in {}: {reason}", path.display())]
    InvalidTime {
        /// File whose time axis was being decoded.
        path: PathBuf,
        /// Description of the time decoding issue.
        reason: String,
    },

    /// Loading or merging runs failed.
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

impl From<netcdf::Error> for IoError {
    fn from(e: netcdf::Error) -> Self {
        IoError::Netcdf {
            reason: e.to_string(),
        }
    }
}
