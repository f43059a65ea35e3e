//! Error types for decadal-archive.

use decadal_calendar::CalendarError;

/// Error type for loading runs and merging them into an archive.
///
/// Every variant is fatal for the operation that produced it. Variants raised
/// while loading a single run carry the `source_id` of the offending input;
/// structural merge errors name every input involved.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArchiveError {
    /// The time axis is empty, not strictly increasing, or skips a month.
    #[error("{source_id}: malformed time axis: {reason}")]
    MalformedTimeAxis {
        /// Input that was being loaded.
        source_id: String,
        /// What is wrong with the axis.
        reason: String,
    },

    /// The latitude or longitude axis has no points.
    #[error("{source_id}: empty spatial grid ({n_lat} lat x {n_lon} lon)")]
    EmptyGrid {
        /// Input that was being loaded.
        source_id: String,
        /// Number of latitude points.
        n_lat: usize,
        /// Number of longitude points.
        n_lon: usize,
    },

    /// The requested field is not shaped `(time, lat, lon)` over the
    /// dataset's own axes.
    #[error("{source_id}: field '{field}' has shape {got:?}, expected {expected:?} (time, lat, lon)")]
    FieldShapeMismatch {
        /// Input that was being loaded.
        source_id: String,
        /// Name of the field.
        field: String,
        /// Shape implied by the time, lat and lon axes.
        expected: [usize; 3],
        /// Shape reported by the field.
        got: Vec<usize>,
    },

    /// The initialization year derived from the time axis disagrees with the
    /// year encoded in the input's name.
    #[error(
        "{source_id}: initialization year {from_time_axis} from the time axis disagrees with the file name ({from_name})"
    )]
    InitializationYearConflict {
        /// Input that was being loaded.
        source_id: String,
        /// Year of the first timestamp.
        from_time_axis: i32,
        /// Year found in the name, or a note that none was found.
        from_name: String,
    },

    /// Two runs report the same initialization year.
    #[error("initialization year {year} appears in both {first} and {second}")]
    DuplicateInitializationYear {
        /// The repeated year.
        year: i32,
        /// Input that claimed the year first.
        first: String,
        /// Input that repeated it.
        second: String,
    },

    /// A run's lat/lon coordinates differ from the reference grid.
    #[error("{source_id}: spatial grid differs from {reference}: {reason}")]
    SpatialGridMismatch {
        /// Input whose grid was rejected.
        source_id: String,
        /// Input (or dataset) providing the reference grid.
        reference: String,
        /// First difference found.
        reason: String,
    },

    /// A cell of the archive would be written twice.
    #[error(
        "{source_id}: cell (initialization_year={initialization_year}, lead_year={lead_year}, month={month}) is already filled"
    )]
    OverlappingAssignment {
        /// Input whose value would overwrite the cell.
        source_id: String,
        /// Initialization year of the cell.
        initialization_year: i32,
        /// Lead year of the cell.
        lead_year: u32,
        /// Month of the lead year (1..=12).
        month: u8,
    },

    /// No runs were supplied.
    #[error("no runs supplied")]
    EmptyInputSet,

    /// The dataset collaborator failed while being read.
    #[error("{source_id}: {reason}")]
    Dataset {
        /// Input that was being read.
        source_id: String,
        /// Description of the underlying failure.
        reason: String,
    },

    /// The cell store rejected a write.
    #[error("cell store: {reason}")]
    Store {
        /// Description of the rejected write.
        reason: String,
    },

    /// Wraps an error originating from the decadal-calendar crate.
    #[error("calendar error: {reason}")]
    Calendar {
        /// Description of the underlying calendar failure.
        reason: String,
    },

    /// Returned when configuration or input checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },
}

impl From<CalendarError> for ArchiveError {
    fn from(e: CalendarError) -> Self {
        ArchiveError::Calendar {
            reason: e.to_string(),
        }
    }
}
