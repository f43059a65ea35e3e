//! The interface through which runs are read.
//!
//! The loader never touches a file format directly. Anything that can report
//! a time axis, 1D lat/lon coordinates and a `(time, lat, lon)` field can be
//! merged: [`MemoryDataset`](crate::MemoryDataset) for in-memory data, and the
//! NetCDF implementation in `decadal-io`.

use decadal_calendar::CalendarDate;

/// A `(time, lat, lon)` field read one time step at a time.
pub trait GridSeries {
    /// Error raised by reads.
    type Error: std::error::Error;

    /// Dimension lengths of the field, outermost first.
    ///
    /// A well-formed field reports `[n_time, n_lat, n_lon]`; any other rank
    /// is returned as-is so callers can report it.
    fn shape(&self) -> Vec<usize>;

    /// Reads the `(lat, lon)` slice at time index `t`, row-major with
    /// longitude varying fastest. Missing values are `NaN`.
    fn read_step(&self, t: usize) -> Result<Vec<f64>, Self::Error>;
}

/// One forecast run as seen by the loader.
pub trait Dataset {
    /// Error raised by metadata and field lookups.
    type Error: std::error::Error;

    /// Field handle returned by [`field`](Self::field).
    type Field<'a>: GridSeries
    where
        Self: 'a;

    /// Identity of the input, used in every error message.
    fn source_id(&self) -> &str;

    /// Decoded timestamps of the time coordinate, in storage order.
    fn time_axis(&self) -> Result<Vec<CalendarDate>, Self::Error>;

    /// Looks up the named field.
    fn field(&self, name: &str) -> Result<Self::Field<'_>, Self::Error>;

    /// Latitude coordinate values.
    fn lat(&self) -> Result<Vec<f64>, Self::Error>;

    /// Longitude coordinate values.
    fn lon(&self) -> Result<Vec<f64>, Self::Error>;
}
