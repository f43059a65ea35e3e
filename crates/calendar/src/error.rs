//! Error types for the decadal-calendar crate.

use crate::year_month::YearMonth;

/// Error type for all fallible operations in the decadal-calendar crate.
///
/// Covers invalid date components, unknown calendar names, malformed CF
/// time units, and offsets that cannot be turned into a date.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    /// Returned when a month number is outside the valid range 1..=12.
    #[error("invalid month: {month} (must be 1..=12)")]
    InvalidMonth {
        /// The invalid month number that was provided.
        month: u8,
    },

    /// Returned when a day number exceeds the length of its month.
    #[error("invalid day: {day} for {year}-{month:02} (max {max_day})")]
    InvalidDay {
        /// Year of the rejected date.
        year: i32,
        /// Month of the rejected date.
        month: u8,
        /// The invalid day number that was provided.
        day: u8,
        /// The maximum valid day for the month in the active calendar.
        max_day: u8,
    },

    /// Returned when a lead month is outside 0..=11.
    #[error("invalid lead month: {lead_month} (must be 0..=11)")]
    InvalidLeadMonth {
        /// The invalid lead month.
        lead_month: u8,
    },

    /// Returned when a `calendar` attribute names an unsupported calendar.
    #[error("unknown calendar: '{name}'")]
    UnknownCalendar {
        /// The calendar name as found in the file.
        name: String,
    },

    /// Returned when a CF `units` string cannot be parsed.
    #[error("invalid time units '{units}': {reason}")]
    InvalidUnits {
        /// The units string as found in the file.
        units: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Returned when a numeric time offset cannot be decoded.
    #[error("cannot decode time offset {offset}: {reason}")]
    InvalidOffset {
        /// The raw offset value.
        offset: f64,
        /// Why decoding failed.
        reason: String,
    },

    /// Returned when a date falls outside the representable range.
    #[error("date out of range: {reason}")]
    OutOfRange {
        /// Description of the overflow.
        reason: String,
    },

    /// Returned when a timestamp precedes the forecast initialization.
    #[error("{at} precedes initialization month {init}")]
    BeforeInitialization {
        /// The initialization month.
        init: YearMonth,
        /// The offending timestamp.
        at: YearMonth,
    },
}
