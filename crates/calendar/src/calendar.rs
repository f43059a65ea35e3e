//! CF calendar kinds and month lengths.

use std::fmt;
use std::str::FromStr;

use crate::error::CalendarError;

/// Number of days in each month of a 365-day year (index 0 unused).
pub(crate) const DAYS_PER_MONTH: [u8; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// 0-based day offset at which each month starts in a 365-day year (index 0 unused).
pub(crate) const MONTH_START_NOLEAP: [u16; 13] =
    [0, 0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// 0-based day offset at which each month starts in a 366-day year (index 0 unused).
pub(crate) const MONTH_START_LEAP: [u16; 13] =
    [0, 0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335];

/// A calendar named by the CF `calendar` attribute of a time variable.
///
/// `standard` and `gregorian` are treated as proleptic Gregorian. The mixed
/// Julian/Gregorian calendar only differs before October 1582, which is
/// outside the range of any model output this crate deals with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CfCalendar {
    /// `standard`, `gregorian`, `proleptic_gregorian`.
    #[default]
    ProlepticGregorian,
    /// `noleap`, `365_day`.
    NoLeap,
    /// `all_leap`, `366_day`.
    AllLeap,
    /// `360_day`: twelve months of 30 days.
    Day360,
}

impl CfCalendar {
    /// Parse a CF calendar name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::UnknownCalendar`] for names outside the
    /// supported set (including `julian` and `none`).
    pub fn parse(name: &str) -> Result<Self, CalendarError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" | "gregorian" | "proleptic_gregorian" => Ok(Self::ProlepticGregorian),
            "noleap" | "365_day" => Ok(Self::NoLeap),
            "all_leap" | "366_day" => Ok(Self::AllLeap),
            "360_day" => Ok(Self::Day360),
            _ => Err(CalendarError::UnknownCalendar {
                name: name.to_string(),
            }),
        }
    }

    /// Canonical CF name of this calendar.
    pub fn name(self) -> &'static str {
        match self {
            Self::ProlepticGregorian => "proleptic_gregorian",
            Self::NoLeap => "noleap",
            Self::AllLeap => "all_leap",
            Self::Day360 => "360_day",
        }
    }

    /// Number of days in `month` of `year`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidMonth`] if `month` is not in 1..=12.
    pub fn days_in_month(self, year: i32, month: u8) -> Result<u8, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth { month });
        }
        let days = match self {
            Self::ProlepticGregorian if month == 2 && is_gregorian_leap(year) => 29,
            Self::ProlepticGregorian | Self::NoLeap => DAYS_PER_MONTH[month as usize],
            Self::AllLeap if month == 2 => 29,
            Self::AllLeap => DAYS_PER_MONTH[month as usize],
            Self::Day360 => 30,
        };
        Ok(days)
    }

    /// Number of days in `year`.
    pub fn days_in_year(self, year: i32) -> u16 {
        match self {
            Self::ProlepticGregorian if is_gregorian_leap(year) => 366,
            Self::ProlepticGregorian | Self::NoLeap => 365,
            Self::AllLeap => 366,
            Self::Day360 => 360,
        }
    }
}

impl FromStr for CfCalendar {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CfCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) fn is_gregorian_leap(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
