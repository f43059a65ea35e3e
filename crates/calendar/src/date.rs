//! Calendar-aware dates and day numbers.

use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::calendar::{CfCalendar, MONTH_START_LEAP, MONTH_START_NOLEAP};
use crate::error::CalendarError;
use crate::year_month::YearMonth;

/// A date (year, month, day) valid in some [`CfCalendar`].
///
/// The date does not remember its calendar; validity and day arithmetic are
/// always evaluated against the calendar passed in. `1990-02-30` is a valid
/// `CalendarDate` under [`CfCalendar::Day360`] and rejected under every
/// other calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    year: i32,
    month: u8,
    day: u8,
}

impl CalendarDate {
    /// Creates a date after checking it against `calendar`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidMonth`] or [`CalendarError::InvalidDay`]
    /// if the components do not form a date in `calendar`.
    pub fn new(year: i32, month: u8, day: u8, calendar: CfCalendar) -> Result<Self, CalendarError> {
        let max_day = calendar.days_in_month(year, month)?;
        if !(1..=max_day).contains(&day) {
            return Err(CalendarError::InvalidDay {
                year,
                month,
                day,
                max_day,
            });
        }
        Ok(Self { year, month, day })
    }

    /// Returns the year.
    pub fn year(self) -> i32 {
        self.year
    }

    /// Returns the month (1..=12).
    pub fn month(self) -> u8 {
        self.month
    }

    /// Returns the day within the month.
    pub fn day(self) -> u8 {
        self.day
    }

    /// Returns the month this date falls in.
    pub fn year_month(self) -> YearMonth {
        YearMonth::from_valid(self.year, self.month)
    }

    /// Days elapsed since `0000-01-01` of `calendar` (negative before it).
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`] if the proleptic Gregorian
    /// conversion overflows chrono's supported range.
    pub fn day_number(self, calendar: CfCalendar) -> Result<i64, CalendarError> {
        let year = i64::from(self.year);
        let day0 = i64::from(self.day) - 1;
        match calendar {
            CfCalendar::ProlepticGregorian => {
                let date = NaiveDate::from_ymd_opt(self.year, self.month.into(), self.day.into())
                    .ok_or_else(|| CalendarError::OutOfRange {
                        reason: format!("{self} is not representable"),
                    })?;
                // chrono counts from 0001-01-01 = day 1; year 0 has 366 days.
                Ok(i64::from(date.num_days_from_ce()) - 1 + 366)
            }
            CfCalendar::NoLeap => {
                Ok(year * 365 + i64::from(MONTH_START_NOLEAP[self.month as usize]) + day0)
            }
            CfCalendar::AllLeap => {
                Ok(year * 366 + i64::from(MONTH_START_LEAP[self.month as usize]) + day0)
            }
            CfCalendar::Day360 => Ok(year * 360 + (i64::from(self.month) - 1) * 30 + day0),
        }
    }

    /// Inverse of [`day_number`](Self::day_number).
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`] if the resulting year does not
    /// fit the supported range.
    pub fn from_day_number(n: i64, calendar: CfCalendar) -> Result<Self, CalendarError> {
        let out_of_range = || CalendarError::OutOfRange {
            reason: format!("day number {n} in {calendar} calendar"),
        };
        match calendar {
            CfCalendar::ProlepticGregorian => {
                let ce = i32::try_from(n - 366 + 1).map_err(|_| out_of_range())?;
                let date = NaiveDate::from_num_days_from_ce_opt(ce).ok_or_else(out_of_range)?;
                Ok(Self {
                    year: date.year(),
                    month: date.month() as u8,
                    day: date.day() as u8,
                })
            }
            CfCalendar::NoLeap => {
                let year = i32::try_from(n.div_euclid(365)).map_err(|_| out_of_range())?;
                let (month, day) = split_day_of_year(n.rem_euclid(365) as u16, &MONTH_START_NOLEAP);
                Ok(Self { year, month, day })
            }
            CfCalendar::AllLeap => {
                let year = i32::try_from(n.div_euclid(366)).map_err(|_| out_of_range())?;
                let (month, day) = split_day_of_year(n.rem_euclid(366) as u16, &MONTH_START_LEAP);
                Ok(Self { year, month, day })
            }
            CfCalendar::Day360 => {
                let year = i32::try_from(n.div_euclid(360)).map_err(|_| out_of_range())?;
                let rem = n.rem_euclid(360);
                Ok(Self {
                    year,
                    month: (rem / 30) as u8 + 1,
                    day: (rem % 30) as u8 + 1,
                })
            }
        }
    }

    /// Returns the date `days` days after this one in `calendar`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`] on overflow.
    pub fn add_days(self, days: i64, calendar: CfCalendar) -> Result<Self, CalendarError> {
        let n = self
            .day_number(calendar)?
            .checked_add(days)
            .ok_or_else(|| CalendarError::OutOfRange {
                reason: format!("adding {days} days to {self}"),
            })?;
        Self::from_day_number(n, calendar)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Split a 0-based day of year into `(month, day)` using a month-start table.
fn split_day_of_year(doy0: u16, month_start: &[u16; 13]) -> (u8, u8) {
    let month = (1..=12u8)
        .rev()
        .find(|&m| month_start[m as usize] <= doy0)
        .unwrap_or(1);
    let day = doy0 - month_start[month as usize] + 1;
    (month, day as u8)
}
