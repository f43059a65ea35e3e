//! Lead year / lead month derivation.

use crate::error::CalendarError;
use crate::year_month::YearMonth;

/// Position of a forecast month relative to its initialization month.
///
/// `lead_year` counts from 1 (the first twelve months of the forecast);
/// `lead_month` is the 0-based month within that lead year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LeadPosition {
    lead_year: u32,
    lead_month: u8,
}

impl LeadPosition {
    /// Returns the lead year (1-based).
    pub fn lead_year(self) -> u32 {
        self.lead_year
    }

    /// Returns the month offset within the lead year (0..=11).
    pub fn lead_month(self) -> u8 {
        self.lead_month
    }

    /// Returns the 1-based month of the lead year (1..=12).
    pub fn month_of_lead_year(self) -> u8 {
        self.lead_month + 1
    }

    /// Total months elapsed since initialization.
    pub fn months_since_init(self) -> u32 {
        (self.lead_year - 1) * 12 + u32::from(self.lead_month)
    }
}

/// Computes the lead position of month `at` for a forecast initialized in
/// month `init`.
///
/// The initialization month itself is lead year 1, lead month 0.
///
/// # Errors
///
/// Returns [`CalendarError::BeforeInitialization`] if `at` precedes `init`,
/// or [`CalendarError::OutOfRange`] if the distance does not fit `u32`.
///
/// # Examples
///
/// ```ignore
/// let init = YearMonth::new(1990, 11)?;
/// let pos = lead_position(init, YearMonth::new(1991, 11)?)?;
/// assert_eq!((pos.lead_year(), pos.lead_month()), (2, 0));
/// ```
pub fn lead_position(init: YearMonth, at: YearMonth) -> Result<LeadPosition, CalendarError> {
    let months = at.months_since(init);
    if months < 0 {
        return Err(CalendarError::BeforeInitialization { init, at });
    }
    let months = u32::try_from(months).map_err(|_| CalendarError::OutOfRange {
        reason: format!("{months} months between {init} and {at}"),
    })?;
    Ok(LeadPosition {
        lead_year: months / 12 + 1,
        lead_month: (months % 12) as u8,
    })
}

/// Maps a lead month back to the calendar month it falls in, given the
/// calendar month of initialization.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidMonth`] if `init_month` is not in 1..=12,
/// or [`CalendarError::InvalidLeadMonth`] if `lead_month` is not in 0..=11.
pub fn calendar_month(init_month: u8, lead_month: u8) -> Result<u8, CalendarError> {
    if !(1..=12).contains(&init_month) {
        return Err(CalendarError::InvalidMonth { month: init_month });
    }
    if lead_month > 11 {
        return Err(CalendarError::InvalidLeadMonth { lead_month });
    }
    Ok((init_month - 1 + lead_month) % 12 + 1)
}
