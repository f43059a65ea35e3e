//! Month-resolution timestamps.

use std::fmt;

use crate::error::CalendarError;

/// A calendar month: year plus month number.
///
/// Month-level arithmetic is identical in every CF calendar, which is why
/// monthly model output can be aligned without knowing which calendar each
/// file used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u8,
}

impl YearMonth {
    /// Creates a new `YearMonth`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidMonth`] if `month` is not in 1..=12.
    pub fn new(year: i32, month: u8) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth { month });
        }
        Ok(Self { year, month })
    }

    /// Constructor for components already validated by a `CalendarDate`.
    pub(crate) fn from_valid(year: i32, month: u8) -> Self {
        debug_assert!((1..=12).contains(&month));
        Self { year, month }
    }

    /// Returns the year.
    pub fn year(self) -> i32 {
        self.year
    }

    /// Returns the month (1..=12).
    pub fn month(self) -> u8 {
        self.month
    }

    /// Months since `0000-01`.
    pub fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    /// Inverse of [`ordinal`](Self::ordinal); `None` if the year overflows `i32`.
    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        let year = i32::try_from(ordinal.div_euclid(12)).ok()?;
        let month = ordinal.rem_euclid(12) as u8 + 1;
        Some(Self { year, month })
    }

    /// Signed number of months from `earlier` to `self`.
    pub fn months_since(self, earlier: YearMonth) -> i64 {
        self.ordinal() - earlier.ordinal()
    }

    /// Returns the month `n` months after this one, or `None` on overflow.
    pub fn checked_add_months(self, n: i64) -> Option<Self> {
        Self::from_ordinal(self.ordinal().checked_add(n)?)
    }

    /// Returns the following month.
    ///
    /// December wraps to January of the following year.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// `YYYYMM` encoding, e.g. `199011`, or `None` if it does not fit `i32`.
    pub fn yyyymm(self) -> Option<i32> {
        self.year
            .checked_mul(100)?
            .checked_add(i32::from(self.month))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_validates_month() {
        assert!(YearMonth::new(1990, 1).is_ok());
        assert!(YearMonth::new(1990, 12).is_ok());
        assert_eq!(
            YearMonth::new(1990, 0).unwrap_err(),
            CalendarError::InvalidMonth { month: 0 }
        );
        assert_eq!(
            YearMonth::new(1990, 13).unwrap_err(),
            CalendarError::InvalidMonth { month: 13 }
        );
    }

    #[test]
    fn next_wraps_year() {
        let dec = YearMonth::new(1990, 12).unwrap();
        assert_eq!(dec.next(), YearMonth::new(1991, 1).unwrap());
        let jun = YearMonth::new(1990, 6).unwrap();
        assert_eq!(jun.next(), YearMonth::new(1990, 7).unwrap());
    }

    #[test]
    fn months_since_signed() {
        let a = YearMonth::new(1990, 11).unwrap();
        let b = YearMonth::new(1992, 2).unwrap();
        assert_eq!(b.months_since(a), 15);
        assert_eq!(a.months_since(b), -15);
        assert_eq!(a.months_since(a), 0);
    }

    #[test]
    fn ordinal_roundtrip_including_negative_years() {
        for ordinal in [-25, -13, -12, -1, 0, 1, 11, 12, 23_891] {
            let ym = YearMonth::from_ordinal(ordinal).unwrap();
            assert_eq!(ym.ordinal(), ordinal);
        }
        assert_eq!(
            YearMonth::from_ordinal(-1).unwrap(),
            YearMonth::new(-1, 12).unwrap()
        );
    }

    #[test]
    fn checked_add_months() {
        let a = YearMonth::new(1990, 11).unwrap();
        assert_eq!(
            a.checked_add_months(14).unwrap(),
            YearMonth::new(1992, 1).unwrap()
        );
        assert_eq!(
            a.checked_add_months(-11).unwrap(),
            YearMonth::new(1989, 12).unwrap()
        );
        assert!(a.checked_add_months(i64::MAX).is_none());
    }

    #[test]
    fn ordering_is_chronological() {
        let a = YearMonth::new(1990, 12).unwrap();
        let b = YearMonth::new(1991, 1).unwrap();
        assert!(a < b);
    }

    #[test]
    fn display_and_yyyymm() {
        let ym = YearMonth::new(1990, 3).unwrap();
        assert_eq!(ym.to_string(), "1990-03");
        assert_eq!(ym.yyyymm(), Some(199_003));
    }

    #[test]
    fn yyyymm_out_of_range() {
        assert_eq!(YearMonth::new(30_000_000, 1).unwrap().yyyymm(), None);
        assert_eq!(YearMonth::new(-5, 12).unwrap().yyyymm(), Some(-488));
        assert_eq!(
            YearMonth::new(21_474_836, 1).unwrap().yyyymm(),
            Some(2_147_483_601)
        );
    }
}
