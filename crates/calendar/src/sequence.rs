//! Contiguous monthly sequences.

use crate::year_month::YearMonth;

/// Generates a contiguous sequence of months.
///
/// Starting from `start`, produces exactly `n_months` consecutive months.
/// December wraps to January of the following year.
///
/// # Example
///
/// ```ignore
/// let start = YearMonth::new(1990, 11).unwrap();
/// let months = monthly_sequence(start, 4);
/// // 1990-11, 1990-12, 1991-01, 1991-02
/// ```
pub fn monthly_sequence(start: YearMonth, n_months: usize) -> Vec<YearMonth> {
    let mut months = Vec::with_capacity(n_months);
    if n_months == 0 {
        return months;
    }
    months.push(start);
    let mut current = start;
    for _ in 1..n_months {
        current = current.next();
        months.push(current);
    }
    months
}
