//! CF time-unit parsing and offset decoding.

use crate::calendar::CfCalendar;
use crate::date::CalendarDate;
use crate::error::CalendarError;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Largest absolute day offset accepted by [`TimeUnits::decode`].
const MAX_DAY_OFFSET: f64 = 1.0e9;

/// The unit of a CF `"<unit> since <reference>"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeStep {
    /// `seconds`, `second`, `secs`, `sec`, `s`.
    Seconds,
    /// `minutes`, `minute`, `mins`, `min`.
    Minutes,
    /// `hours`, `hour`, `hrs`, `hr`, `h`.
    Hours,
    /// `days`, `day`, `d`.
    Days,
}

impl TimeStep {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "seconds" | "second" | "secs" | "sec" | "s" => Some(Self::Seconds),
            "minutes" | "minute" | "mins" | "min" => Some(Self::Minutes),
            "hours" | "hour" | "hrs" | "hr" | "h" => Some(Self::Hours),
            "days" | "day" | "d" => Some(Self::Days),
            _ => None,
        }
    }

    /// Length of one step in seconds.
    pub fn seconds(self) -> f64 {
        match self {
            Self::Seconds => 1.0,
            Self::Minutes => 60.0,
            Self::Hours => 3_600.0,
            Self::Days => SECONDS_PER_DAY,
        }
    }
}

/// Parsed CF time units bound to a calendar.
///
/// Accepts `"<unit> since YYYY-M-D"`, optionally followed by a time of day
/// (`"HH:MM:SS"`, or joined with `T`) and a trailing time-zone token, which
/// is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeUnits {
    step: TimeStep,
    reference: CalendarDate,
    /// Time of day of the reference, in seconds.
    reference_seconds: f64,
    calendar: CfCalendar,
}

impl TimeUnits {
    /// Parse a CF `units` attribute for a time variable in `calendar`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidUnits`] if the string is not of the
    /// form `"<unit> since <date>[ <time>][ <zone>]"`, or the reference date
    /// is not valid in `calendar`. The time must be `HH:MM[:SS]`; the zone is
    /// `UTC`, `GMT`, `Z` or an offset such as `+05:30`.
    pub fn parse(units: &str, calendar: CfCalendar) -> Result<Self, CalendarError> {
        let invalid = |reason: String| CalendarError::InvalidUnits {
            units: units.to_string(),
            reason,
        };

        let mut parts = units.split_whitespace();
        let step_str = parts
            .next()
            .ok_or_else(|| invalid("empty units string".to_string()))?;
        let step =
            TimeStep::parse(step_str).ok_or_else(|| invalid(format!("unknown unit '{step_str}'")))?;

        match parts.next() {
            Some(word) if word.eq_ignore_ascii_case("since") => {}
            _ => return Err(invalid("expected '<unit> since <date>'".to_string())),
        }

        let date_token = parts
            .next()
            .ok_or_else(|| invalid("missing reference date".to_string()))?;
        let (date_str, joined_time) = match date_token.split_once('T') {
            Some((d, t)) => (d, Some(t)),
            None => (date_token, None),
        };

        let reference = parse_date(date_str, calendar).map_err(invalid)?;

        let mut rest = parts.peekable();
        let time_str = match joined_time {
            Some(t) => Some(t),
            None => rest.next_if(|t| t.contains(':') && !t.starts_with(['+', '-'])),
        };
        let mut reference_seconds = match time_str {
            Some(t) => parse_time_of_day(t).map_err(invalid)?,
            None => 0.0,
        };
        if let Some(zone) = rest.next() {
            let offset = parse_zone(zone).ok_or_else(|| {
                invalid(format!("unexpected '{zone}' after reference date"))
            })?;
            // Reference is local time; shift it to UTC.
            reference_seconds -= offset;
        }
        if let Some(extra) = rest.next() {
            return Err(invalid(format!("unexpected '{extra}' after time zone")));
        }

        Ok(Self {
            step,
            reference,
            reference_seconds,
            calendar,
        })
    }

    /// Returns the step unit.
    pub fn step(&self) -> TimeStep {
        self.step
    }

    /// Returns the reference date.
    pub fn reference(&self) -> CalendarDate {
        self.reference
    }

    /// Returns the calendar offsets are decoded in.
    pub fn calendar(&self) -> CfCalendar {
        self.calendar
    }

    /// Decode one offset into the date it falls on.
    ///
    /// Sub-day remainders are floored, so `14.5 days since 1990-01-01` is
    /// `1990-01-15`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidOffset`] for non-finite or absurdly
    /// large offsets, or [`CalendarError::OutOfRange`] if the date cannot be
    /// represented.
    pub fn decode(&self, offset: f64) -> Result<CalendarDate, CalendarError> {
        if !offset.is_finite() {
            return Err(CalendarError::InvalidOffset {
                offset,
                reason: "offset is not finite".to_string(),
            });
        }
        let days = ((offset * self.step.seconds() + self.reference_seconds) / SECONDS_PER_DAY)
            .floor();
        if days.abs() > MAX_DAY_OFFSET {
            return Err(CalendarError::InvalidOffset {
                offset,
                reason: format!("{days} days exceeds the supported range"),
            });
        }
        self.reference.add_days(days as i64, self.calendar)
    }

    /// Decode a slice of offsets.
    ///
    /// # Errors
    ///
    /// Returns the first decoding error encountered.
    pub fn decode_all(&self, offsets: &[f64]) -> Result<Vec<CalendarDate>, CalendarError> {
        offsets.iter().map(|&o| self.decode(o)).collect()
    }
}

fn parse_date(s: &str, calendar: CfCalendar) -> Result<CalendarDate, String> {
    let fields: Vec<&str> = s.split('-').collect();
    let [y, m, d] = fields.as_slice() else {
        return Err(format!("reference date '{s}' is not YYYY-MM-DD"));
    };
    let year: i32 = y
        .parse()
        .map_err(|e| format!("bad year in '{s}': {e}"))?;
    let month: u8 = m
        .parse()
        .map_err(|e| format!("bad month in '{s}': {e}"))?;
    let day: u8 = d.parse().map_err(|e| format!("bad day in '{s}': {e}"))?;
    CalendarDate::new(year, month, day, calendar).map_err(|e| e.to_string())
}

fn parse_time_of_day(s: &str) -> Result<f64, String> {
    let s = s.trim_end_matches('Z');
    if s.split(':').count() > 3 {
        return Err(format!("time of day '{s}' is not HH:MM[:SS]"));
    }
    let mut seconds = 0.0;
    for (field, scale) in s.split(':').zip([3_600.0, 60.0, 1.0]) {
        let value: f64 = field
            .parse()
            .map_err(|e| format!("bad time of day '{s}': {e}"))?;
        seconds += value * scale;
    }
    Ok(seconds)
}

/// Seconds east of UTC for a zone token, or `None` if it is not one.
fn parse_zone(s: &str) -> Option<f64> {
    if ["utc", "gmt", "z"].iter().any(|z| s.eq_ignore_ascii_case(z)) {
        return Some(0.0);
    }
    let (sign, body) = match s.strip_prefix('+') {
        Some(body) => (1.0, body),
        None => (-1.0, s.strip_prefix('-')?),
    };
    if !body.is_ascii() {
        return None;
    }
    let (h, m) = match body.split_once(':') {
        Some(hm) => hm,
        None if body.len() == 4 => body.split_at(2),
        None => (body, "0"),
    };
    let h: u8 = h.parse().ok()?;
    let m: u8 = m.parse().ok()?;
    if h > 14 || m > 59 {
        return None;
    }
    Some(sign * (f64::from(h) * 3_600.0 + f64::from(m) * 60.0))
}
