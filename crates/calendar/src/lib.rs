//! # decadal-calendar
//!
//! Calendar arithmetic for CF-convention climate model output: decoding
//! `"<unit> since <date>"` time offsets under the CF calendars, month-level
//! arithmetic, and lead-year positions relative to a forecast start.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["units + calendar attrs"] -->|"TimeUnits::parse()"| B["TimeUnits"]
//!     B -->|".decode(offset)"| C["CalendarDate"]
//!     C -->|".year_month()"| D["YearMonth"]
//!     D -->|"lead_position(init, at)"| E["LeadPosition"]
//!     E -->|"calendar_month()"| F["calendar month (1..=12)"]
//!     D -->|"monthly_sequence()"| G["Vec of YearMonth"]
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use decadal_calendar::{CfCalendar, TimeUnits, YearMonth, lead_position};
//!
//! let units = TimeUnits::parse("days since 1850-01-01", CfCalendar::NoLeap)?;
//! let date = units.decode(51_114.5)?; // 1990-01-15
//!
//! let init = YearMonth::new(1990, 11)?;
//! let pos = lead_position(init, YearMonth::new(1992, 2)?)?;
//! assert_eq!((pos.lead_year(), pos.lead_month()), (2, 3));
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `calendar` | CF calendar kinds and month lengths |
//! | `date` | Calendar-aware dates and day numbers |
//! | `units` | CF time-unit parsing and offset decoding |
//! | `year_month` | Month-resolution timestamps |
//! | `sequence` | Contiguous monthly sequences |
//! | `lead` | Lead year / lead month derivation |
//! | `error` | Error types |

mod calendar;
mod date;
mod error;
mod lead;
mod sequence;
mod units;
mod year_month;

pub use calendar::CfCalendar;
pub use date::CalendarDate;
pub use error::CalendarError;
pub use lead::{LeadPosition, calendar_month, lead_position};
pub use sequence::monthly_sequence;
pub use units::{TimeStep, TimeUnits};
pub use year_month::YearMonth;
