//! # Strike Core
//!
//! Date arithmetic and contract vocabulary for the Strike pricing library.
//!
//! Everything downstream is date driven: curves map dates to discount
//! factors, surfaces map expiries to variance, and instruments expand into
//! schedules of accrual periods. This crate provides:
//!
//! - **Types**: [`Date`], [`Tenor`](types::Tenor), [`Frequency`](types::Frequency),
//!   [`Compounding`](types::Compounding) and the option/swap enums
//! - **Calendars**: business day predicates keyed by [`CalendarType`](calendars::CalendarType)
//! - **Day counts**: year fractions keyed by [`DayCountType`](daycounts::DayCountType)
//! - **Schedules**: forward/backward date generation with business day rolling
//! - **Errors**: the [`ErrorKind`](error::ErrorKind) taxonomy shared by every crate
//!
//! ## Example
//!
//! ```rust
//! use strike_core::prelude::*;
//!
//! let start = Date::from_ymd(2019, 1, 1).unwrap();
//! let end = start.add_tenor_str("1Y").unwrap();
//! let yf = DayCountType::ActActIsda.year_frac(start, end, None, None).unwrap();
//! assert!((yf.alpha - 1.0).abs() < 1e-15);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::cast_possible_truncation)]

pub mod calendars;
pub mod daycounts;
pub mod error;
pub mod schedule;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::calendars::{BusinessDayConvention, Calendar, CalendarType, JointCalendar};
    pub use crate::daycounts::{DayCount, DayCountType, YearFraction};
    pub use crate::error::{CoreError, CoreResult, ErrorKind};
    pub use crate::schedule::{DateGenRule, Schedule, StubType};
    pub use crate::types::{
        Compounding, Date, ExerciseType, Frequency, LongShort, OptionType, ProductType, SwapType,
        Tenor, TenorUnit,
    };
}

// Re-export commonly used types at crate root
pub use error::{CoreError, CoreResult, ErrorKind};
pub use types::Date;
