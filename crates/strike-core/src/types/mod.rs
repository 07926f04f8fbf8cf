//! Domain types for date arithmetic and contract description.
//!
//! - [`Date`]: Calendar date with serial-number arithmetic
//! - [`Tenor`]: Period strings such as `3M` or `1Y`
//! - [`Frequency`]: Payment frequency
//! - [`Compounding`]: Interest compounding convention
//! - [`OptionType`], [`ExerciseType`], [`LongShort`], [`SwapType`]: contract enums

mod date;
mod frequency;
mod option;
mod tenor;

pub use date::{days_in_month, is_leap_year, Date};
pub use frequency::{Compounding, Frequency};
pub use option::{ExerciseType, LongShort, OptionType, ProductType, SwapType};
pub use tenor::{Tenor, TenorUnit};
