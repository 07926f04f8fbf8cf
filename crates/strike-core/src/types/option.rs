//! Contract enumerations shared by instruments and kernels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionType {
    /// Right to buy.
    Call,
    /// Right to sell.
    Put,
}

impl OptionType {
    /// Payoff sign φ: +1 for a call, −1 for a put.
    #[must_use]
    pub fn phi(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// The opposite option type.
    #[must_use]
    pub fn flip(&self) -> Self {
        match self {
            OptionType::Call => OptionType::Put,
            OptionType::Put => OptionType::Call,
        }
    }

    /// Undiscounted payoff at the given underlying level.
    #[must_use]
    pub fn payoff(&self, underlying: f64, strike: f64) -> f64 {
        (self.phi() * (underlying - strike)).max(0.0)
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "CALL"),
            OptionType::Put => write!(f, "PUT"),
        }
    }
}

/// Exercise style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExerciseType {
    /// Exercise at expiry only.
    #[default]
    European,
    /// Exercise at any time up to expiry.
    American,
    /// Exercise on a discrete set of dates.
    Bermudan,
}

/// Position direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LongShort {
    /// Long position.
    #[default]
    Long,
    /// Short position.
    Short,
}

impl LongShort {
    /// +1 for long, −1 for short.
    #[must_use]
    pub fn sign(&self) -> f64 {
        match self {
            LongShort::Long => 1.0,
            LongShort::Short => -1.0,
        }
    }
}

/// Direction of the fixed leg of a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapType {
    /// Pay fixed, receive floating.
    Pay,
    /// Receive fixed, pay floating.
    Receive,
}

impl SwapType {
    /// Sign applied to (floating − fixed) leg value: +1 payer, −1 receiver.
    #[must_use]
    pub fn sign(&self) -> f64 {
        match self {
            SwapType::Pay => 1.0,
            SwapType::Receive => -1.0,
        }
    }

    /// The swaption option type equivalent to this swap direction.
    #[must_use]
    pub fn as_option_type(&self) -> OptionType {
        match self {
            SwapType::Pay => OptionType::Call,
            SwapType::Receive => OptionType::Put,
        }
    }
}

/// Product families accepted at the instrument boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    /// European call.
    EuropeanCall,
    /// European put.
    EuropeanPut,
    /// American call.
    AmericanCall,
    /// American put.
    AmericanPut,
    /// Cash-or-nothing digital call.
    DigitalCall,
    /// Cash-or-nothing digital put.
    DigitalPut,
    /// Snowball knocking out on the upside.
    SnowballCall,
    /// Snowball knocking out on the downside.
    SnowballPut,
}

impl ProductType {
    /// Underlying call/put direction.
    #[must_use]
    pub fn option_type(&self) -> OptionType {
        match self {
            ProductType::EuropeanCall
            | ProductType::AmericanCall
            | ProductType::DigitalCall
            | ProductType::SnowballCall => OptionType::Call,
            _ => OptionType::Put,
        }
    }

    /// Exercise style of the product.
    #[must_use]
    pub fn exercise(&self) -> ExerciseType {
        match self {
            ProductType::AmericanCall | ProductType::AmericanPut => ExerciseType::American,
            _ => ExerciseType::European,
        }
    }
}
