//! CLI command implementations.

pub mod bootstrap;
pub mod implied_vol;
pub mod surface;
pub mod vanilla;

pub use bootstrap::BootstrapArgs;
pub use implied_vol::ImpliedVolArgs;
pub use surface::SurfaceArgs;
pub use vanilla::VanillaArgs;

use std::path::Path;

use clap::ValueEnum;
use serde::de::DeserializeOwned;

use strike_core::types::OptionType;
use strike_core::Date;

use crate::error::{CliError, CliResult};

/// Option side on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Side {
    /// Call option
    #[default]
    Call,
    /// Put option
    Put,
}

impl From<Side> for OptionType {
    fn from(side: Side) -> Self {
        match side {
            Side::Call => OptionType::Call,
            Side::Put => OptionType::Put,
        }
    }
}

/// Parses a date string in YYYY-MM-DD format.
pub fn parse_date(s: &str) -> CliResult<Date> {
    Date::parse(s).map_err(|_| CliError::InvalidDate(s.to_string()))
}

/// Reads and deserializes a TOML input file.
pub fn read_toml<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| CliError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
