use crate::currency::CurrencyFormat;
use crate::pool::AllocationStrategy;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

pub const MIN_PERCENTAGE_OF_ELIGIBLE: f64 = 1.0;
pub const MAX_PERCENTAGE_OF_ELIGIBLE: f64 = 100.0;

/// User-configured pool settings. The pool total is always derived from
/// `percentage_of_eligible`; there is no fixed-amount mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSettings {
    pub percentage_of_eligible: f64,
    #[serde(default)]
    pub allocation_strategy: AllocationStrategy,
    #[serde(default)]
    pub currency: CurrencyFormat,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            percentage_of_eligible: 10.0,
            allocation_strategy: AllocationStrategy::Equal,
            currency: CurrencyFormat::Inr,
        }
    }
}

impl PoolSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_percentage_of_eligible(self.percentage_of_eligible)
    }
}

pub fn validate_percentage_of_eligible(percentage: f64) -> Result<(), SettingsError> {
    if !percentage.is_finite()
        || !(MIN_PERCENTAGE_OF_ELIGIBLE..=MAX_PERCENTAGE_OF_ELIGIBLE).contains(&percentage)
    {
        return Err(SettingsError::PercentageOutOfRange(percentage));
    }
    Ok(())
}

#[derive(Debug)]
pub enum SettingsError {
    PercentageOutOfRange(f64),
    Serialization(SerdeJsonError),
    Io(io::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::PercentageOutOfRange(pct) => write!(
                f,
                "percentage of eligible must be between {MIN_PERCENTAGE_OF_ELIGIBLE} and {MAX_PERCENTAGE_OF_ELIGIBLE} (got {pct})"
            ),
            SettingsError::Serialization(err) => write!(f, "settings serialization error: {err}"),
            SettingsError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<SerdeJsonError> for SettingsError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for SettingsError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

pub fn load_settings_from_json<P: AsRef<Path>>(path: P) -> Result<PoolSettings, SettingsError> {
    let file = File::open(path)?;
    let settings: PoolSettings = serde_json::from_reader(file)?;
    settings.validate()?;
    Ok(settings)
}

pub fn save_settings_to_json<P: AsRef<Path>>(
    settings: &PoolSettings,
    path: P,
) -> Result<(), SettingsError> {
    settings.validate()?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, settings)?;
    Ok(())
}
