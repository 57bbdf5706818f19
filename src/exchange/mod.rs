use crate::ledger::LedgerError;
use std::fmt;
use std::io;
use std::str::FromStr;

#[derive(Debug)]
pub enum ExchangeError {
    Io(io::Error),
    Csv(csv::Error),
    MissingHeaders(Vec<String>),
    NoValidRecords,
    Ledger(LedgerError),
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeError::Io(err) => write!(f, "io error: {err}"),
            ExchangeError::Csv(err) => write!(f, "csv error: {err}"),
            ExchangeError::MissingHeaders(headers) => {
                write!(f, "missing required headers: {}", headers.join(", "))
            }
            ExchangeError::NoValidRecords => {
                write!(f, "no valid team member data found in the CSV file")
            }
            ExchangeError::Ledger(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ExchangeError {}

impl From<io::Error> for ExchangeError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for ExchangeError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<LedgerError> for ExchangeError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::NoValidRecords => Self::NoValidRecords,
            other => Self::Ledger(other),
        }
    }
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// Whether an import substitutes the roster or extends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    #[default]
    Replace,
    Append,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Replace => "replace",
            ImportMode::Append => "append",
        }
    }
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(ImportMode::Replace),
            "append" => Ok(ImportMode::Append),
            other => Err(format!("unknown import mode '{other}'")),
        }
    }
}

pub mod file;

pub use file::{
    ImportOutcome, ImportReport, apply_import, export_members_to_csv, import_members_from_csv,
    parse_amount, parse_members_csv, screen_members, write_members_csv,
};
