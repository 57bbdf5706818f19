use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display formatting for whole currency units. Internal arithmetic never
/// goes through here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyFormat {
    #[default]
    Inr,
    Usd,
}

impl CurrencyFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyFormat::Inr => "inr",
            CurrencyFormat::Usd => "usd",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CurrencyFormat::Inr => "₹",
            CurrencyFormat::Usd => "$",
        }
    }

    pub fn format(&self, amount: i64) -> String {
        let digits = amount.unsigned_abs().to_string();
        let grouped = match self {
            CurrencyFormat::Inr => group_indian(&digits),
            CurrencyFormat::Usd => group_thousands(&digits),
        };
        let sign = if amount < 0 { "-" } else { "" };
        format!("{sign}{}{grouped}", self.symbol())
    }
}

impl fmt::Display for CurrencyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inr" => Ok(CurrencyFormat::Inr),
            "usd" => Ok(CurrencyFormat::Usd),
            other => Err(format!("unknown currency '{other}'")),
        }
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// Last three digits form one group, everything before it is grouped in pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    for (idx, ch) in head.chars().enumerate() {
        if idx > 0 && (head.len() - idx) % 2 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push(',');
    out.push_str(tail);
    out
}
