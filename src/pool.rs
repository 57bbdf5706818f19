use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationStrategy {
    #[default]
    Equal,
    Proportional,
    Custom,
}

impl AllocationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationStrategy::Equal => "equal",
            AllocationStrategy::Proportional => "proportional",
            AllocationStrategy::Custom => "custom",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AllocationStrategy::Equal => "Split the remaining pool evenly across automatic members",
            AllocationStrategy::Proportional => {
                "Split the remaining pool by each automatic member's eligible amount"
            }
            AllocationStrategy::Custom => {
                "Honour manual overrides and split the rest evenly across everyone else"
            }
        }
    }

    pub fn variants() -> [(&'static str, &'static str); 3] {
        [
            AllocationStrategy::Equal,
            AllocationStrategy::Proportional,
            AllocationStrategy::Custom,
        ]
        .map(|strategy| (strategy.as_str(), strategy.description()))
    }
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllocationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equal" => Ok(AllocationStrategy::Equal),
            "proportional" => Ok(AllocationStrategy::Proportional),
            "custom" => Ok(AllocationStrategy::Custom),
            other => Err(format!("unknown allocation strategy '{other}'")),
        }
    }
}

/// Derived pool record. Every amount here is recomputed by the ledger after
/// each mutation; nothing is set directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusPool {
    pub total_amount: i64,
    pub percentage_of_eligible: f64,
    pub allocation_strategy: AllocationStrategy,
    pub allocated_amount: i64,
    /// Signed. Negative when manual overrides overcommit the pool.
    pub remaining_amount: i64,
}

impl BonusPool {
    pub fn is_overcommitted(&self) -> bool {
        self.remaining_amount < 0
    }
}
