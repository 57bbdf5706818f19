use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque member identifier, assigned once when the member joins the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(Uuid);

impl MemberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MemberId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: MemberId,
    pub name: String,
    pub role: String,
    /// Base for proportional and percentage computations. Never negative.
    pub eligible_amount: f64,
    /// When set, replaces the strategy output for this member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_allocation_percentage: Option<f64>,
    /// Output of the most recent allocation run.
    #[serde(default)]
    pub actual_allocation: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TeamMember {
    pub fn new(name: impl Into<String>, role: impl Into<String>, eligible_amount: f64) -> Self {
        Self {
            id: MemberId::new(),
            name: name.into(),
            role: role.into(),
            eligible_amount,
            manual_allocation_percentage: None,
            actual_allocation: 0,
            notes: None,
        }
    }

    pub fn is_manual(&self) -> bool {
        self.manual_allocation_percentage.is_some()
    }

    pub(crate) fn apply_update(&mut self, update: MemberUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(eligible_amount) = update.eligible_amount {
            self.eligible_amount = eligible_amount;
        }
        if let Some(manual) = update.manual_allocation_percentage {
            self.manual_allocation_percentage = manual;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
    }
}

/// A member that has not been admitted to the ledger yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMember {
    pub name: String,
    pub role: String,
    pub eligible_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewMember {
    pub fn new(name: impl Into<String>, role: impl Into<String>, eligible_amount: f64) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            eligible_amount,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub(crate) fn into_member(self) -> TeamMember {
        let mut member = TeamMember::new(self.name, self.role, self.eligible_amount);
        member.notes = self.notes;
        member
    }
}

/// Partial member update. `None` leaves a field as it is; the nested options
/// on the optional fields distinguish "leave" from "clear".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub eligible_amount: Option<f64>,
    #[serde(
        default,
        with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub manual_allocation_percentage: Option<Option<f64>>,
    #[serde(
        default,
        with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

impl MemberUpdate {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            ..Self::default()
        }
    }

    pub fn eligible_amount(amount: f64) -> Self {
        Self {
            eligible_amount: Some(amount),
            ..Self::default()
        }
    }

    pub fn manual_allocation(percentage: Option<f64>) -> Self {
        Self {
            manual_allocation_percentage: Some(percentage),
            ..Self::default()
        }
    }

    pub fn notes(notes: Option<String>) -> Self {
        Self {
            notes: Some(notes),
            ..Self::default()
        }
    }
}

// A JSON `null` means "clear the field", an absent key means "leave it".
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
