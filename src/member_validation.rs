use crate::member::{NewMember, TeamMember};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

fn validate_identity(name: &str, role: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("member name must not be empty"));
    }
    if role.trim().is_empty() {
        return Err(ValidationError::new(format!(
            "member '{}' requires a non-empty role",
            name.trim()
        )));
    }
    Ok(())
}

fn validate_eligible_amount(name: &str, amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ValidationError::new(format!(
            "member '{}' has invalid eligible amount {} (must be a non-negative number)",
            name.trim(),
            amount
        )));
    }
    Ok(())
}

fn validate_override(name: &str, percentage: Option<f64>) -> Result<(), ValidationError> {
    if let Some(pct) = percentage {
        if !pct.is_finite() {
            return Err(ValidationError::new(format!(
                "member '{}' has non-finite manual allocation percentage",
                name.trim()
            )));
        }
    }
    Ok(())
}

/// Rules for a member arriving through bulk ingestion: a zero eligible amount
/// is accepted here.
pub fn validate_candidate(candidate: &NewMember) -> Result<(), ValidationError> {
    validate_identity(&candidate.name, &candidate.role)?;
    validate_eligible_amount(&candidate.name, candidate.eligible_amount)
}

/// Stricter rules for a single interactive add: the eligible amount must be
/// positive.
pub fn validate_new_member(candidate: &NewMember) -> Result<(), ValidationError> {
    validate_candidate(candidate)?;
    if candidate.eligible_amount <= 0.0 {
        return Err(ValidationError::new(format!(
            "member '{}' requires a positive eligible amount (got {})",
            candidate.name.trim(),
            candidate.eligible_amount
        )));
    }
    Ok(())
}

pub fn validate_member(member: &TeamMember) -> Result<(), ValidationError> {
    validate_identity(&member.name, &member.role)?;
    validate_eligible_amount(&member.name, member.eligible_amount)?;
    validate_override(&member.name, member.manual_allocation_percentage)
}

pub fn validate_candidates(candidates: &[NewMember]) -> Result<(), ValidationError> {
    for (idx, candidate) in candidates.iter().enumerate() {
        validate_candidate(candidate)
            .map_err(|err| ValidationError::new(format!("record #{}: {err}", idx + 1)))?;
    }
    Ok(())
}
