use crate::calculations::{AllocationPass, PoolSizing, reconcile};
use crate::member::{MemberId, MemberUpdate, NewMember, TeamMember};
use crate::member_validation::{self, ValidationError};
use crate::pool::{AllocationStrategy, BonusPool};
use crate::settings::{self, PoolSettings, SettingsError};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

pub const UNALLOCATED_LABEL: &str = "Unallocated";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSlice {
    pub label: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub strategy: AllocationStrategy,
    pub member_count: usize,
    pub manual_count: usize,
    pub total_amount: i64,
    pub allocated_amount: i64,
    pub remaining_amount: i64,
    pub overcommitted: bool,
    /// One slice per member plus an unallocated slice when money is left,
    /// largest first.
    pub slices: Vec<AllocationSlice>,
}

impl AllocationSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("strategy={}", self.strategy));
        parts.push(format!("members={}", self.member_count));
        if self.manual_count > 0 {
            parts.push(format!("manual={}", self.manual_count));
        }
        parts.push(format!("total={}", self.total_amount));
        parts.push(format!("allocated={}", self.allocated_amount));
        parts.push(format!("remaining={}", self.remaining_amount));
        if self.overcommitted {
            parts.push("overcommitted".to_string());
        }
        parts.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    Validation(String),
    NoMembers,
    NoValidRecords,
    MemberNotFound(MemberId),
}

impl LedgerError {
    /// True for the "nothing to do" class, as opposed to bad input.
    pub fn is_empty_state(&self) -> bool {
        matches!(self, LedgerError::NoMembers | LedgerError::NoValidRecords)
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Validation(msg) => write!(f, "invalid input: {msg}"),
            LedgerError::NoMembers => write!(f, "there are no team members to allocate bonuses to"),
            LedgerError::NoValidRecords => write!(f, "no valid team member records were supplied"),
            LedgerError::MemberNotFound(id) => write!(f, "team member {id} not found"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<ValidationError> for LedgerError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<SettingsError> for LedgerError {
    fn from(value: SettingsError) -> Self {
        Self::Validation(value.to_string())
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Owns the member list and the derived pool record. Every mutation validates
/// first, applies, and then re-runs pool sizing, allocation and
/// reconciliation before returning, so callers never observe stale totals.
#[derive(Debug, Clone)]
pub struct BonusLedger {
    members: Vec<TeamMember>,
    settings: PoolSettings,
    pool: BonusPool,
    engine_engaged: bool,
}

impl Default for BonusLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl BonusLedger {
    pub fn new() -> Self {
        Self::from_parts(PoolSettings::default(), Vec::new())
    }

    pub fn with_settings(settings: PoolSettings) -> LedgerResult<Self> {
        settings.validate()?;
        Ok(Self::from_parts(settings, Vec::new()))
    }

    fn from_parts(settings: PoolSettings, members: Vec<TeamMember>) -> Self {
        let mut ledger = Self {
            members,
            pool: BonusPool {
                total_amount: 0,
                percentage_of_eligible: settings.percentage_of_eligible,
                allocation_strategy: settings.allocation_strategy,
                allocated_amount: 0,
                remaining_amount: 0,
            },
            settings,
            engine_engaged: true,
        };
        ledger.recompute();
        ledger
    }

    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    pub fn find_member(&self, id: &MemberId) -> Option<&TeamMember> {
        self.members.iter().find(|m| &m.id == id)
    }

    pub fn pool(&self) -> &BonusPool {
        &self.pool
    }

    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    /// False between `reset_allocations` and the next `run_auto_allocate`.
    pub fn is_engine_engaged(&self) -> bool {
        self.engine_engaged
    }

    pub fn add_member(&mut self, candidate: NewMember) -> LedgerResult<MemberId> {
        member_validation::validate_new_member(&candidate)?;
        let member = candidate.into_member();
        let id = member.id;
        info!(member = %id, name = %member.name, eligible = member.eligible_amount, "team member added");
        self.members.push(member);
        self.recompute();
        Ok(id)
    }

    pub fn update_member(&mut self, id: &MemberId, update: MemberUpdate) -> LedgerResult<()> {
        let idx = self
            .members
            .iter()
            .position(|m| &m.id == id)
            .ok_or(LedgerError::MemberNotFound(*id))?;
        let mut updated = self.members[idx].clone();
        updated.apply_update(update);
        member_validation::validate_member(&updated)?;
        debug!(member = %id, "team member updated");
        self.members[idx] = updated;
        self.recompute();
        Ok(())
    }

    pub fn set_manual_allocation(
        &mut self,
        id: &MemberId,
        percentage: Option<f64>,
    ) -> LedgerResult<()> {
        self.update_member(id, MemberUpdate::manual_allocation(percentage))
    }

    pub fn remove_member(&mut self, id: &MemberId) -> bool {
        let Some(idx) = self.members.iter().position(|m| &m.id == id) else {
            return false;
        };
        let removed = self.members.remove(idx);
        info!(member = %id, name = %removed.name, "team member removed");
        self.recompute();
        true
    }

    pub fn replace_all_members(&mut self, candidates: Vec<NewMember>) -> LedgerResult<()> {
        let incoming = Self::admit(candidates)?;
        info!(count = incoming.len(), "replacing all team members");
        self.members = incoming;
        self.recompute();
        Ok(())
    }

    pub fn append_members(&mut self, candidates: Vec<NewMember>) -> LedgerResult<Vec<MemberId>> {
        let incoming = Self::admit(candidates)?;
        let ids = incoming.iter().map(|m| m.id).collect();
        info!(count = incoming.len(), "appending team members");
        self.members.extend(incoming);
        self.recompute();
        Ok(ids)
    }

    fn admit(candidates: Vec<NewMember>) -> LedgerResult<Vec<TeamMember>> {
        if candidates.is_empty() {
            return Err(LedgerError::NoValidRecords);
        }
        member_validation::validate_candidates(&candidates)?;
        Ok(candidates.into_iter().map(NewMember::into_member).collect())
    }

    pub fn set_allocation_strategy(&mut self, strategy: AllocationStrategy) {
        self.settings.allocation_strategy = strategy;
        self.recompute();
    }

    pub fn set_percentage_of_eligible(&mut self, percentage: f64) -> LedgerResult<()> {
        settings::validate_percentage_of_eligible(percentage)?;
        self.settings.percentage_of_eligible = percentage;
        self.recompute();
        Ok(())
    }

    pub fn apply_settings(&mut self, settings: PoolSettings) -> LedgerResult<()> {
        settings.validate()?;
        self.settings = settings;
        self.recompute();
        Ok(())
    }

    /// Clears every override and zeroes every allocation. The strategy
    /// engine stays disengaged until `run_auto_allocate` is called.
    pub fn reset_allocations(&mut self) {
        for member in &mut self.members {
            member.manual_allocation_percentage = None;
            member.actual_allocation = 0;
        }
        self.engine_engaged = false;
        info!(count = self.members.len(), "allocations reset");
        self.recompute();
    }

    pub fn run_auto_allocate(&mut self) -> LedgerResult<AllocationSummary> {
        if self.members.is_empty() {
            return Err(LedgerError::NoMembers);
        }
        self.engine_engaged = true;
        self.recompute();
        info!(
            strategy = %self.settings.allocation_strategy,
            allocated = self.pool.allocated_amount,
            "bonuses auto-allocated"
        );
        Ok(self.summary())
    }

    pub fn summary(&self) -> AllocationSummary {
        let mut slices: Vec<AllocationSlice> = self
            .members
            .iter()
            .map(|m| AllocationSlice {
                label: m.name.clone(),
                amount: m.actual_allocation,
            })
            .collect();
        if self.pool.remaining_amount > 0 {
            slices.push(AllocationSlice {
                label: UNALLOCATED_LABEL.to_string(),
                amount: self.pool.remaining_amount,
            });
        }
        slices.sort_by(|a, b| b.amount.cmp(&a.amount));

        AllocationSummary {
            strategy: self.settings.allocation_strategy,
            member_count: self.members.len(),
            manual_count: self.members.iter().filter(|m| m.is_manual()).count(),
            total_amount: self.pool.total_amount,
            allocated_amount: self.pool.allocated_amount,
            remaining_amount: self.pool.remaining_amount,
            overcommitted: self.pool.is_overcommitted(),
            slices,
        }
    }

    fn recompute(&mut self) {
        let total_amount =
            PoolSizing::new(&self.members).execute(self.settings.percentage_of_eligible);

        let pass = AllocationPass::new(&self.members, self.settings.allocation_strategy);
        let allocations = if self.engine_engaged {
            pass.execute(total_amount)
        } else {
            pass.manual_only()
        };
        for (member, amount) in self.members.iter_mut().zip(allocations) {
            member.actual_allocation = amount;
        }

        let metrics = reconcile(&self.members, total_amount);
        self.pool = BonusPool {
            total_amount,
            percentage_of_eligible: self.settings.percentage_of_eligible,
            allocation_strategy: self.settings.allocation_strategy,
            allocated_amount: metrics.allocated_amount,
            remaining_amount: metrics.remaining_amount,
        };

        debug!(
            strategy = %self.pool.allocation_strategy,
            total = self.pool.total_amount,
            allocated = self.pool.allocated_amount,
            remaining = self.pool.remaining_amount,
            engaged = self.engine_engaged,
            "pool recomputed"
        );
        if self.pool.is_overcommitted() {
            warn!(
                remaining = self.pool.remaining_amount,
                "manual overrides overcommit the bonus pool"
            );
        }
    }
}
