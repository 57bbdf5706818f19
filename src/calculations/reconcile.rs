use crate::member::TeamMember;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolMetrics {
    pub allocated_amount: i64,
    /// Signed on purpose; a negative value is an overcommitted pool.
    pub remaining_amount: i64,
}

pub fn reconcile(members: &[TeamMember], total_amount: i64) -> PoolMetrics {
    let allocated_amount = members
        .iter()
        .fold(0i64, |acc, m| acc.saturating_add(m.actual_allocation));
    PoolMetrics {
        allocated_amount,
        remaining_amount: total_amount.saturating_sub(allocated_amount),
    }
}
