use crate::member::TeamMember;
use crate::money;

/// Derives the pool total from the members' eligible amounts.
pub struct PoolSizing<'a> {
    members: &'a [TeamMember],
}

impl<'a> PoolSizing<'a> {
    pub fn new(members: &'a [TeamMember]) -> Self {
        Self { members }
    }

    pub fn total_eligible(&self) -> f64 {
        self.members.iter().map(|m| m.eligible_amount).sum()
    }

    pub fn execute(&self, percentage_of_eligible: f64) -> i64 {
        money::round_units(money::percent_of(
            self.total_eligible(),
            percentage_of_eligible,
        ))
    }
}

pub fn compute_total_amount(members: &[TeamMember], percentage_of_eligible: f64) -> i64 {
    PoolSizing::new(members).execute(percentage_of_eligible)
}
