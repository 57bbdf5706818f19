use crate::member::TeamMember;
use crate::money;
use crate::pool::AllocationStrategy;

/// Amount a manual override resolves to, regardless of strategy.
pub fn manual_allocation(eligible_amount: f64, percentage: f64) -> i64 {
    money::floor_units(money::percent_of(eligible_amount, percentage))
}

/// One allocation run over a member slice.
///
/// Members with a manual override are settled first. Whatever the overrides
/// leave of the pool (never less than zero) is split across the remaining
/// members according to the strategy. Every amount is floored, so the
/// automatic group may receive up to `count - 1` units less than what was
/// left; that slack stays unallocated.
///
/// Override percentages are not range-checked, so manual amounts can be
/// negative or huge. Sums over them saturate at the `i64` bounds.
///
/// Results are positional: entry `i` belongs to `members[i]`.
pub struct AllocationPass<'a> {
    members: &'a [TeamMember],
    strategy: AllocationStrategy,
}

impl<'a> AllocationPass<'a> {
    pub fn new(members: &'a [TeamMember], strategy: AllocationStrategy) -> Self {
        Self { members, strategy }
    }

    pub fn execute(&self, total_amount: i64) -> Vec<i64> {
        let (mut allocations, auto_indices, manually_allocated) = self.settle_manual();
        if auto_indices.is_empty() {
            return allocations;
        }

        let remaining = total_amount.saturating_sub(manually_allocated).max(0);
        match self.strategy {
            AllocationStrategy::Proportional => {
                self.split_proportional(remaining, &auto_indices, &mut allocations)
            }
            AllocationStrategy::Equal | AllocationStrategy::Custom => {
                Self::split_equal(remaining, &auto_indices, &mut allocations)
            }
        }
        allocations
    }

    /// Overrides only; every automatic member stays at zero.
    pub fn manual_only(&self) -> Vec<i64> {
        self.settle_manual().0
    }

    fn settle_manual(&self) -> (Vec<i64>, Vec<usize>, i64) {
        let mut allocations = vec![0; self.members.len()];
        let mut auto_indices = Vec::with_capacity(self.members.len());
        let mut manually_allocated = 0i64;
        for (idx, member) in self.members.iter().enumerate() {
            match member.manual_allocation_percentage {
                Some(pct) => {
                    let amount = manual_allocation(member.eligible_amount, pct);
                    allocations[idx] = amount;
                    manually_allocated = manually_allocated.saturating_add(amount);
                }
                None => auto_indices.push(idx),
            }
        }
        (allocations, auto_indices, manually_allocated)
    }

    fn split_equal(remaining: i64, auto_indices: &[usize], allocations: &mut [i64]) {
        let share = remaining / auto_indices.len() as i64;
        for &idx in auto_indices {
            allocations[idx] = share;
        }
    }

    fn split_proportional(&self, remaining: i64, auto_indices: &[usize], allocations: &mut [i64]) {
        let total_eligible: f64 = auto_indices
            .iter()
            .map(|&idx| self.members[idx].eligible_amount)
            .sum();
        // Nobody in the automatic group has an eligible amount to weigh by.
        if total_eligible <= 0.0 || !total_eligible.is_finite() {
            Self::split_equal(remaining, auto_indices, allocations);
            return;
        }
        for &idx in auto_indices {
            let weighted = remaining as f64 * self.members[idx].eligible_amount / total_eligible;
            allocations[idx] = money::floor_units(weighted);
        }
    }
}

/// Returns a copy of `members`, in the same order, with `actual_allocation`
/// filled in from a fresh allocation run.
pub fn allocate(
    members: &[TeamMember],
    total_amount: i64,
    strategy: AllocationStrategy,
) -> Vec<TeamMember> {
    let allocations = AllocationPass::new(members, strategy).execute(total_amount);
    members
        .iter()
        .zip(allocations)
        .map(|(member, actual_allocation)| TeamMember {
            actual_allocation,
            ..member.clone()
        })
        .collect()
}
