use bonus_pool::{
    AllocationStrategy, TeamMember, allocate, calculations::manual_allocation,
    compute_total_amount, reconcile,
};
use proptest::prelude::*;

fn strategy() -> impl Strategy<Value = AllocationStrategy> {
    prop_oneof![
        Just(AllocationStrategy::Equal),
        Just(AllocationStrategy::Proportional),
        Just(AllocationStrategy::Custom),
    ]
}

fn build_team(rows: Vec<(f64, Option<f64>)>) -> Vec<TeamMember> {
    rows.into_iter()
        .enumerate()
        .map(|(idx, (eligible, manual))| {
            let mut member = TeamMember::new(format!("member-{idx}"), "Engineer", eligible);
            member.manual_allocation_percentage = manual;
            member
        })
        .collect()
}

// Whole-unit eligible amounts. Overrides are not range-checked, so they may
// be negative or well above 100.
fn team() -> impl Strategy<Value = Vec<TeamMember>> {
    prop::collection::vec(
        (
            (0u32..200_000).prop_map(f64::from),
            prop::option::of((-1_000i32..=1_000).prop_map(f64::from)),
        ),
        0..12,
    )
    .prop_map(build_team)
}

fn extreme_percentage() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1e6..1e6f64,
        Just(-1e17),
        Just(1e17),
        Just(f64::MAX),
        Just(f64::MIN),
    ]
}

// Amounts large enough that manual allocations hit the `i64` bounds.
fn extreme_team() -> impl Strategy<Value = Vec<TeamMember>> {
    prop::collection::vec(
        (
            prop_oneof![0.0..1e6f64, 1e15..1e18f64, Just(1e18)],
            prop::option::of(extreme_percentage()),
        ),
        0..8,
    )
    .prop_map(build_team)
}

fn auto_remaining(members: &[TeamMember], total: i64) -> i64 {
    let manual = members
        .iter()
        .filter(|m| m.is_manual())
        .fold(0i64, |acc, m| acc.saturating_add(m.actual_allocation));
    total.saturating_sub(manual).max(0)
}

proptest! {
    #[test]
    fn automatic_group_never_exceeds_what_is_left(
        members in team(),
        pct in 1u32..=100,
        strategy in strategy(),
    ) {
        let total = compute_total_amount(&members, pct as f64);
        let allocated = allocate(&members, total, strategy);
        let remaining = auto_remaining(&allocated, total);
        let auto: Vec<&TeamMember> = allocated.iter().filter(|m| !m.is_manual()).collect();
        let auto_sum: i64 = auto.iter().map(|m| m.actual_allocation).sum();

        prop_assert!(auto.iter().all(|m| m.actual_allocation >= 0));
        prop_assert!(auto_sum <= remaining);
        if !auto.is_empty() {
            prop_assert!(remaining - auto_sum < auto.len() as i64);
        }
    }

    #[test]
    fn equal_split_gives_every_automatic_member_the_same_amount(
        members in team(),
        total in 0i64..1_000_000,
    ) {
        let allocated = allocate(&members, total, AllocationStrategy::Equal);
        let mut amounts = allocated.iter().filter(|m| !m.is_manual()).map(|m| m.actual_allocation);
        if let Some(first) = amounts.next() {
            prop_assert!(amounts.all(|a| a == first));
        }
    }

    #[test]
    fn proportional_shares_track_eligible_amounts(
        members in team(),
        total in 0i64..1_000_000,
    ) {
        let allocated = allocate(&members, total, AllocationStrategy::Proportional);
        let remaining = auto_remaining(&allocated, total) as f64;
        let auto: Vec<&TeamMember> = allocated.iter().filter(|m| !m.is_manual()).collect();
        let auto_eligible: f64 = auto.iter().map(|m| m.eligible_amount).sum();
        if auto_eligible > 0.0 {
            for member in auto {
                let exact = remaining * member.eligible_amount / auto_eligible;
                prop_assert!((exact - member.actual_allocation as f64) < 1.0 + 1e-6);
                prop_assert!(member.actual_allocation as f64 <= exact + 1e-6);
            }
        }
    }

    #[test]
    fn manual_overrides_take_precedence(
        members in team(),
        total in -10_000i64..1_000_000,
        strategy in strategy(),
    ) {
        let allocated = allocate(&members, total, strategy);
        for member in allocated.iter().filter(|m| m.is_manual()) {
            let pct = member.manual_allocation_percentage.unwrap_or_default();
            prop_assert_eq!(
                member.actual_allocation,
                manual_allocation(member.eligible_amount, pct)
            );
        }
    }

    #[test]
    fn allocation_keeps_order_and_is_idempotent(
        members in team(),
        total in 0i64..1_000_000,
        strategy in strategy(),
    ) {
        let once = allocate(&members, total, strategy);
        let ids: Vec<_> = members.iter().map(|m| m.id).collect();
        let once_ids: Vec<_> = once.iter().map(|m| m.id).collect();
        prop_assert_eq!(ids, once_ids);

        let twice = allocate(&once, total, strategy);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn reconciliation_balances_against_the_pool(
        members in team(),
        pct in 1u32..=100,
        strategy in strategy(),
    ) {
        let total = compute_total_amount(&members, pct as f64);
        let allocated = allocate(&members, total, strategy);
        let metrics = reconcile(&allocated, total);
        let sum: i64 = allocated.iter().map(|m| m.actual_allocation).sum();
        prop_assert_eq!(metrics.allocated_amount, sum);
        prop_assert_eq!(metrics.remaining_amount, total - sum);
    }

    #[test]
    fn extreme_overrides_stay_within_bounds(
        members in extreme_team(),
        pct in 1u32..=100,
        strategy in strategy(),
    ) {
        let total = compute_total_amount(&members, pct as f64);
        let allocated = allocate(&members, total, strategy);
        prop_assert_eq!(allocated.len(), members.len());

        for member in &allocated {
            match member.manual_allocation_percentage {
                Some(pct) => prop_assert_eq!(
                    member.actual_allocation,
                    manual_allocation(member.eligible_amount, pct)
                ),
                None => prop_assert!(member.actual_allocation >= 0),
            }
        }

        let metrics = reconcile(&allocated, total);
        let sum = allocated
            .iter()
            .fold(0i64, |acc, m| acc.saturating_add(m.actual_allocation));
        prop_assert_eq!(metrics.allocated_amount, sum);
        prop_assert_eq!(metrics.remaining_amount, total.saturating_sub(sum));
    }
}
