use bonus_pool::{
    AllocationStrategy, BonusLedger, CurrencyFormat, LedgerError, MemberId, MemberUpdate,
    NewMember, PoolSettings, ledger::UNALLOCATED_LABEL,
};

fn sample_ledger() -> (BonusLedger, Vec<MemberId>) {
    let mut ledger = BonusLedger::new();
    let ids = vec![
        ledger
            .add_member(NewMember::new("Alex Johnson", "Senior Developer", 10_000.0))
            .unwrap(),
        ledger
            .add_member(NewMember::new("Jamie Smith", "Product Manager", 12_000.0))
            .unwrap(),
        ledger
            .add_member(NewMember::new("Taylor Brown", "Designer", 8_000.0).with_notes("UI"))
            .unwrap(),
    ];
    (ledger, ids)
}

fn allocations(ledger: &BonusLedger) -> Vec<i64> {
    ledger.members().iter().map(|m| m.actual_allocation).collect()
}

#[test]
fn new_ledger_uses_default_settings_and_empty_pool() {
    let ledger = BonusLedger::new();
    assert!(ledger.members().is_empty());
    assert_eq!(ledger.settings(), &PoolSettings::default());
    let pool = ledger.pool();
    assert_eq!(pool.total_amount, 0);
    assert_eq!(pool.allocated_amount, 0);
    assert_eq!(pool.remaining_amount, 0);
    assert_eq!(pool.percentage_of_eligible, 10.0);
    assert_eq!(pool.allocation_strategy, AllocationStrategy::Equal);
    assert!(ledger.is_engine_engaged());
}

#[test]
fn adding_members_recomputes_pool_immediately() {
    let (ledger, _) = sample_ledger();
    assert_eq!(ledger.pool().total_amount, 3_000);
    assert_eq!(allocations(&ledger), vec![1_000, 1_000, 1_000]);
    assert_eq!(ledger.pool().allocated_amount, 3_000);
    assert_eq!(ledger.pool().remaining_amount, 0);
    assert_eq!(ledger.members()[2].notes.as_deref(), Some("UI"));
}

#[test]
fn add_member_rejects_invalid_input_without_mutating() {
    let (mut ledger, _) = sample_ledger();
    let before = ledger.members().to_vec();

    for candidate in [
        NewMember::new("", "Dev", 1_000.0),
        NewMember::new("Sam", "  ", 1_000.0),
        NewMember::new("Sam", "Dev", 0.0),
        NewMember::new("Sam", "Dev", -5.0),
        NewMember::new("Sam", "Dev", f64::NAN),
    ] {
        let err = ledger.add_member(candidate).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)), "got {err:?}");
        assert!(!err.is_empty_state());
    }
    assert_eq!(ledger.members(), before.as_slice());
    assert_eq!(ledger.pool().total_amount, 3_000);
}

#[test]
fn member_ids_are_unique() {
    let (_, ids) = sample_ledger();
    assert_ne!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);
    assert_ne!(ids[0], ids[2]);
}

#[test]
fn strategy_change_reallocates() {
    let (mut ledger, _) = sample_ledger();
    ledger.set_allocation_strategy(AllocationStrategy::Proportional);
    assert_eq!(allocations(&ledger), vec![1_000, 1_200, 800]);
    assert_eq!(ledger.pool().allocation_strategy, AllocationStrategy::Proportional);
    assert_eq!(ledger.settings().allocation_strategy, AllocationStrategy::Proportional);
}

#[test]
fn percentage_change_resizes_pool() {
    let (mut ledger, _) = sample_ledger();
    ledger.set_percentage_of_eligible(20.0).unwrap();
    assert_eq!(ledger.pool().total_amount, 6_000);
    assert_eq!(allocations(&ledger), vec![2_000, 2_000, 2_000]);
}

#[test]
fn percentage_outside_range_is_rejected() {
    let (mut ledger, _) = sample_ledger();
    for pct in [0.0, 0.5, 100.5, -10.0, f64::INFINITY] {
        let err = ledger.set_percentage_of_eligible(pct).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }
    assert_eq!(ledger.pool().percentage_of_eligible, 10.0);
    assert_eq!(ledger.pool().total_amount, 3_000);
}

#[test]
fn manual_override_overcommits_and_surfaces_negative_remaining() {
    let (mut ledger, ids) = sample_ledger();
    ledger.set_manual_allocation(&ids[0], Some(50.0)).unwrap();

    assert_eq!(allocations(&ledger), vec![5_000, 0, 0]);
    let pool = ledger.pool();
    assert_eq!(pool.total_amount, 3_000);
    assert_eq!(pool.allocated_amount, 5_000);
    assert_eq!(pool.remaining_amount, -2_000);
    assert!(pool.is_overcommitted());

    let summary = ledger.summary();
    assert!(summary.overcommitted);
    assert_eq!(summary.manual_count, 1);
    assert!(summary.slices.iter().all(|s| s.label != UNALLOCATED_LABEL));
}

#[test]
fn extreme_manual_override_keeps_pool_consistent() {
    let (mut ledger, ids) = sample_ledger();
    ledger.set_manual_allocation(&ids[0], Some(-1e17)).unwrap();

    let pool = ledger.pool().clone();
    let allocated = ledger
        .members()
        .iter()
        .fold(0i64, |acc, m| acc.saturating_add(m.actual_allocation));
    assert_eq!(pool.total_amount, 3_000);
    assert_eq!(pool.allocated_amount, allocated);
    assert_eq!(
        pool.remaining_amount,
        pool.total_amount.saturating_sub(pool.allocated_amount)
    );
    assert_eq!(ledger.members()[0].actual_allocation, i64::MIN);

    ledger.set_manual_allocation(&ids[0], None).unwrap();
    assert_eq!(allocations(&ledger), vec![1_000, 1_000, 1_000]);
    assert_eq!(ledger.pool().remaining_amount, 0);
}

#[test]
fn clearing_manual_override_restores_strategy_output() {
    let (mut ledger, ids) = sample_ledger();
    ledger.set_manual_allocation(&ids[1], Some(5.0)).unwrap();
    assert_eq!(allocations(&ledger), vec![1_200, 600, 1_200]);

    ledger.set_manual_allocation(&ids[1], None).unwrap();
    assert_eq!(allocations(&ledger), vec![1_000, 1_000, 1_000]);
}

#[test]
fn update_member_merges_fields() {
    let (mut ledger, ids) = sample_ledger();
    let update = MemberUpdate {
        name: Some("Taylor B.".into()),
        eligible_amount: Some(11_000.0),
        notes: Some(None),
        ..MemberUpdate::default()
    };
    ledger.update_member(&ids[2], update).unwrap();

    let member = ledger.find_member(&ids[2]).unwrap();
    assert_eq!(member.name, "Taylor B.");
    assert_eq!(member.role, "Designer");
    assert_eq!(member.eligible_amount, 11_000.0);
    assert_eq!(member.notes, None);
    assert_eq!(member.id, ids[2]);
    // 33000 * 10% = 3300 split three ways
    assert_eq!(ledger.pool().total_amount, 3_300);
    assert_eq!(allocations(&ledger), vec![1_100, 1_100, 1_100]);
}

#[test]
fn update_member_rejects_invalid_values_and_unknown_ids() {
    let (mut ledger, ids) = sample_ledger();
    let err = ledger
        .update_member(&ids[0], MemberUpdate::name("   "))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    let err = ledger
        .update_member(&ids[0], MemberUpdate::eligible_amount(-1.0))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(ledger.members()[0].name, "Alex Johnson");

    let stranger = MemberId::new();
    let err = ledger
        .update_member(&stranger, MemberUpdate::role("Lead"))
        .unwrap_err();
    assert_eq!(err, LedgerError::MemberNotFound(stranger));
}

#[test]
fn remove_member_recomputes_and_ignores_unknown_ids() {
    let (mut ledger, ids) = sample_ledger();
    assert!(ledger.remove_member(&ids[1]));
    assert_eq!(ledger.members().len(), 2);
    // 18000 * 10% = 1800
    assert_eq!(ledger.pool().total_amount, 1_800);
    assert_eq!(allocations(&ledger), vec![900, 900]);

    assert!(!ledger.remove_member(&ids[1]));
    assert!(!ledger.remove_member(&MemberId::new()));
    assert_eq!(ledger.members().len(), 2);
}

#[test]
fn replace_all_members_is_atomic() {
    let (mut ledger, ids) = sample_ledger();

    let err = ledger.replace_all_members(Vec::new()).unwrap_err();
    assert_eq!(err, LedgerError::NoValidRecords);
    assert!(err.is_empty_state());

    let err = ledger
        .replace_all_members(vec![
            NewMember::new("Valid", "Dev", 1_000.0),
            NewMember::new("", "Dev", 1_000.0),
        ])
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(ledger.members().len(), 3);
    assert_eq!(ledger.members()[0].id, ids[0]);

    ledger
        .replace_all_members(vec![
            NewMember::new("Robin", "QA", 5_000.0),
            NewMember::new("Casey", "Support", 0.0),
        ])
        .unwrap();
    assert_eq!(ledger.members().len(), 2);
    assert!(ledger.find_member(&ids[0]).is_none());
    assert_eq!(ledger.pool().total_amount, 500);
    assert_eq!(allocations(&ledger), vec![250, 250]);
}

#[test]
fn append_members_keeps_existing_roster() {
    let (mut ledger, ids) = sample_ledger();
    let new_ids = ledger
        .append_members(vec![NewMember::new("Robin", "QA", 10_000.0)])
        .unwrap();
    assert_eq!(new_ids.len(), 1);
    assert_eq!(ledger.members().len(), 4);
    assert_eq!(ledger.members()[0].id, ids[0]);
    assert_eq!(ledger.members()[3].id, new_ids[0]);
    assert_eq!(ledger.pool().total_amount, 4_000);
    assert_eq!(allocations(&ledger), vec![1_000, 1_000, 1_000, 1_000]);
}

#[test]
fn reset_clears_overrides_and_keeps_allocations_at_zero() {
    let (mut ledger, ids) = sample_ledger();
    ledger.set_manual_allocation(&ids[0], Some(20.0)).unwrap();
    ledger.reset_allocations();

    assert!(!ledger.is_engine_engaged());
    assert!(ledger.members().iter().all(|m| !m.is_manual()));
    assert_eq!(allocations(&ledger), vec![0, 0, 0]);
    assert_eq!(ledger.pool().allocated_amount, 0);
    assert_eq!(ledger.pool().remaining_amount, 3_000);

    // Later mutations resize the pool but leave automatic members at zero.
    ledger.set_allocation_strategy(AllocationStrategy::Proportional);
    ledger
        .add_member(NewMember::new("Robin", "QA", 10_000.0))
        .unwrap();
    assert_eq!(ledger.pool().total_amount, 4_000);
    assert_eq!(allocations(&ledger), vec![0, 0, 0, 0]);

    // Overrides still apply while the engine is disengaged.
    ledger.set_manual_allocation(&ids[1], Some(10.0)).unwrap();
    assert_eq!(allocations(&ledger), vec![0, 1_200, 0, 0]);

    let summary = ledger.run_auto_allocate().unwrap();
    assert!(ledger.is_engine_engaged());
    // 4000 - 1200 = 2800 over 28000 eligible
    assert_eq!(allocations(&ledger), vec![1_000, 1_200, 800, 1_000]);
    assert_eq!(summary.allocated_amount, 4_000);
    assert_eq!(summary.remaining_amount, 0);
}

#[test]
fn auto_allocate_on_empty_ledger_reports_no_members() {
    let mut ledger = BonusLedger::new();
    let err = ledger.run_auto_allocate().unwrap_err();
    assert_eq!(err, LedgerError::NoMembers);
    assert!(err.is_empty_state());
    assert!(ledger.members().is_empty());
}

#[test]
fn summary_lists_largest_slices_first_with_unallocated_remainder() {
    let (mut ledger, _) = sample_ledger();
    ledger.set_allocation_strategy(AllocationStrategy::Proportional);
    ledger.set_percentage_of_eligible(7.0).unwrap();
    // 30000 * 7% = 2100 -> 700, 840, 560
    let summary = ledger.summary();
    let labels: Vec<&str> = summary.slices.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["Jamie Smith", "Alex Johnson", "Taylor Brown"]);
    assert_eq!(summary.remaining_amount, 0);

    ledger.set_allocation_strategy(AllocationStrategy::Equal);
    ledger.set_percentage_of_eligible(1.0).unwrap();
    // 300 split three ways leaves nothing; 301 would not.
    let first = ledger.members()[0].id;
    ledger
        .update_member(&first, MemberUpdate::eligible_amount(10_100.0))
        .unwrap();
    let summary = ledger.summary();
    assert_eq!(summary.total_amount, 301);
    assert_eq!(summary.remaining_amount, 1);
    let last = summary.slices.last().unwrap();
    assert_eq!(last.label, UNALLOCATED_LABEL);
    assert_eq!(last.amount, 1);
    assert!(summary.to_cli_summary().contains("remaining=1"));
}

#[test]
fn with_settings_validates_configuration() {
    let settings = PoolSettings {
        percentage_of_eligible: 150.0,
        ..PoolSettings::default()
    };
    assert!(matches!(
        BonusLedger::with_settings(settings),
        Err(LedgerError::Validation(_))
    ));

    let settings = PoolSettings {
        percentage_of_eligible: 25.0,
        allocation_strategy: AllocationStrategy::Custom,
        currency: CurrencyFormat::Usd,
    };
    let ledger = BonusLedger::with_settings(settings.clone()).unwrap();
    assert_eq!(ledger.settings(), &settings);
    assert_eq!(ledger.pool().allocation_strategy, AllocationStrategy::Custom);
}
