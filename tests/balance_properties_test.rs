use billsplit::domain::balance::{compute_group_net, compute_pairwise_balances};
use billsplit::domain::money::Money;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

mod common;

const MEMBERS: [&str; 5] = ["ana", "ben", "cho", "dev", "eli"];

#[test]
fn test_order_independence() {
    let mut rng = StdRng::seed_from_u64(7);
    let roster = common::roster(&MEMBERS);
    let mut expenses = common::random_expenses(&mut rng, &MEMBERS, 60);
    let baseline = compute_pairwise_balances(&"ana".into(), &roster, &expenses).unwrap();

    for _ in 0..10 {
        expenses.shuffle(&mut rng);
        let shuffled = compute_pairwise_balances(&"ana".into(), &roster, &expenses).unwrap();
        assert_eq!(shuffled, baseline);
    }
}

#[test]
fn test_recomputation_is_byte_identical() {
    let mut rng = StdRng::seed_from_u64(11);
    let roster = common::roster(&MEMBERS);
    let expenses = common::random_expenses(&mut rng, &MEMBERS, 40);

    let first = compute_pairwise_balances(&"cho".into(), &roster, &expenses).unwrap();
    let second = compute_pairwise_balances(&"cho".into(), &roster, &expenses).unwrap();
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[test]
fn test_all_pairs_ledger_conserves_money() {
    let mut rng = StdRng::seed_from_u64(23);
    let roster = common::roster(&MEMBERS);
    let expenses = common::random_expenses(&mut rng, &MEMBERS, 80);

    let mut debits = Money::ZERO;
    let mut credits = Money::ZERO;
    for viewer in MEMBERS {
        let report = compute_pairwise_balances(&viewer.into(), &roster, &expenses).unwrap();
        debits += report.summary.total_you_owe;
        credits += report.summary.total_owes_you;
    }
    assert_eq!(debits, credits);
}

#[test]
fn test_pairwise_views_mirror_each_other() {
    let mut rng = StdRng::seed_from_u64(31);
    let roster = common::roster(&MEMBERS);
    let expenses = common::random_expenses(&mut rng, &MEMBERS, 30);

    let ana = compute_pairwise_balances(&"ana".into(), &roster, &expenses).unwrap();
    let ben = compute_pairwise_balances(&"ben".into(), &roster, &expenses).unwrap();

    let ana_on_ben = ana
        .members
        .iter()
        .find(|m| m.user_id.as_str() == "ben")
        .map(|m| m.net)
        .unwrap_or(Money::ZERO);
    let ben_on_ana = ben
        .members
        .iter()
        .find(|m| m.user_id.as_str() == "ana")
        .map(|m| m.net)
        .unwrap_or(Money::ZERO);
    assert_eq!(ana_on_ben, -ben_on_ana);
}

#[test]
fn test_summary_self_consistency() {
    let mut rng = StdRng::seed_from_u64(43);
    let roster = common::roster(&MEMBERS);
    let expenses = common::random_expenses(&mut rng, &MEMBERS, 50);

    for viewer in MEMBERS {
        let report = compute_pairwise_balances(&viewer.into(), &roster, &expenses).unwrap();
        let summary = &report.summary;
        assert_eq!(
            summary.net_balance,
            summary.total_owes_you - summary.total_you_owe
        );
        for member in &report.members {
            assert!(member.net.is_material());
            assert!(member.you_owe == Money::ZERO || member.owes_you == Money::ZERO);
        }
    }
}

#[test]
fn test_group_net_is_zero_sum() {
    let mut rng = StdRng::seed_from_u64(59);
    let roster = common::roster(&MEMBERS);
    let expenses = common::random_expenses(&mut rng, &MEMBERS, 50);

    let total: Money = compute_group_net(&roster, &expenses)
        .iter()
        .map(|p| p.net)
        .sum();
    assert_eq!(total, Money::ZERO);
}

#[test]
fn test_empty_history() {
    let roster = common::roster(&MEMBERS);
    let report = compute_pairwise_balances(&"eli".into(), &roster, &[]).unwrap();
    assert!(report.members.is_empty());
    assert_eq!(report.summary.net_balance, Money::ZERO);
    assert_eq!(report.summary.total_you_owe, Money::ZERO);
    assert_eq!(report.summary.total_owes_you, Money::ZERO);
}
