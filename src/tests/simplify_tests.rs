use std::collections::BTreeMap;

use super::{GROUP, confirmed_settlement, expense};
use crate::core::errors::DivvyError;
use crate::core::ledger::compute_balances;
use crate::core::models::balance::{BalanceMap, SimplifiedDebt};
use crate::core::simplify::simplify;

fn balances(entries: &[(&str, i64)]) -> BalanceMap {
    entries
        .iter()
        .map(|(member, net)| (member.to_string(), *net))
        .collect()
}

fn transfer(from: &str, to: &str, amount: i64) -> SimplifiedDebt {
    SimplifiedDebt {
        from_member_id: from.to_string(),
        to_member_id: to.to_string(),
        amount,
    }
}

#[test]
fn empty_input_yields_no_transfers() {
    assert_eq!(simplify(&BTreeMap::new()).unwrap(), vec![]);
}

#[test]
fn settled_members_are_omitted() {
    let input = balances(&[("anita", 0), ("bhavin", -50), ("chetan", 50)]);
    assert_eq!(
        simplify(&input).unwrap(),
        vec![transfer("bhavin", "chetan", 50)]
    );
}

#[test]
fn equal_pair_yields_exactly_one_transfer() {
    let input = balances(&[("anita", 700), ("bhavin", -700)]);
    assert_eq!(
        simplify(&input).unwrap(),
        vec![transfer("bhavin", "anita", 700)]
    );
}

#[test]
fn even_three_way_expense_needs_two_transfers() {
    let input = balances(&[("anita", 200), ("bhavin", -100), ("chetan", -100)]);
    assert_eq!(
        simplify(&input).unwrap(),
        vec![
            transfer("bhavin", "anita", 100),
            transfer("chetan", "anita", 100),
        ]
    );
}

#[test]
fn one_debtor_pays_creditors_largest_first() {
    let input = balances(&[("anita", -300), ("bhavin", 200), ("chetan", 100)]);
    assert_eq!(
        simplify(&input).unwrap(),
        vec![
            transfer("anita", "bhavin", 200),
            transfer("anita", "chetan", 100),
        ]
    );
}

#[test]
fn ties_break_toward_the_smaller_member_id() {
    let debtor_tie = balances(&[("aj", -100), ("bela", -100), ("zoya", 200)]);
    assert_eq!(
        simplify(&debtor_tie).unwrap(),
        vec![transfer("aj", "zoya", 100), transfer("bela", "zoya", 100)]
    );

    let creditor_tie = balances(&[("aj", -200), ("yash", 100), ("zoya", 100)]);
    assert_eq!(
        simplify(&creditor_tie).unwrap(),
        vec![transfer("aj", "yash", 100), transfer("aj", "zoya", 100)]
    );
}

#[test]
fn output_is_deterministic_across_calls() {
    let input = balances(&[
        ("anita", 250),
        ("bhavin", -120),
        ("chetan", -130),
        ("divya", 175),
        ("esha", -175),
    ]);
    assert_eq!(simplify(&input).unwrap(), simplify(&input).unwrap());
}

#[test]
fn transfer_count_stays_under_party_bound() {
    let input = balances(&[
        ("anita", -10),
        ("bhavin", -20),
        ("chetan", -30),
        ("divya", 25),
        ("esha", 35),
    ]);
    let transfers = simplify(&input).unwrap();
    // 3 debtors + 2 creditors
    assert!(transfers.len() <= 4);
    assert!(transfers.iter().all(|t| t.amount > 0));
}

#[test]
fn unbalanced_map_is_rejected() {
    let input = balances(&[("anita", 100), ("bhavin", -99)]);
    let err = simplify(&input).unwrap_err();
    assert_eq!(err, DivvyError::UnbalancedLedger(1));
    assert!(err.is_data_integrity());
}

#[test]
fn applying_transfers_as_settlements_zeroes_every_balance() {
    let expenses = vec![
        expense(
            GROUP,
            "anita",
            301,
            &[("anita", 101), ("bhavin", 100), ("chetan", 100)],
        ),
        expense(GROUP, "bhavin", 40, &[("chetan", 25), ("divya", 15)]),
        expense(GROUP, "divya", 90, &[("anita", 45), ("bhavin", 45)]),
    ];
    let before = compute_balances(&expenses, &[]);

    let transfers = simplify(&before.balances).unwrap();
    let settlements: Vec<_> = transfers
        .iter()
        .map(|t| confirmed_settlement(GROUP, &t.from_member_id, &t.to_member_id, t.amount))
        .collect();

    let after = compute_balances(&expenses, &settlements);
    assert!(after.is_settled());
    assert!(after.violations.is_empty());
}
