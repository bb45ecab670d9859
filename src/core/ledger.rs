use tracing::{debug, warn};

use crate::core::models::balance::{GroupBalances, IntegrityViolation};
use crate::core::models::expense::ExpenseRecord;
use crate::core::models::settlement::SettlementRecord;

/// Folds active expenses and confirmed settlements into per-member net
/// balances. Pure fold over integer addition, so iteration order never
/// changes the result and the same snapshot always yields the same map.
///
/// Records that would break conservation are skipped whole and reported
/// in `violations`: an expense whose splits do not sum to its total, or
/// any record denominated in a currency other than the computation's
/// reference currency.
pub fn compute_balances(
    expenses: &[ExpenseRecord],
    settlements: &[SettlementRecord],
) -> GroupBalances {
    let mut out = GroupBalances::default();

    // The reference currency is taken from the first record in id order,
    // so the same snapshot always reports the same mismatches no matter
    // how the store ordered its lists.
    let mut active: Vec<&ExpenseRecord> = expenses.iter().filter(|e| e.is_active()).collect();
    active.sort_by(|a, b| a.id.cmp(&b.id));
    let mut confirmed: Vec<&SettlementRecord> =
        settlements.iter().filter(|s| s.is_confirmed()).collect();
    confirmed.sort_by(|a, b| a.id.cmp(&b.id));

    for expense in active {
        let expected = reference_currency(&mut out.currency, &expense.currency);
        if expense.currency != expected {
            warn!(expense_id = %expense.id, "expense skipped: currency mismatch");
            out.violations.push(IntegrityViolation::CurrencyMismatch {
                record_id: expense.id.clone(),
                expected,
                found: expense.currency.clone(),
            });
            continue;
        }

        let split_sum = expense.split_sum();
        if split_sum != expense.total {
            warn!(expense_id = %expense.id, "expense skipped: splits do not sum to total");
            out.violations.push(IntegrityViolation::SplitSumMismatch {
                expense_id: expense.id.clone(),
                total: expense.total,
                split_sum,
            });
            continue;
        }

        // The payer is usually also a split participant, so their own
        // share nets against the credit automatically.
        *out.balances.entry(expense.paid_by.clone()).or_insert(0) += expense.total;
        for split in &expense.splits {
            *out.balances.entry(split.member_id.clone()).or_insert(0) -= split.owed;
        }
    }

    for settlement in confirmed {
        let expected = reference_currency(&mut out.currency, &settlement.currency);
        if settlement.currency != expected {
            warn!(settlement_id = %settlement.id, "settlement skipped: currency mismatch");
            out.violations.push(IntegrityViolation::CurrencyMismatch {
                record_id: settlement.id.clone(),
                expected,
                found: settlement.currency.clone(),
            });
            continue;
        }

        // Paying down a debt shrinks the debtor's deficit and the
        // creditor's receivable by the same amount.
        *out.balances
            .entry(settlement.from_member_id.clone())
            .or_insert(0) += settlement.amount;
        *out.balances
            .entry(settlement.to_member_id.clone())
            .or_insert(0) -= settlement.amount;
    }

    debug!(
        members = out.balances.len(),
        violations = out.violations.len(),
        "balances folded"
    );
    out
}

fn reference_currency(slot: &mut Option<String>, found: &str) -> String {
    match slot {
        Some(currency) => currency.clone(),
        None => {
            *slot = Some(found.to_string());
            found.to_string()
        }
    }
}
