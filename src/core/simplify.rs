use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use crate::core::errors::DivvyError;
use crate::core::models::balance::{BalanceMap, SimplifiedDebt};

/// One side of the matching. Ordered so the heap pops the largest
/// remaining magnitude first and breaks ties toward the lexicographically
/// smaller member id.
#[derive(Debug, PartialEq, Eq)]
struct Party {
    remaining: i64,
    member_id: String,
}

impl Ord for Party {
    fn cmp(&self, other: &Self) -> Ordering {
        self.remaining
            .cmp(&other.remaining)
            .then_with(|| other.member_id.cmp(&self.member_id))
    }
}

impl PartialOrd for Party {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Greedy largest-magnitude matching: repeatedly pair the biggest debtor
/// with the biggest creditor and transfer the smaller of the two
/// magnitudes. Each round retires at least one party, so the output holds
/// at most `debtors + creditors - 1` transfers.
///
/// The greedy pairing and its tie-break order are part of the contract;
/// callers depend on reproducible suggestions across devices. Greedy is
/// not guaranteed globally minimal and must not be "improved" silently.
///
/// Members with a zero balance are omitted. Rejects maps whose values do
/// not sum to zero; feeding the simplifier an unbalanced map would
/// silently invent or destroy money.
pub fn simplify(balances: &BalanceMap) -> Result<Vec<SimplifiedDebt>, DivvyError> {
    let total: i64 = balances.values().sum();
    if total != 0 {
        return Err(DivvyError::UnbalancedLedger(total));
    }

    let mut debtors = BinaryHeap::new();
    let mut creditors = BinaryHeap::new();
    for (member_id, &net) in balances {
        match net.cmp(&0) {
            Ordering::Less => debtors.push(Party {
                remaining: -net,
                member_id: member_id.clone(),
            }),
            Ordering::Greater => creditors.push(Party {
                remaining: net,
                member_id: member_id.clone(),
            }),
            Ordering::Equal => {}
        }
    }

    let mut transfers = Vec::new();
    while let (Some(mut debtor), Some(mut creditor)) = (debtors.pop(), creditors.pop()) {
        let amount = debtor.remaining.min(creditor.remaining);
        transfers.push(SimplifiedDebt {
            from_member_id: debtor.member_id.clone(),
            to_member_id: creditor.member_id.clone(),
            amount,
        });

        debtor.remaining -= amount;
        creditor.remaining -= amount;
        if debtor.remaining > 0 {
            debtors.push(debtor);
        }
        if creditor.remaining > 0 {
            creditors.push(creditor);
        }
    }

    debug!(transfers = transfers.len(), "debts simplified");
    Ok(transfers)
}
