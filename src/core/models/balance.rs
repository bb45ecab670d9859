use serde::Serialize;
use std::collections::BTreeMap;

/// Net position per member for one group: positive means the member is
/// owed money, negative means they owe. Ordered so iteration is
/// deterministic.
pub type BalanceMap = BTreeMap<String, i64>;

/// A record excluded from a ledger fold, with enough context to locate it.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityViolation {
    SplitSumMismatch {
        expense_id: String,
        total: i64,
        split_sum: i64,
    },
    CurrencyMismatch {
        record_id: String,
        expected: String,
        found: String,
    },
}

/// Output of a ledger fold. `balances` always sums to exactly zero;
/// records that would break that are skipped and surfaced in `violations`
/// instead of corrupting the map.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct GroupBalances {
    pub currency: Option<String>,
    pub balances: BalanceMap,
    pub violations: Vec<IntegrityViolation>,
}

impl GroupBalances {
    pub fn net(&self, member_id: &str) -> i64 {
        self.balances.get(member_id).copied().unwrap_or(0)
    }

    pub fn is_settled(&self) -> bool {
        self.balances.values().all(|v| *v == 0)
    }
}

/// A directed transfer suggestion: `from_member_id` pays
/// `to_member_id` `amount` minor units.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SimplifiedDebt {
    pub from_member_id: String,
    pub to_member_id: String,
    pub amount: i64,
}
