use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::errors::DivvyError;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExpenseStatus {
    Active,
    Voided,
}

/// One member's share of an expense, in minor units.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpenseSplit {
    pub member_id: String,
    pub owed: i64,
}

impl ExpenseSplit {
    /// Splits `total` equally across `member_ids` with exact integer
    /// arithmetic. The remainder goes one minor unit at a time to the
    /// lexicographically first members, so the same inputs always produce
    /// the same shares.
    pub fn equal(total: i64, member_ids: &[String]) -> Result<Vec<ExpenseSplit>, DivvyError> {
        if total <= 0 {
            return Err(DivvyError::InvalidExpense(format!(
                "non-positive total {total}"
            )));
        }
        if member_ids.is_empty() {
            return Err(DivvyError::InvalidExpense(
                "no members to split across".to_string(),
            ));
        }

        let mut ordered: Vec<&String> = member_ids.iter().collect();
        ordered.sort();
        ordered.dedup();

        let count = ordered.len() as i64;
        let share = total / count;
        let remainder = (total % count) as usize;

        Ok(ordered
            .into_iter()
            .enumerate()
            .map(|(i, member_id)| ExpenseSplit {
                member_id: member_id.clone(),
                owed: if i < remainder { share + 1 } else { share },
            })
            .collect())
    }
}

/// A cost incurred on behalf of the group. Read-only input to the ledger;
/// the sync layer owns creation and voiding.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExpenseRecord {
    pub id: String,
    pub group_id: String,
    pub paid_by: String,
    pub total: i64,
    pub currency: String,
    pub splits: Vec<ExpenseSplit>,
    pub status: ExpenseStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ExpenseRecord {
    pub fn new(
        group_id: &str,
        paid_by: &str,
        total: i64,
        currency: &str,
        splits: Vec<ExpenseSplit>,
    ) -> Result<Self, DivvyError> {
        let record = ExpenseRecord {
            id: Uuid::new_v4().to_string(),
            group_id: group_id.to_string(),
            paid_by: paid_by.to_string(),
            total,
            currency: currency.to_string(),
            splits,
            status: ExpenseStatus::Active,
            notes: None,
            created_at: Utc::now(),
        };
        record.validate()?;
        Ok(record)
    }

    pub fn is_active(&self) -> bool {
        self.status == ExpenseStatus::Active
    }

    pub fn split_sum(&self) -> i64 {
        self.splits.iter().map(|s| s.owed).sum()
    }

    /// Boundary validation for externally supplied records. Inside a
    /// trusted pipeline the accumulator re-checks only the split-sum
    /// invariant and skips violators.
    pub fn validate(&self) -> Result<(), DivvyError> {
        if self.total <= 0 {
            return Err(DivvyError::InvalidExpense(format!(
                "non-positive total {}",
                self.total
            )));
        }
        if self.currency.is_empty() {
            return Err(DivvyError::InvalidExpense("empty currency code".to_string()));
        }
        if self.splits.is_empty() {
            return Err(DivvyError::InvalidExpense("no splits".to_string()));
        }
        if self.splits.iter().any(|s| s.owed < 0) {
            return Err(DivvyError::InvalidExpense(
                "negative split share".to_string(),
            ));
        }
        let mut seen: Vec<&str> = self.splits.iter().map(|s| s.member_id.as_str()).collect();
        seen.sort_unstable();
        if seen.windows(2).any(|w| w[0] == w[1]) {
            return Err(DivvyError::InvalidExpense(
                "duplicate member in splits".to_string(),
            ));
        }
        let split_sum = self.split_sum();
        if split_sum != self.total {
            return Err(DivvyError::SplitSumMismatch {
                expense_id: self.id.clone(),
                total: self.total,
                split_sum,
            });
        }
        Ok(())
    }
}
