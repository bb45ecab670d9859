use serde::Serialize;
use thiserror::Error;

use crate::core::models::settlement::SettlementStatus;

#[derive(Error, Debug, Clone, Serialize, PartialEq)]
pub enum DivvyError {
    /// An expense's splits do not sum to its total
    #[error("Expense {expense_id} splits sum to {split_sum}, expected {total}")]
    SplitSumMismatch {
        expense_id: String,
        total: i64,
        split_sum: i64,
    },

    /// A record is denominated in a different currency than the computation
    #[error("Record {record_id} is denominated in {found}, expected {expected}")]
    CurrencyMismatch {
        record_id: String,
        expected: String,
        found: String,
    },

    /// A balance map fed to the simplifier does not sum to zero
    #[error("Balances sum to {0}, not zero")]
    UnbalancedLedger(i64),

    /// Expense failed construction-time validation
    #[error("Invalid expense: {0}")]
    InvalidExpense(String),

    /// Settlement amount must be a positive count of minor units
    #[error("Invalid settlement amount: {0}")]
    InvalidAmount(i64),

    /// Cannot create a settlement from a member to themselves
    #[error("Cannot create settlement to self")]
    SelfSettlement,

    /// Member is not part of the group
    #[error("Member {0} is not a group member")]
    NotGroupMember(String),

    /// Confirmation refused until step-up verification is completed
    #[error("Settlement {0} requires step-up verification")]
    StepUpVerificationRequired(String),

    #[error("Settlement {0} already confirmed")]
    SettlementAlreadyConfirmed(String),

    #[error("Settlement {0} already rejected")]
    SettlementAlreadyRejected(String),

    #[error("Settlement {0} not found")]
    SettlementNotFound(String),

    /// A compare-and-set write lost the race against another device
    #[error("Settlement {settlement_id} status changed concurrently (now {actual})")]
    StatusConflict {
        settlement_id: String,
        actual: SettlementStatus,
    },

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Activity log error: {0}")]
    ActivityLogError(String),
}

impl DivvyError {
    /// Bad records or broken invariants. Reported with enough context to
    /// locate the offending record; never worth retrying.
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            DivvyError::SplitSumMismatch { .. }
                | DivvyError::CurrencyMismatch { .. }
                | DivvyError::UnbalancedLedger(_)
                | DivvyError::InvalidExpense(_)
        )
    }

    /// Expected, recoverable refusals. The caller re-prompts (e.g. asks
    /// for step-up verification) and retries the same operation.
    pub fn is_policy(&self) -> bool {
        matches!(
            self,
            DivvyError::InvalidAmount(_)
                | DivvyError::SelfSettlement
                | DivvyError::NotGroupMember(_)
                | DivvyError::StepUpVerificationRequired(_)
                | DivvyError::SettlementAlreadyConfirmed(_)
                | DivvyError::SettlementAlreadyRejected(_)
        )
    }

    /// Transport-level failures. A `StatusConflict` should trigger a
    /// re-read and re-evaluation rather than a blind retry of the same
    /// write: the settlement may already be resolved on another device.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DivvyError::StorageError(_) | DivvyError::StatusConflict { .. }
        )
    }
}
