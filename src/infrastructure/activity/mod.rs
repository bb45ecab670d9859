use async_trait::async_trait;
use serde::Serialize;

use crate::core::errors::DivvyError;

/// Structured events handed to the notification/activity-feed
/// collaborator. Plain data; rendering and delivery are the
/// collaborator's concern.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    SettlementProposed {
        settlement_id: String,
        group_id: String,
        from_member_id: String,
        to_member_id: String,
        amount: i64,
        requires_step_up_verification: bool,
    },
    SettlementConfirmed {
        settlement_id: String,
        group_id: String,
        confirmed_by: String,
        amount: i64,
    },
    SettlementRejected {
        settlement_id: String,
        group_id: String,
        reason: Option<String>,
    },
}

#[async_trait]
pub trait ActivitySink: Send + Sync {
    async fn publish(&self, event: LedgerEvent) -> Result<(), DivvyError>;
}

pub mod in_memory;
