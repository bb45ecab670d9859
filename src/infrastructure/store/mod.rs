use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::core::errors::DivvyError;
use crate::core::models::expense::ExpenseRecord;
use crate::core::models::settlement::{SettlementRecord, SettlementStatus};

/// A change notification from the backing store. Deliberately small:
/// consumers refetch the affected group's snapshot, so delivery order
/// between notifications does not matter.
#[derive(Clone, Debug)]
pub struct StoreChange {
    pub group_id: String,
    pub kind: ChangeKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    ExpenseUpserted,
    SettlementUpserted,
}

/// Field updates applied together with a status transition, so the write
/// is a single atomic record swap at the store level.
#[derive(Clone, Debug)]
pub struct StatusUpdate {
    pub status: SettlementStatus,
    pub verified: Option<bool>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub confirmed_by: Option<String>,
    pub appended_note: Option<String>,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn list_active_expenses(
        &self,
        group_id: &str,
    ) -> Result<Vec<ExpenseRecord>, DivvyError>;

    async fn list_confirmed_settlements(
        &self,
        group_id: &str,
    ) -> Result<Vec<SettlementRecord>, DivvyError>;

    async fn list_settlements(&self, group_id: &str) -> Result<Vec<SettlementRecord>, DivvyError>;

    async fn get_settlement(
        &self,
        settlement_id: &str,
    ) -> Result<Option<SettlementRecord>, DivvyError>;

    async fn create_settlement(
        &self,
        record: SettlementRecord,
    ) -> Result<SettlementRecord, DivvyError>;

    /// Applies `update` only if the record's status still equals
    /// `expected`; otherwise fails with `StatusConflict` carrying the
    /// status actually found. This is the lost-update guard for two
    /// devices resolving the same pending settlement concurrently.
    async fn update_settlement_status(
        &self,
        settlement_id: &str,
        expected: SettlementStatus,
        update: StatusUpdate,
    ) -> Result<SettlementRecord, DivvyError>;

    /// Change feed covering every group in the store.
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

pub mod in_memory;
