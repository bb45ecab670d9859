use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};

use crate::core::errors::DivvyError;
use crate::core::models::expense::ExpenseRecord;
use crate::core::models::settlement::{SettlementRecord, SettlementStatus};
use crate::infrastructure::store::{ChangeKind, StatusUpdate, Store, StoreChange};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Reference store adapter backed by process memory. Also the fixture
/// every test runs against.
#[derive(Clone)]
pub struct InMemoryStore {
    expenses: Arc<RwLock<HashMap<String, ExpenseRecord>>>,
    settlements: Arc<RwLock<HashMap<String, SettlementRecord>>>,
    changes: broadcast::Sender<StoreChange>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        InMemoryStore {
            expenses: Arc::new(RwLock::new(HashMap::new())),
            settlements: Arc::new(RwLock::new(HashMap::new())),
            changes,
        }
    }

    /// Expense records are read-only input to the engine; this seeds them
    /// the way the sync layer would deliver them.
    pub async fn put_expense(&self, record: ExpenseRecord) {
        let group_id = record.group_id.clone();
        {
            let mut expenses = self.expenses.write().await;
            expenses.insert(record.id.clone(), record);
        }
        self.notify(group_id, ChangeKind::ExpenseUpserted);
    }

    fn notify(&self, group_id: String, kind: ChangeKind) {
        // Send only fails when nobody is subscribed.
        let _ = self.changes.send(StoreChange { group_id, kind });
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn list_active_expenses(
        &self,
        group_id: &str,
    ) -> Result<Vec<ExpenseRecord>, DivvyError> {
        let expenses = self.expenses.read().await;
        let mut records: Vec<ExpenseRecord> = expenses
            .values()
            .filter(|e| e.group_id == group_id && e.is_active())
            .cloned()
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    async fn list_confirmed_settlements(
        &self,
        group_id: &str,
    ) -> Result<Vec<SettlementRecord>, DivvyError> {
        let settlements = self.settlements.read().await;
        let mut records: Vec<SettlementRecord> = settlements
            .values()
            .filter(|s| s.group_id == group_id && s.is_confirmed())
            .cloned()
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    async fn list_settlements(&self, group_id: &str) -> Result<Vec<SettlementRecord>, DivvyError> {
        let settlements = self.settlements.read().await;
        let mut records: Vec<SettlementRecord> = settlements
            .values()
            .filter(|s| s.group_id == group_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    async fn get_settlement(
        &self,
        settlement_id: &str,
    ) -> Result<Option<SettlementRecord>, DivvyError> {
        let settlements = self.settlements.read().await;
        Ok(settlements.get(settlement_id).cloned())
    }

    async fn create_settlement(
        &self,
        record: SettlementRecord,
    ) -> Result<SettlementRecord, DivvyError> {
        let group_id = record.group_id.clone();
        {
            let mut settlements = self.settlements.write().await;
            settlements.insert(record.id.clone(), record.clone());
        }
        self.notify(group_id, ChangeKind::SettlementUpserted);
        Ok(record)
    }

    async fn update_settlement_status(
        &self,
        settlement_id: &str,
        expected: SettlementStatus,
        update: StatusUpdate,
    ) -> Result<SettlementRecord, DivvyError> {
        // Check-and-apply under one write lock, so no caller can observe
        // a partially applied transition.
        let updated = {
            let mut settlements = self.settlements.write().await;
            let record = settlements
                .get_mut(settlement_id)
                .ok_or_else(|| DivvyError::SettlementNotFound(settlement_id.to_string()))?;

            if record.status != expected {
                return Err(DivvyError::StatusConflict {
                    settlement_id: settlement_id.to_string(),
                    actual: record.status,
                });
            }

            record.status = update.status;
            if let Some(verified) = update.verified {
                record.verified = verified;
            }
            if update.confirmed_at.is_some() {
                record.confirmed_at = update.confirmed_at;
            }
            if update.confirmed_by.is_some() {
                record.confirmed_by = update.confirmed_by;
            }
            if let Some(note) = update.appended_note {
                record.notes = Some(match record.notes.take() {
                    Some(existing) => format!("{existing}\n{note}"),
                    None => note,
                });
            }
            record.clone()
        };

        self.notify(updated.group_id.clone(), ChangeKind::SettlementUpserted);
        Ok(updated)
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
