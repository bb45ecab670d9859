use chrono::Utc;
use futures::stream::{self, Stream};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SettlementPolicy;
use crate::core::errors::DivvyError;
use crate::core::ledger::compute_balances;
use crate::core::models::balance::{GroupBalances, SimplifiedDebt};
use crate::core::models::settlement::{SettlementRecord, SettlementStatus};
use crate::core::simplify::simplify;
use crate::infrastructure::activity::{ActivitySink, LedgerEvent};
use crate::infrastructure::directory::Directory;
use crate::infrastructure::store::{StatusUpdate, Store, StoreChange};

/// Settlement lifecycle manager and orchestration entry points. The pure
/// accumulator and simplifier stay free of store and subscription
/// concerns; this service wires them to the collaborators.
pub struct DivvyService<S: Store, D: Directory, A: ActivitySink> {
    store: S,
    directory: D,
    activity: A,
    policy: SettlementPolicy,
}

impl<S: Store, D: Directory, A: ActivitySink> DivvyService<S, D, A> {
    pub fn new(store: S, directory: D, activity: A, policy: SettlementPolicy) -> Self {
        info!(
            step_up_threshold = policy.step_up_threshold,
            "initializing ledger service"
        );
        DivvyService {
            store,
            directory,
            activity,
            policy,
        }
    }

    // SETTLEMENT LIFECYCLE

    pub async fn propose(
        &self,
        group_id: &str,
        from_member_id: &str,
        to_member_id: &str,
        amount: i64,
        currency: &str,
        payment_method: Option<String>,
        notes: Option<String>,
    ) -> Result<SettlementRecord, DivvyError> {
        if amount <= 0 {
            return Err(DivvyError::InvalidAmount(amount));
        }
        if from_member_id == to_member_id {
            return Err(DivvyError::SelfSettlement);
        }
        self.ensure_member(group_id, from_member_id).await?;
        self.ensure_member(group_id, to_member_id).await?;

        // The gate is decided once, at creation time, against the policy
        // in force; later threshold changes do not reclassify records.
        let requires_step_up = amount >= self.policy.step_up_threshold;

        let record = SettlementRecord {
            id: Uuid::new_v4().to_string(),
            group_id: group_id.to_string(),
            from_member_id: from_member_id.to_string(),
            to_member_id: to_member_id.to_string(),
            amount,
            currency: currency.to_string(),
            status: SettlementStatus::Pending,
            requires_step_up_verification: requires_step_up,
            verified: false,
            payment_method,
            notes,
            created_at: Utc::now(),
            confirmed_at: None,
            confirmed_by: None,
        };

        let created = self.store.create_settlement(record).await?;
        debug!(settlement_id = %created.id, requires_step_up, "settlement proposed");

        self.activity
            .publish(LedgerEvent::SettlementProposed {
                settlement_id: created.id.clone(),
                group_id: created.group_id.clone(),
                from_member_id: created.from_member_id.clone(),
                to_member_id: created.to_member_id.clone(),
                amount: created.amount,
                requires_step_up_verification: created.requires_step_up_verification,
            })
            .await?;

        Ok(created)
    }

    pub async fn confirm(
        &self,
        settlement_id: &str,
        confirming_member_id: &str,
        verified: bool,
    ) -> Result<SettlementRecord, DivvyError> {
        let record = self
            .store
            .get_settlement(settlement_id)
            .await?
            .ok_or_else(|| DivvyError::SettlementNotFound(settlement_id.to_string()))?;

        match record.status {
            SettlementStatus::Confirmed => {
                // A second identical confirmation from another device is
                // harmless; a different confirmer is a real conflict.
                if record.confirmed_by.as_deref() == Some(confirming_member_id) {
                    return Ok(record);
                }
                return Err(DivvyError::SettlementAlreadyConfirmed(record.id));
            }
            SettlementStatus::Rejected => {
                return Err(DivvyError::SettlementAlreadyRejected(record.id));
            }
            SettlementStatus::Pending => {}
        }

        if record.requires_step_up_verification && !verified {
            warn!(
                settlement_id = %record.id,
                amount = record.amount,
                "confirmation refused: step-up verification missing"
            );
            return Err(DivvyError::StepUpVerificationRequired(record.id));
        }

        let update = StatusUpdate {
            status: SettlementStatus::Confirmed,
            verified: Some(verified),
            confirmed_at: Some(Utc::now()),
            confirmed_by: Some(confirming_member_id.to_string()),
            appended_note: None,
        };

        match self
            .store
            .update_settlement_status(settlement_id, SettlementStatus::Pending, update)
            .await
        {
            Ok(updated) => {
                info!(settlement_id = %updated.id, "settlement confirmed");
                self.activity
                    .publish(LedgerEvent::SettlementConfirmed {
                        settlement_id: updated.id.clone(),
                        group_id: updated.group_id.clone(),
                        confirmed_by: confirming_member_id.to_string(),
                        amount: updated.amount,
                    })
                    .await?;
                Ok(updated)
            }
            Err(DivvyError::StatusConflict { .. }) => {
                // Lost the race: re-read and re-evaluate instead of
                // retrying the same write blindly.
                self.reevaluate_after_conflict(settlement_id, |current| match current.status {
                    SettlementStatus::Confirmed
                        if current.confirmed_by.as_deref() == Some(confirming_member_id) =>
                    {
                        Ok(current)
                    }
                    SettlementStatus::Confirmed => {
                        Err(DivvyError::SettlementAlreadyConfirmed(current.id))
                    }
                    SettlementStatus::Rejected => {
                        Err(DivvyError::SettlementAlreadyRejected(current.id))
                    }
                    SettlementStatus::Pending => Err(DivvyError::StatusConflict {
                        settlement_id: current.id,
                        actual: SettlementStatus::Pending,
                    }),
                })
                .await
            }
            Err(e) => Err(e),
        }
    }

    pub async fn reject(
        &self,
        settlement_id: &str,
        reason: Option<String>,
    ) -> Result<SettlementRecord, DivvyError> {
        let record = self
            .store
            .get_settlement(settlement_id)
            .await?
            .ok_or_else(|| DivvyError::SettlementNotFound(settlement_id.to_string()))?;

        match record.status {
            SettlementStatus::Rejected => return Ok(record),
            SettlementStatus::Confirmed => {
                return Err(DivvyError::SettlementAlreadyConfirmed(record.id));
            }
            SettlementStatus::Pending => {}
        }

        let update = StatusUpdate {
            status: SettlementStatus::Rejected,
            verified: None,
            confirmed_at: None,
            confirmed_by: None,
            appended_note: reason.clone(),
        };

        match self
            .store
            .update_settlement_status(settlement_id, SettlementStatus::Pending, update)
            .await
        {
            Ok(updated) => {
                info!(settlement_id = %updated.id, "settlement rejected");
                self.activity
                    .publish(LedgerEvent::SettlementRejected {
                        settlement_id: updated.id.clone(),
                        group_id: updated.group_id.clone(),
                        reason,
                    })
                    .await?;
                Ok(updated)
            }
            Err(DivvyError::StatusConflict { .. }) => {
                self.reevaluate_after_conflict(settlement_id, |current| match current.status {
                    SettlementStatus::Rejected => Ok(current),
                    SettlementStatus::Confirmed => {
                        Err(DivvyError::SettlementAlreadyConfirmed(current.id))
                    }
                    SettlementStatus::Pending => Err(DivvyError::StatusConflict {
                        settlement_id: current.id,
                        actual: SettlementStatus::Pending,
                    }),
                })
                .await
            }
            Err(e) => Err(e),
        }
    }

    // BALANCES & SIMPLIFICATION

    pub async fn current_balances(&self, group_id: &str) -> Result<GroupBalances, DivvyError> {
        let expenses = self.store.list_active_expenses(group_id).await?;
        let settlements = self.store.list_confirmed_settlements(group_id).await?;
        Ok(compute_balances(&expenses, &settlements))
    }

    pub async fn simplified_debts(
        &self,
        group_id: &str,
    ) -> Result<Vec<SimplifiedDebt>, DivvyError> {
        let balances = self.current_balances(group_id).await?;
        simplify(&balances.balances)
    }

    pub async fn settlements(&self, group_id: &str) -> Result<Vec<SettlementRecord>, DivvyError> {
        self.store.list_settlements(group_id).await
    }

    pub async fn pending_settlements(
        &self,
        group_id: &str,
    ) -> Result<Vec<SettlementRecord>, DivvyError> {
        Ok(self
            .store
            .list_settlements(group_id)
            .await?
            .into_iter()
            .filter(|s| s.is_pending())
            .collect())
    }

    /// Live view of a group's balances: recomputes from the latest store
    /// snapshot each time the store reports a change to the group. A
    /// lagged receiver recomputes once from the current snapshot; the
    /// stream converges without replaying intermediate events.
    pub fn watch_balances<'a>(
        &'a self,
        group_id: &str,
    ) -> impl Stream<Item = Result<GroupBalances, DivvyError>> + 'a {
        let rx = self.store.subscribe();
        let group_id = group_id.to_string();
        stream::unfold(
            (self, rx, group_id),
            |(service, mut rx, group_id)| async move {
                loop {
                    match rx.recv().await {
                        Ok(StoreChange { group_id: changed, .. }) if changed == group_id => {
                            let snapshot = service.current_balances(&group_id).await;
                            return Some((snapshot, (service, rx, group_id)));
                        }
                        Ok(_) => continue,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "balance watcher lagged; recomputing from latest");
                            let snapshot = service.current_balances(&group_id).await;
                            return Some((snapshot, (service, rx, group_id)));
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            },
        )
    }

    // HELPERS

    async fn ensure_member(&self, group_id: &str, member_id: &str) -> Result<(), DivvyError> {
        if !self.directory.is_member(group_id, member_id).await? {
            return Err(DivvyError::NotGroupMember(member_id.to_string()));
        }
        Ok(())
    }

    async fn reevaluate_after_conflict(
        &self,
        settlement_id: &str,
        evaluate: impl FnOnce(SettlementRecord) -> Result<SettlementRecord, DivvyError>,
    ) -> Result<SettlementRecord, DivvyError> {
        let current = self
            .store
            .get_settlement(settlement_id)
            .await?
            .ok_or_else(|| DivvyError::SettlementNotFound(settlement_id.to_string()))?;
        evaluate(current)
    }
}
