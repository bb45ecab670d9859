mod simplify_tests;

use chrono::Utc;
use uuid::Uuid;

use crate::config::SettlementPolicy;
use crate::core::models::expense::{ExpenseRecord, ExpenseSplit, ExpenseStatus};
use crate::core::models::settlement::{SettlementRecord, SettlementStatus};
use crate::core::services::DivvyService;
use crate::infrastructure::activity::in_memory::InMemoryActivitySink;
use crate::infrastructure::directory::in_memory::InMemoryDirectory;
use crate::infrastructure::store::in_memory::InMemoryStore;

pub const GROUP: &str = "goa-trip";
pub const TEST_THRESHOLD: i64 = 500_000;

pub type TestService = DivvyService<InMemoryStore, InMemoryDirectory, InMemoryActivitySink>;

pub struct TestHarness {
    pub service: TestService,
    pub store: InMemoryStore,
    pub directory: InMemoryDirectory,
    pub activity: InMemoryActivitySink,
}

pub fn create_test_service() -> TestHarness {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let store = InMemoryStore::new();
    let directory = InMemoryDirectory::new();
    let activity = InMemoryActivitySink::new();
    let service = DivvyService::new(
        store.clone(),
        directory.clone(),
        activity.clone(),
        SettlementPolicy::new(TEST_THRESHOLD),
    );
    TestHarness {
        service,
        store,
        directory,
        activity,
    }
}

pub async fn seed_members(harness: &TestHarness, group_id: &str, members: &[&str]) {
    for member in members {
        harness.directory.add_member(group_id, member).await;
    }
}

pub fn expense(group_id: &str, paid_by: &str, total: i64, splits: &[(&str, i64)]) -> ExpenseRecord {
    ExpenseRecord {
        id: Uuid::new_v4().to_string(),
        group_id: group_id.to_string(),
        paid_by: paid_by.to_string(),
        total,
        currency: "INR".to_string(),
        splits: splits
            .iter()
            .map(|(member_id, owed)| ExpenseSplit {
                member_id: member_id.to_string(),
                owed: *owed,
            })
            .collect(),
        status: ExpenseStatus::Active,
        notes: None,
        created_at: Utc::now(),
    }
}

pub fn settlement_with_status(
    group_id: &str,
    from: &str,
    to: &str,
    amount: i64,
    status: SettlementStatus,
) -> SettlementRecord {
    SettlementRecord {
        id: Uuid::new_v4().to_string(),
        group_id: group_id.to_string(),
        from_member_id: from.to_string(),
        to_member_id: to.to_string(),
        amount,
        currency: "INR".to_string(),
        status,
        requires_step_up_verification: false,
        verified: false,
        payment_method: None,
        notes: None,
        created_at: Utc::now(),
        confirmed_at: None,
        confirmed_by: None,
    }
}

pub fn confirmed_settlement(group_id: &str, from: &str, to: &str, amount: i64) -> SettlementRecord {
    let mut record = settlement_with_status(group_id, from, to, amount, SettlementStatus::Confirmed);
    record.confirmed_at = Some(Utc::now());
    record.confirmed_by = Some(to.to_string());
    record
}
