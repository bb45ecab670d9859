pub mod config;
pub mod core;
pub mod infrastructure;

pub use crate::config::{Config, SettlementPolicy, CONFIG};
pub use crate::core::errors::DivvyError;
pub use crate::core::ledger::compute_balances;
pub use crate::core::models::balance::{BalanceMap, GroupBalances, IntegrityViolation, SimplifiedDebt};
pub use crate::core::models::expense::{ExpenseRecord, ExpenseSplit, ExpenseStatus};
pub use crate::core::models::settlement::{SettlementRecord, SettlementStatus};
pub use crate::core::services::DivvyService;
pub use crate::core::simplify::simplify;
pub use crate::infrastructure::activity::{ActivitySink, LedgerEvent};
pub use crate::infrastructure::directory::Directory;
pub use crate::infrastructure::store::{ChangeKind, StatusUpdate, Store, StoreChange};

#[cfg(test)]
mod tests;
