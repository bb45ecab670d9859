pub mod balance;
pub mod expense;
pub mod settlement;

pub use balance::{BalanceMap, GroupBalances, IntegrityViolation, SimplifiedDebt};
pub use expense::{ExpenseRecord, ExpenseSplit, ExpenseStatus};
pub use settlement::{SettlementRecord, SettlementStatus};
