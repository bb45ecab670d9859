use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SettlementStatus {
    Pending,
    Confirmed,
    Rejected,
}

impl SettlementStatus {
    /// Terminal states are immutable; only `Pending` may transition.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SettlementStatus::Confirmed | SettlementStatus::Rejected
        )
    }
}

impl std::fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SettlementStatus::Pending => "PENDING",
            SettlementStatus::Confirmed => "CONFIRMED",
            SettlementStatus::Rejected => "REJECTED",
        };
        write!(f, "{}", s)
    }
}

/// A proposed transfer from a debtor to a creditor. Created `Pending`,
/// resolved exactly once to `Confirmed` or `Rejected`. Only confirmed
/// settlements participate in balance computation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SettlementRecord {
    pub id: String,
    pub group_id: String,
    pub from_member_id: String,
    pub to_member_id: String,
    pub amount: i64,
    pub currency: String,
    pub status: SettlementStatus,
    pub requires_step_up_verification: bool,
    pub verified: bool,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub confirmed_by: Option<String>,
}

impl SettlementRecord {
    pub fn is_pending(&self) -> bool {
        self.status == SettlementStatus::Pending
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == SettlementStatus::Confirmed
    }
}
