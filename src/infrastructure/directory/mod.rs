use async_trait::async_trait;

use crate::core::errors::DivvyError;

/// Membership collaborator. The engine only ever asks who belongs to a
/// group; identity administration and display names live elsewhere.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn is_member(&self, group_id: &str, member_id: &str) -> Result<bool, DivvyError>;
    async fn list_members(&self, group_id: &str) -> Result<Vec<String>, DivvyError>;
}

pub mod in_memory;
