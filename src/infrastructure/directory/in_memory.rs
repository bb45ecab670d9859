use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::errors::DivvyError;
use crate::infrastructure::directory::Directory;

#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    members: Arc<RwLock<HashMap<String, BTreeSet<String>>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_member(&self, group_id: &str, member_id: &str) {
        let mut members = self.members.write().await;
        members
            .entry(group_id.to_string())
            .or_default()
            .insert(member_id.to_string());
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn is_member(&self, group_id: &str, member_id: &str) -> Result<bool, DivvyError> {
        let members = self.members.read().await;
        Ok(members
            .get(group_id)
            .is_some_and(|group| group.contains(member_id)))
    }

    async fn list_members(&self, group_id: &str) -> Result<Vec<String>, DivvyError> {
        let members = self.members.read().await;
        Ok(members
            .get(group_id)
            .map(|group| group.iter().cloned().collect())
            .unwrap_or_default())
    }
}
