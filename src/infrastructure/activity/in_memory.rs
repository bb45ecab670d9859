use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::errors::DivvyError;
use crate::infrastructure::activity::{ActivitySink, LedgerEvent};

#[derive(Clone, Default)]
pub struct InMemoryActivitySink {
    events: Arc<RwLock<Vec<LedgerEvent>>>,
}

impl InMemoryActivitySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<LedgerEvent> {
        let events = self.events.read().await;
        events.clone()
    }
}

#[async_trait]
impl ActivitySink for InMemoryActivitySink {
    async fn publish(&self, event: LedgerEvent) -> Result<(), DivvyError> {
        let mut events = self.events.write().await;
        events.push(event);
        Ok(())
    }
}
