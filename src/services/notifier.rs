use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{errors::AppResult, models::domain::SessionEvent};

/// Receives session lifecycle events. Delivery is best effort: callers log
/// failures instead of failing the operation that produced the event.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, event: SessionEvent) -> AppResult<()>;
}

/// Writes each event to the log as JSON.
#[derive(Clone, Default)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn publish(&self, event: SessionEvent) -> AppResult<()> {
        let payload = event.to_json()?;
        log::info!(
            "Session event {} for user {}: {}",
            event.event_type(),
            event.user_id(),
            payload
        );
        Ok(())
    }
}

/// Keeps published events in memory, in publish order.
#[derive(Clone, Default)]
pub struct InMemoryNotificationSink {
    events: Arc<RwLock<Vec<SessionEvent>>>,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<SessionEvent> {
        self.events.read().await.clone()
    }

    pub async fn events_for(&self, user_id: &str) -> Vec<SessionEvent> {
        let events = self.events.read().await;
        events
            .iter()
            .filter(|e| e.user_id() == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn publish(&self, event: SessionEvent) -> AppResult<()> {
        self.events.write().await.push(event);
        Ok(())
    }
}
