//! Publisher and handler abstractions over the durable event bus.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::types::DomainEvent;

/// Error publishing to the bus.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Failed to publish event: {0}")]
    Delivery(String),
}

/// Error inside one event handler. Logged by the bus, never propagated to
/// the publisher.
#[derive(Debug, thiserror::Error)]
#[error("Event handler error: {0}")]
pub struct HandlerError(pub String);

/// Producer side of the durable bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: DomainEvent) -> Result<(), PublishError>;
}

/// Consumer side: one subscriber on the bus.
#[async_trait]
pub trait DomainEventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError>;
}

/// Dispatching bus for single-binary deployments.
///
/// Hands each published event to every registered handler in registration
/// order. A failing handler is logged and the remaining handlers still run.
#[derive(Default)]
pub struct InProcessEventBus {
    handlers: RwLock<Vec<Arc<dyn DomainEventHandler>>>,
}

impl InProcessEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, handler: Arc<dyn DomainEventHandler>) {
        self.handlers.write().await.push(handler);
    }
}

#[async_trait]
impl EventPublisher for InProcessEventBus {
    async fn publish(&self, event: DomainEvent) -> Result<(), PublishError> {
        let handlers = self.handlers.read().await.clone();
        for handler in handlers {
            if let Err(err) = handler.handle(&event).await {
                warn!("Handler failed on {} event: {}", event.event_type(), err);
            }
        }
        Ok(())
    }
}

/// Publisher that records every event. For tests.
#[derive(Clone, Default)]
pub struct CapturingEventPublisher {
    events: Arc<RwLock<Vec<DomainEvent>>>,
}

impl CapturingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far, in publish order.
    pub async fn events(&self) -> Vec<DomainEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl EventPublisher for CapturingEventPublisher {
    async fn publish(&self, event: DomainEvent) -> Result<(), PublishError> {
        self.events.write().await.push(event);
        Ok(())
    }
}
