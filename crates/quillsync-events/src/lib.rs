//! # Quillsync Domain Events
//!
//! Event payloads published by the transition engine and the item updater,
//! the `EventPublisher` abstraction over the durable bus, and an in-process
//! dispatching bus for single-binary deployments.
//!
//! Delivery is at-least-once: handlers must be idempotent on the event
//! payload, and the in-process bus never fails a publish because one handler
//! errored.

mod publisher;
mod types;

pub use publisher::{
    CapturingEventPublisher, DomainEventHandler, EventPublisher, HandlerError, InProcessEventBus,
    PublishError,
};
pub use types::DomainEvent;
