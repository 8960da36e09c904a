//! Bus subscribers that wire requested and status-updated events to the
//! engine and the status store.

use async_trait::async_trait;
use quillsync_domain::TransitionType;
use quillsync_events::{DomainEvent, DomainEventHandler, HandlerError};
use quillsync_storage::TransitionStatusRepository;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::migrator::RevisionMigrator;
use crate::state_machine;

/// Runs the revision migrator when a `TransitionRequested` event arrives.
///
/// Requests for `Items` transitions are acknowledged and skipped: this engine
/// owns only the revision transition.
pub struct TransitionRequestedHandler {
    migrator: Arc<RevisionMigrator>,
}

impl TransitionRequestedHandler {
    pub fn new(migrator: Arc<RevisionMigrator>) -> Self {
        Self { migrator }
    }
}

#[async_trait]
impl DomainEventHandler for TransitionRequestedHandler {
    async fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        let DomainEvent::TransitionRequested {
            user_uuid,
            transition_type,
            ..
        } = event
        else {
            return Ok(());
        };

        match transition_type {
            TransitionType::Revisions => self
                .migrator
                .execute(*user_uuid)
                .await
                .map_err(|err| HandlerError(err.to_string())),
            TransitionType::Items => {
                debug!(
                    "No migrator registered for {} transitions, skipping user {}",
                    transition_type, user_uuid
                );
                Ok(())
            }
        }
    }
}

/// Persists published statuses into the transition status store.
///
/// This is the write half of `set_status`: the migrator publishes lifecycle
/// events and this subscriber records them. Redelivered or out-of-order
/// events are applied anyway (the payload is the truth) but logged when they
/// violate the lifecycle.
pub struct TransitionStatusUpdatedHandler {
    status_store: Arc<dyn TransitionStatusRepository>,
}

impl TransitionStatusUpdatedHandler {
    pub fn new(status_store: Arc<dyn TransitionStatusRepository>) -> Self {
        Self { status_store }
    }
}

#[async_trait]
impl DomainEventHandler for TransitionStatusUpdatedHandler {
    async fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        let DomainEvent::TransitionStatusUpdated {
            user_uuid,
            status,
            transition_type,
            transition_timestamp,
        } = event
        else {
            return Ok(());
        };

        let current = self
            .status_store
            .get_status(*user_uuid, *transition_type)
            .await
            .map_err(|err| HandlerError(err.to_string()))?;
        if !state_machine::is_valid_transition(current, *status) {
            warn!(
                "Unexpected status update for user {}: {:?} -> {}",
                user_uuid, current, status
            );
        }

        self.status_store
            .set_status(*user_uuid, *transition_type, *status, *transition_timestamp)
            .await
            .map_err(|err| HandlerError(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quillsync_domain::{Revision, TransitionStatus};
    use quillsync_events::{CapturingEventPublisher, EventPublisher, InProcessEventBus};
    use quillsync_storage::RevisionRepository;
    use quillsync_storage::in_memory::{InMemoryRevisionStore, InMemoryTransitionStatusStore};
    use uuid::Uuid;

    fn revision(user_uuid: Uuid, created_at: i64) -> Revision {
        Revision {
            uuid: Uuid::new_v4(),
            item_uuid: Uuid::new_v4(),
            user_uuid,
            content: Some("ciphertext".to_string()),
            content_type: Some("Note".to_string()),
            items_key_id: None,
            enc_item_key: None,
            auth_hash: None,
            creation_date: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn requested_event_drives_a_revision_migration() {
        let primary = InMemoryRevisionStore::new();
        let secondary = InMemoryRevisionStore::new();
        let statuses = InMemoryTransitionStatusStore::new();
        let status_publisher = CapturingEventPublisher::new();
        let user_uuid = Uuid::new_v4();
        secondary.insert(revision(user_uuid, 1)).await.unwrap();

        let migrator = RevisionMigrator::new(
            Arc::new(primary.clone()),
            Some(Arc::new(secondary)),
            Some(Arc::new(statuses)),
            Arc::new(status_publisher),
        );
        let bus = InProcessEventBus::new();
        bus.register(Arc::new(TransitionRequestedHandler::new(Arc::new(migrator))))
            .await;

        bus.publish(DomainEvent::TransitionRequested {
            user_uuid,
            transition_type: TransitionType::Revisions,
            timestamp: 1,
        })
        .await
        .unwrap();

        assert_eq!(primary.count_by_user_uuid(user_uuid).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn items_requests_are_skipped() {
        let migrator = RevisionMigrator::new(
            Arc::new(InMemoryRevisionStore::new()),
            Some(Arc::new(InMemoryRevisionStore::new())),
            Some(Arc::new(InMemoryTransitionStatusStore::new())),
            Arc::new(CapturingEventPublisher::new()),
        );
        let handler = TransitionRequestedHandler::new(Arc::new(migrator));

        handler
            .handle(&DomainEvent::TransitionRequested {
                user_uuid: Uuid::new_v4(),
                transition_type: TransitionType::Items,
                timestamp: 1,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn status_updates_are_persisted() {
        let statuses = InMemoryTransitionStatusStore::new();
        let handler = TransitionStatusUpdatedHandler::new(Arc::new(statuses.clone()));
        let user_uuid = Uuid::new_v4();

        handler
            .handle(&DomainEvent::TransitionStatusUpdated {
                user_uuid,
                status: TransitionStatus::InProgress,
                transition_type: TransitionType::Revisions,
                transition_timestamp: 7,
            })
            .await
            .unwrap();

        assert_eq!(
            statuses
                .get_status(user_uuid, TransitionType::Revisions)
                .await
                .unwrap(),
            Some(TransitionStatus::InProgress)
        );
    }

    #[tokio::test]
    async fn redelivered_status_updates_stay_idempotent() {
        let statuses = InMemoryTransitionStatusStore::new();
        let handler = TransitionStatusUpdatedHandler::new(Arc::new(statuses.clone()));
        let user_uuid = Uuid::new_v4();
        let event = DomainEvent::TransitionStatusUpdated {
            user_uuid,
            status: TransitionStatus::Verified,
            transition_type: TransitionType::Revisions,
            transition_timestamp: 7,
        };

        handler.handle(&event).await.unwrap();
        handler.handle(&event).await.unwrap();

        assert_eq!(
            statuses
                .get_status(user_uuid, TransitionType::Revisions)
                .await
                .unwrap(),
            Some(TransitionStatus::Verified)
        );
    }
}
