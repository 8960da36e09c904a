//! Event payloads, serialized with a SCREAMING_SNAKE_CASE `type` tag.

use quillsync_domain::{TransitionStatus, TransitionType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every event the core publishes on the durable bus.
///
/// The wire shape is JSON with a `type` discriminator, e.g.
/// `{"type":"TRANSITION_REQUESTED","user_uuid":…,"transition_type":"REVISIONS","timestamp":…}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    /// The scheduler driver asks for a user's transition to run.
    TransitionRequested {
        user_uuid: Uuid,
        transition_type: TransitionType,
        /// UTC microseconds at request time.
        timestamp: i64,
    },
    /// The migrator reports a lifecycle change for one `(user, type)`.
    TransitionStatusUpdated {
        user_uuid: Uuid,
        status: TransitionStatus,
        transition_type: TransitionType,
        /// UTC microseconds at publish time.
        transition_timestamp: i64,
    },
    /// The item updater persisted a mutation; a revision should be cut.
    ItemRevisionCreationRequested { item_uuid: Uuid, user_uuid: Uuid },
    /// The item updater ingested a hash that names a duplicate source.
    DuplicateItemSynced {
        item_uuid: Uuid,
        duplicate_of_uuid: Uuid,
        user_uuid: Uuid,
    },
}

impl DomainEvent {
    /// The wire discriminator for this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::TransitionRequested { .. } => "TRANSITION_REQUESTED",
            DomainEvent::TransitionStatusUpdated { .. } => "TRANSITION_STATUS_UPDATED",
            DomainEvent::ItemRevisionCreationRequested { .. } => {
                "ITEM_REVISION_CREATION_REQUESTED"
            }
            DomainEvent::DuplicateItemSynced { .. } => "DUPLICATE_ITEM_SYNCED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_carries_type_tag() {
        let event = DomainEvent::TransitionRequested {
            user_uuid: Uuid::nil(),
            transition_type: TransitionType::Revisions,
            timestamp: 42,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TRANSITION_REQUESTED");
        assert_eq!(json["transition_type"], "REVISIONS");
        assert_eq!(json["timestamp"], 42);

        let back: DomainEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn event_type_matches_serialized_tag() {
        let event = DomainEvent::DuplicateItemSynced {
            item_uuid: Uuid::nil(),
            duplicate_of_uuid: Uuid::nil(),
            user_uuid: Uuid::nil(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.event_type());
    }
}
