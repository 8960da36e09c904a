//! Error taxonomy for the transition engine.
//!
//! Configuration errors surface immediately and are never retried; store
//! errors at page or count level abort one user's migration; integrity
//! mismatches are deterministic failures carrying a diagnostic.

use quillsync_events::PublishError;
use quillsync_storage::StorageError;
use uuid::Uuid;

/// Failure of one user's migration.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("Secondary revision store is not configured")]
    SecondaryStoreNotConfigured,

    #[error("Transition status store is not configured")]
    StatusStoreNotConfigured,

    #[error("Could not migrate revisions for user {user_uuid}: {source}")]
    Migration {
        user_uuid: Uuid,
        #[source]
        source: StorageError,
    },

    #[error("Integrity check failed for user {user_uuid}: {source}")]
    Integrity {
        user_uuid: Uuid,
        #[source]
        source: IntegrityError,
    },

    #[error("Could not empty secondary store for user {user_uuid}: {source}")]
    Cleanup {
        user_uuid: Uuid,
        #[source]
        source: StorageError,
    },
}

/// Diagnostic produced by the integrity checker.
#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    #[error(
        "Primary store holds {primary} revisions but secondary holds {secondary} for user {user_uuid}"
    )]
    CountMismatch {
        user_uuid: Uuid,
        primary: u64,
        secondary: u64,
    },

    #[error("Revision {revision_uuid} not found in primary database")]
    MissingInPrimary { revision_uuid: Uuid },

    #[error(
        "Revision {revision_uuid} differs between stores: primary={primary_json} secondary={secondary_json}"
    )]
    Divergent {
        revision_uuid: Uuid,
        primary_json: String,
        secondary_json: String,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failure of a scheduler sweep.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Could not enumerate users: {0}")]
    Storage(#[from] StorageError),

    #[error("Could not publish transition request: {0}")]
    Publish(#[from] PublishError),
}
