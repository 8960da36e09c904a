//! Validation and persistence errors for item updates.
//!
//! Validation is ordered; the first failure is returned to the caller as a
//! human-readable message and nothing is mutated.

use quillsync_domain::TimeError;
use quillsync_events::PublishError;
use quillsync_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ItemSyncError {
    #[error("Could not update item: invalid session identifier: {0}")]
    InvalidSessionUuid(String),

    #[error("Could not update item: invalid performing user identifier: {0}")]
    InvalidUserUuid(String),

    #[error("Could not update item: unknown content type: {0}")]
    UnknownContentType(String),

    #[error("Could not update item: invalid duplicate identifier: {0}")]
    InvalidDuplicateUuid(String),

    #[error("Could not update item: no creation time in hash for item {0}")]
    MissingCreationTime(String),

    #[error("Could not update item: invalid shared vault identifier: {0}")]
    InvalidSharedVaultUuid(String),

    #[error("Could not update item: invalid key system identifier: {0}")]
    InvalidKeySystemIdentifier(String),

    #[error("Could not update item: {0}")]
    Time(#[from] TimeError),

    #[error("Could not persist item: {0}")]
    Storage(#[from] StorageError),

    #[error("Could not publish sync event: {0}")]
    Publish(#[from] PublishError),
}
