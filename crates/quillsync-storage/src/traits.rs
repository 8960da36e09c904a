//! Repository traits for the stores the core depends on.
//!
//! Implementations must be `Send + Sync` for use across async contexts and
//! must be independently durable per call: the transition engine persists its
//! paging cursors *before* each fetch and relies on that ordering to resume
//! after a crash.

use async_trait::async_trait;
use quillsync_domain::{Item, Revision, TransitionStatus, TransitionType, User};
use uuid::Uuid;

use crate::error::StorageError;

/// Store of immutable item revisions.
///
/// The transition engine instantiates this twice: once for the primary store
/// and once for the secondary store being drained.
#[async_trait]
pub trait RevisionRepository: Send + Sync {
    /// Human-readable name of the backing store (e.g. "in-memory", "sqlite").
    fn backend_name(&self) -> &'static str;

    /// Number of revisions held for a user.
    async fn count_by_user_uuid(&self, user_uuid: Uuid) -> Result<u64, StorageError>;

    /// Fetch one page of a user's revisions, ordered by `(created_at, uuid)`
    /// so that identical paging windows return identical slices across calls.
    async fn find_by_user_uuid(
        &self,
        user_uuid: Uuid,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Revision>, StorageError>;

    /// Look up a single revision by id, scoped to a user.
    async fn find_one_by_uuid(
        &self,
        revision_uuid: Uuid,
        user_uuid: Uuid,
    ) -> Result<Option<Revision>, StorageError>;

    /// Insert a revision. Returns `false` when a revision with the same id
    /// already exists and nothing was written.
    async fn insert(&self, revision: Revision) -> Result<bool, StorageError>;

    /// Remove a single revision by id, scoped to a user.
    async fn remove_one_by_uuid(
        &self,
        revision_uuid: Uuid,
        user_uuid: Uuid,
    ) -> Result<(), StorageError>;

    /// Remove every revision a user holds.
    async fn remove_by_user_uuid(&self, user_uuid: Uuid) -> Result<(), StorageError>;
}

/// Read-only view of users, windowed by creation time.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Number of users created inside `[start, end]` (UTC microseconds,
    /// inclusive).
    async fn count_all_created_between(&self, start: i64, end: i64) -> Result<u64, StorageError>;

    /// Fetch one page of users created inside `[start, end]`, ordered by
    /// `(created_at, uuid)`.
    async fn find_all_created_between(
        &self,
        start: i64,
        end: i64,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<User>, StorageError>;
}

/// Store of the latest server-held item state.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Upsert an item.
    async fn save(&self, item: &Item) -> Result<(), StorageError>;

    /// Look up an item by id, scoped to a user.
    async fn find_one_by_uuid(
        &self,
        item_uuid: Uuid,
        user_uuid: Uuid,
    ) -> Result<Option<Item>, StorageError>;
}

/// Durable mapping of `(user, transition type)` to migration lifecycle state.
///
/// Progress getters default to page 1 when no row exists; `remove` clears the
/// status and both progress counters atomically, which is what makes a forced
/// re-request start from a clean slate.
#[async_trait]
pub trait TransitionStatusRepository: Send + Sync {
    async fn get_status(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
    ) -> Result<Option<TransitionStatus>, StorageError>;

    /// Record a status together with the microsecond timestamp of the
    /// publishing event.
    async fn set_status(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
        status: TransitionStatus,
        timestamp: i64,
    ) -> Result<(), StorageError>;

    /// Next migration page to process. Defaults to 1.
    async fn get_paging_progress(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
    ) -> Result<u32, StorageError>;

    async fn set_paging_progress(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
        progress: u32,
    ) -> Result<(), StorageError>;

    /// Next verification page to process. Defaults to 1.
    async fn get_integrity_progress(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
    ) -> Result<u32, StorageError>;

    async fn set_integrity_progress(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
        progress: u32,
    ) -> Result<(), StorageError>;

    /// Atomically clear the status and both progress counters.
    async fn remove(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
    ) -> Result<(), StorageError>;
}
