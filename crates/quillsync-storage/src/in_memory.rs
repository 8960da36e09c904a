//! In-memory repository backends.
//!
//! Suitable for development, testing, and single-instance demos. State lives
//! in `HashMap`s behind `tokio::sync::RwLock`; paging queries sort by
//! `(created_at, uuid)` so repeated windows return stable slices.

use async_trait::async_trait;
use quillsync_domain::{Item, Revision, TransitionStatus, TransitionType, User};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StorageError;
use crate::traits::{
    ItemRepository, RevisionRepository, TransitionStatusRepository, UserRepository,
};

/// In-memory revision store.
#[derive(Clone, Default)]
pub struct InMemoryRevisionStore {
    revisions: Arc<RwLock<HashMap<Uuid, Vec<Revision>>>>,
}

impl InMemoryRevisionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn page(revisions: &[Revision], offset: u64, limit: u32) -> Vec<Revision> {
        let mut ordered: Vec<Revision> = revisions.to_vec();
        ordered.sort_by(|a, b| (a.created_at, a.uuid).cmp(&(b.created_at, b.uuid)));
        ordered
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect()
    }
}

#[async_trait]
impl RevisionRepository for InMemoryRevisionStore {
    fn backend_name(&self) -> &'static str {
        "in-memory"
    }

    async fn count_by_user_uuid(&self, user_uuid: Uuid) -> Result<u64, StorageError> {
        let revisions = self.revisions.read().await;
        Ok(revisions.get(&user_uuid).map_or(0, |held| held.len() as u64))
    }

    async fn find_by_user_uuid(
        &self,
        user_uuid: Uuid,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Revision>, StorageError> {
        let revisions = self.revisions.read().await;
        Ok(revisions
            .get(&user_uuid)
            .map_or_else(Vec::new, |held| Self::page(held, offset, limit)))
    }

    async fn find_one_by_uuid(
        &self,
        revision_uuid: Uuid,
        user_uuid: Uuid,
    ) -> Result<Option<Revision>, StorageError> {
        let revisions = self.revisions.read().await;
        Ok(revisions
            .get(&user_uuid)
            .and_then(|held| held.iter().find(|r| r.uuid == revision_uuid).cloned()))
    }

    async fn insert(&self, revision: Revision) -> Result<bool, StorageError> {
        let mut revisions = self.revisions.write().await;
        let held = revisions.entry(revision.user_uuid).or_default();
        if held.iter().any(|r| r.uuid == revision.uuid) {
            return Ok(false);
        }
        held.push(revision);
        Ok(true)
    }

    async fn remove_one_by_uuid(
        &self,
        revision_uuid: Uuid,
        user_uuid: Uuid,
    ) -> Result<(), StorageError> {
        let mut revisions = self.revisions.write().await;
        if let Some(held) = revisions.get_mut(&user_uuid) {
            held.retain(|r| r.uuid != revision_uuid);
        }
        Ok(())
    }

    async fn remove_by_user_uuid(&self, user_uuid: Uuid) -> Result<(), StorageError> {
        let mut revisions = self.revisions.write().await;
        revisions.remove(&user_uuid);
        Ok(())
    }
}

/// In-memory user store. Users are seeded through [`InMemoryUserStore::add`].
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, user: User) {
        self.users.write().await.push(user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn count_all_created_between(&self, start: i64, end: i64) -> Result<u64, StorageError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|user| user.created_at >= start && user.created_at <= end)
            .count() as u64)
    }

    async fn find_all_created_between(
        &self,
        start: i64,
        end: i64,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<User>, StorageError> {
        let users = self.users.read().await;
        let mut window: Vec<User> = users
            .iter()
            .filter(|user| user.created_at >= start && user.created_at <= end)
            .cloned()
            .collect();
        window.sort_by(|a, b| (a.created_at, a.uuid).cmp(&(b.created_at, b.uuid)));
        Ok(window
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

/// In-memory item store.
#[derive(Clone, Default)]
pub struct InMemoryItemStore {
    items: Arc<RwLock<HashMap<(Uuid, Uuid), Item>>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemStore {
    async fn save(&self, item: &Item) -> Result<(), StorageError> {
        let mut items = self.items.write().await;
        items.insert((item.user_uuid, item.uuid), item.clone());
        Ok(())
    }

    async fn find_one_by_uuid(
        &self,
        item_uuid: Uuid,
        user_uuid: Uuid,
    ) -> Result<Option<Item>, StorageError> {
        let items = self.items.read().await;
        Ok(items.get(&(user_uuid, item_uuid)).cloned())
    }
}

#[derive(Debug, Clone)]
struct StatusRow {
    status: Option<TransitionStatus>,
    status_updated_at: Option<i64>,
    paging_progress: u32,
    integrity_progress: u32,
}

impl Default for StatusRow {
    fn default() -> Self {
        Self {
            status: None,
            status_updated_at: None,
            paging_progress: 1,
            integrity_progress: 1,
        }
    }
}

/// In-memory transition status store.
#[derive(Clone, Default)]
pub struct InMemoryTransitionStatusStore {
    rows: Arc<RwLock<HashMap<(Uuid, TransitionType), StatusRow>>>,
}

impl InMemoryTransitionStatusStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransitionStatusRepository for InMemoryTransitionStatusStore {
    async fn get_status(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
    ) -> Result<Option<TransitionStatus>, StorageError> {
        let rows = self.rows.read().await;
        Ok(rows
            .get(&(user_uuid, transition_type))
            .and_then(|row| row.status))
    }

    async fn set_status(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
        status: TransitionStatus,
        timestamp: i64,
    ) -> Result<(), StorageError> {
        let mut rows = self.rows.write().await;
        let row = rows.entry((user_uuid, transition_type)).or_default();
        row.status = Some(status);
        row.status_updated_at = Some(timestamp);
        Ok(())
    }

    async fn get_paging_progress(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
    ) -> Result<u32, StorageError> {
        let rows = self.rows.read().await;
        Ok(rows
            .get(&(user_uuid, transition_type))
            .map_or(1, |row| row.paging_progress))
    }

    async fn set_paging_progress(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
        progress: u32,
    ) -> Result<(), StorageError> {
        let mut rows = self.rows.write().await;
        rows.entry((user_uuid, transition_type))
            .or_default()
            .paging_progress = progress;
        Ok(())
    }

    async fn get_integrity_progress(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
    ) -> Result<u32, StorageError> {
        let rows = self.rows.read().await;
        Ok(rows
            .get(&(user_uuid, transition_type))
            .map_or(1, |row| row.integrity_progress))
    }

    async fn set_integrity_progress(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
        progress: u32,
    ) -> Result<(), StorageError> {
        let mut rows = self.rows.write().await;
        rows.entry((user_uuid, transition_type))
            .or_default()
            .integrity_progress = progress;
        Ok(())
    }

    async fn remove(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
    ) -> Result<(), StorageError> {
        let mut rows = self.rows.write().await;
        rows.remove(&(user_uuid, transition_type));
        Ok(())
    }
}
