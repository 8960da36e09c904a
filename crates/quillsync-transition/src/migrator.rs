//! Per-user revision migration state machine.

use quillsync_domain::time;
use quillsync_domain::{Revision, TransitionStatus, TransitionType};
use quillsync_events::{DomainEvent, EventPublisher};
use quillsync_storage::{RevisionRepository, StorageError, TransitionStatusRepository};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::error::TransitionError;
use crate::integrity::RevisionIntegrityChecker;

/// Default migration page size.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Pause granted to the primary store's replicas after writes.
///
/// The underlying store is eventually consistent; reads that follow a delete
/// or the bulk migration must wait this long before they can be trusted.
pub const REPLICATION_CATCHUP: Duration = Duration::from_millis(2000);

/// Migrates one user's revisions from the secondary store into the primary
/// store.
///
/// Lifecycle: `NotStarted -> InProgress -> (Verified | Failed)`, with `Failed`
/// re-entrant on the next attempt. Status changes are published as
/// `TransitionStatusUpdated` events rather than written directly; paging and
/// integrity cursors are persisted to the status store before the reads they
/// gate, which is what makes a crashed or cancelled run resumable.
///
/// The secondary and status stores are optional at construction: a deployment
/// without them fails immediately with a configuration error instead of a
/// user-level failure.
pub struct RevisionMigrator {
    primary_store: Arc<dyn RevisionRepository>,
    secondary_store: Option<Arc<dyn RevisionRepository>>,
    status_store: Option<Arc<dyn TransitionStatusRepository>>,
    publisher: Arc<dyn EventPublisher>,
    page_size: u32,
}

impl RevisionMigrator {
    pub fn new(
        primary_store: Arc<dyn RevisionRepository>,
        secondary_store: Option<Arc<dyn RevisionRepository>>,
        status_store: Option<Arc<dyn TransitionStatusRepository>>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            primary_store,
            secondary_store,
            status_store,
            publisher,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Run the migration for one user.
    ///
    /// An empty secondary store short-circuits straight to `Verified`: the
    /// user was either migrated before (and the secondary cleaned) or has
    /// nothing to migrate. Re-running a `Verified` migration is therefore a
    /// no-op beyond the `Verified` re-publish.
    pub async fn execute(&self, user_uuid: uuid::Uuid) -> Result<(), TransitionError> {
        let secondary_store = self
            .secondary_store
            .as_ref()
            .ok_or(TransitionError::SecondaryStoreNotConfigured)?;
        let status_store = self
            .status_store
            .as_ref()
            .ok_or(TransitionError::StatusStoreNotConfigured)?;

        let secondary_count = secondary_store
            .count_by_user_uuid(user_uuid)
            .await
            .map_err(|source| TransitionError::Migration { user_uuid, source })?;
        if secondary_count == 0 {
            debug!("No revisions in secondary store for user {}", user_uuid);
            self.publish_status(user_uuid, TransitionStatus::Verified)
                .await;
            return Ok(());
        }

        self.publish_status(user_uuid, TransitionStatus::InProgress)
            .await;
        let started_at = time::now_microseconds();

        if let Err(source) = self
            .migrate_pages(
                user_uuid,
                secondary_store.as_ref(),
                status_store.as_ref(),
                secondary_count,
            )
            .await
        {
            error!("Migration failed for user {}: {}", user_uuid, source);
            self.publish_status(user_uuid, TransitionStatus::Failed)
                .await;
            return Err(TransitionError::Migration { user_uuid, source });
        }

        sleep(REPLICATION_CATCHUP).await;

        let checker = RevisionIntegrityChecker::new(
            Arc::clone(&self.primary_store),
            Arc::clone(secondary_store),
            Arc::clone(status_store),
        )
        .with_page_size(self.page_size);
        if let Err(source) = checker.check(user_uuid).await {
            warn!("Integrity check failed for user {}: {}", user_uuid, source);
            // Counters reset before the Failed publish: a crash in between
            // must leave the next attempt starting from page 1.
            self.reset_progress(user_uuid, status_store.as_ref()).await;
            self.publish_status(user_uuid, TransitionStatus::Failed)
                .await;
            return Err(TransitionError::Integrity { user_uuid, source });
        }

        if let Err(source) = secondary_store.remove_by_user_uuid(user_uuid).await {
            error!(
                "Could not empty secondary store for user {}: {}",
                user_uuid, source
            );
            self.publish_status(user_uuid, TransitionStatus::Failed)
                .await;
            return Err(TransitionError::Cleanup { user_uuid, source });
        }

        self.publish_status(user_uuid, TransitionStatus::Verified)
            .await;
        info!(
            "Transitioned {} revisions for user {} in {} microseconds",
            secondary_count,
            user_uuid,
            time::now_microseconds() - started_at
        );
        Ok(())
    }

    async fn migrate_pages(
        &self,
        user_uuid: uuid::Uuid,
        secondary_store: &dyn RevisionRepository,
        status_store: &dyn TransitionStatusRepository,
        secondary_count: u64,
    ) -> Result<(), StorageError> {
        let total_pages = secondary_count.div_ceil(self.page_size as u64) as u32;
        let initial_page = status_store
            .get_paging_progress(user_uuid, TransitionType::Revisions)
            .await?;

        for page in initial_page..=total_pages {
            let percentage = page * 100 / total_pages;
            if percentage % 10 == 0 {
                debug!(
                    "Migration for user {} at {}% ({}/{} pages)",
                    user_uuid, percentage, page, total_pages
                );
                self.publish_status(user_uuid, TransitionStatus::InProgress)
                    .await;
            }

            // Cursor first, fetch second: a crash here resumes at this page.
            status_store
                .set_paging_progress(user_uuid, TransitionType::Revisions, page)
                .await?;

            let offset = (page as u64 - 1) * self.page_size as u64;
            let revisions = secondary_store
                .find_by_user_uuid(user_uuid, offset, self.page_size)
                .await?;
            for revision in revisions {
                let revision_uuid = revision.uuid;
                if let Err(err) = self.migrate_revision(revision).await {
                    warn!(
                        "Skipping revision {} for user {}: {}",
                        revision_uuid, user_uuid, err
                    );
                }
            }
        }

        Ok(())
    }

    async fn migrate_revision(&self, revision: Revision) -> Result<(), StorageError> {
        let existing = self
            .primary_store
            .find_one_by_uuid(revision.uuid, revision.user_uuid)
            .await?;
        match existing {
            Some(primary) if primary.updated_at > revision.updated_at => {
                debug!("Primary copy of revision {} is newer, skipping", revision.uuid);
            }
            Some(primary) if primary.is_identical_to(&revision) => {
                debug!("Revision {} already present in primary store", revision.uuid);
            }
            Some(_) => {
                self.primary_store
                    .remove_one_by_uuid(revision.uuid, revision.user_uuid)
                    .await?;
                sleep(REPLICATION_CATCHUP).await;
                self.primary_store.insert(revision).await?;
            }
            None => {
                self.primary_store.insert(revision).await?;
            }
        }
        Ok(())
    }

    async fn reset_progress(
        &self,
        user_uuid: uuid::Uuid,
        status_store: &dyn TransitionStatusRepository,
    ) {
        if let Err(err) = status_store
            .set_paging_progress(user_uuid, TransitionType::Revisions, 1)
            .await
        {
            error!(
                "Could not reset paging progress for user {}: {}",
                user_uuid, err
            );
        }
        if let Err(err) = status_store
            .set_integrity_progress(user_uuid, TransitionType::Revisions, 1)
            .await
        {
            error!(
                "Could not reset integrity progress for user {}: {}",
                user_uuid, err
            );
        }
    }

    async fn publish_status(&self, user_uuid: uuid::Uuid, status: TransitionStatus) {
        let event = DomainEvent::TransitionStatusUpdated {
            user_uuid,
            status,
            transition_type: TransitionType::Revisions,
            transition_timestamp: time::now_microseconds(),
        };
        if let Err(err) = self.publisher.publish(event).await {
            warn!(
                "Could not publish {} status for user {}: {}",
                status, user_uuid, err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quillsync_events::CapturingEventPublisher;
    use quillsync_storage::in_memory::{InMemoryRevisionStore, InMemoryTransitionStatusStore};
    use tokio::sync::RwLock;
    use uuid::Uuid;

    fn revision(user_uuid: Uuid, created_at: i64, updated_at: i64) -> Revision {
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
            updated_at,
        }
    }

    struct Harness {
        primary: InMemoryRevisionStore,
        secondary: InMemoryRevisionStore,
        statuses: InMemoryTransitionStatusStore,
        publisher: CapturingEventPublisher,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                primary: InMemoryRevisionStore::new(),
                secondary: InMemoryRevisionStore::new(),
                statuses: InMemoryTransitionStatusStore::new(),
                publisher: CapturingEventPublisher::new(),
            }
        }

        fn migrator(&self, page_size: u32) -> RevisionMigrator {
            RevisionMigrator::new(
                Arc::new(self.primary.clone()),
                Some(Arc::new(self.secondary.clone())),
                Some(Arc::new(self.statuses.clone())),
                Arc::new(self.publisher.clone()),
            )
            .with_page_size(page_size)
        }

        async fn statuses_published(&self) -> Vec<TransitionStatus> {
            self.publisher
                .events()
                .await
                .into_iter()
                .filter_map(|event| match event {
                    DomainEvent::TransitionStatusUpdated { status, .. } => Some(status),
                    _ => None,
                })
                .collect()
        }
    }

    /// Records the offsets the migrator fetched with, wrapping a real store.
    #[derive(Clone)]
    struct OffsetRecordingStore {
        inner: InMemoryRevisionStore,
        offsets: Arc<RwLock<Vec<u64>>>,
    }

    #[async_trait]
    impl RevisionRepository for OffsetRecordingStore {
        fn backend_name(&self) -> &'static str {
            "offset-recording"
        }

        async fn count_by_user_uuid(&self, user_uuid: Uuid) -> Result<u64, StorageError> {
            self.inner.count_by_user_uuid(user_uuid).await
        }

        async fn find_by_user_uuid(
            &self,
            user_uuid: Uuid,
            offset: u64,
            limit: u32,
        ) -> Result<Vec<Revision>, StorageError> {
            self.offsets.write().await.push(offset);
            self.inner.find_by_user_uuid(user_uuid, offset, limit).await
        }

        async fn find_one_by_uuid(
            &self,
            revision_uuid: Uuid,
            user_uuid: Uuid,
        ) -> Result<Option<Revision>, StorageError> {
            self.inner.find_one_by_uuid(revision_uuid, user_uuid).await
        }

        async fn insert(&self, revision: Revision) -> Result<bool, StorageError> {
            self.inner.insert(revision).await
        }

        async fn remove_one_by_uuid(
            &self,
            revision_uuid: Uuid,
            user_uuid: Uuid,
        ) -> Result<(), StorageError> {
            self.inner.remove_one_by_uuid(revision_uuid, user_uuid).await
        }

        async fn remove_by_user_uuid(&self, user_uuid: Uuid) -> Result<(), StorageError> {
            self.inner.remove_by_user_uuid(user_uuid).await
        }
    }

    /// Primary store that silently loses inserts for one revision id.
    #[derive(Clone)]
    struct LossyPrimaryStore {
        inner: InMemoryRevisionStore,
        lost: Uuid,
    }

    #[async_trait]
    impl RevisionRepository for LossyPrimaryStore {
        fn backend_name(&self) -> &'static str {
            "lossy"
        }

        async fn count_by_user_uuid(&self, user_uuid: Uuid) -> Result<u64, StorageError> {
            self.inner.count_by_user_uuid(user_uuid).await
        }

        async fn find_by_user_uuid(
            &self,
            user_uuid: Uuid,
            offset: u64,
            limit: u32,
        ) -> Result<Vec<Revision>, StorageError> {
            self.inner.find_by_user_uuid(user_uuid, offset, limit).await
        }

        async fn find_one_by_uuid(
            &self,
            revision_uuid: Uuid,
            user_uuid: Uuid,
        ) -> Result<Option<Revision>, StorageError> {
            self.inner.find_one_by_uuid(revision_uuid, user_uuid).await
        }

        async fn insert(&self, revision: Revision) -> Result<bool, StorageError> {
            if revision.uuid == self.lost {
                return Ok(true);
            }
            self.inner.insert(revision).await
        }

        async fn remove_one_by_uuid(
            &self,
            revision_uuid: Uuid,
            user_uuid: Uuid,
        ) -> Result<(), StorageError> {
            self.inner.remove_one_by_uuid(revision_uuid, user_uuid).await
        }

        async fn remove_by_user_uuid(&self, user_uuid: Uuid) -> Result<(), StorageError> {
            self.inner.remove_by_user_uuid(user_uuid).await
        }
    }

    /// Secondary store whose bulk cleanup always fails.
    #[derive(Clone)]
    struct StuckSecondaryStore {
        inner: InMemoryRevisionStore,
    }

    #[async_trait]
    impl RevisionRepository for StuckSecondaryStore {
        fn backend_name(&self) -> &'static str {
            "stuck"
        }

        async fn count_by_user_uuid(&self, user_uuid: Uuid) -> Result<u64, StorageError> {
            self.inner.count_by_user_uuid(user_uuid).await
        }

        async fn find_by_user_uuid(
            &self,
            user_uuid: Uuid,
            offset: u64,
            limit: u32,
        ) -> Result<Vec<Revision>, StorageError> {
            self.inner.find_by_user_uuid(user_uuid, offset, limit).await
        }

        async fn find_one_by_uuid(
            &self,
            revision_uuid: Uuid,
            user_uuid: Uuid,
        ) -> Result<Option<Revision>, StorageError> {
            self.inner.find_one_by_uuid(revision_uuid, user_uuid).await
        }

        async fn insert(&self, revision: Revision) -> Result<bool, StorageError> {
            self.inner.insert(revision).await
        }

        async fn remove_one_by_uuid(
            &self,
            revision_uuid: Uuid,
            user_uuid: Uuid,
        ) -> Result<(), StorageError> {
            self.inner.remove_one_by_uuid(revision_uuid, user_uuid).await
        }

        async fn remove_by_user_uuid(&self, _user_uuid: Uuid) -> Result<(), StorageError> {
            Err(StorageError::Database("table locked".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_migration_moves_everything_and_verifies() {
        let harness = Harness::new();
        let user_uuid = Uuid::new_v4();
        for index in 0..12 {
            harness
                .secondary
                .insert(revision(user_uuid, index, index))
                .await
                .unwrap();
        }

        harness.migrator(5).execute(user_uuid).await.unwrap();

        assert_eq!(harness.primary.count_by_user_uuid(user_uuid).await.unwrap(), 12);
        assert_eq!(harness.secondary.count_by_user_uuid(user_uuid).await.unwrap(), 0);
        assert_eq!(
            harness
                .statuses
                .get_paging_progress(user_uuid, TransitionType::Revisions)
                .await
                .unwrap(),
            3
        );

        let statuses = harness.statuses_published().await;
        assert_eq!(statuses.first(), Some(&TransitionStatus::InProgress));
        assert_eq!(statuses.last(), Some(&TransitionStatus::Verified));
        assert!(
            statuses[..statuses.len() - 1]
                .iter()
                .all(|status| *status == TransitionStatus::InProgress)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn resume_skips_already_migrated_pages() {
        let statuses = InMemoryTransitionStatusStore::new();
        let publisher = CapturingEventPublisher::new();
        let primary = InMemoryRevisionStore::new();
        let offsets = Arc::new(RwLock::new(Vec::new()));
        let secondary = OffsetRecordingStore {
            inner: InMemoryRevisionStore::new(),
            offsets: Arc::clone(&offsets),
        };

        let user_uuid = Uuid::new_v4();
        let mut first_page = Vec::new();
        for index in 0..12 {
            let rev = revision(user_uuid, index, index);
            if index < 5 {
                first_page.push(rev.clone());
            }
            secondary.inner.insert(rev).await.unwrap();
        }
        // Page 1 was migrated by a previous attempt that crashed on page 2.
        for rev in first_page {
            primary.insert(rev).await.unwrap();
        }
        statuses
            .set_paging_progress(user_uuid, TransitionType::Revisions, 2)
            .await
            .unwrap();

        let migrator = RevisionMigrator::new(
            Arc::new(primary.clone()),
            Some(Arc::new(secondary.clone())),
            Some(Arc::new(statuses.clone())),
            Arc::new(publisher.clone()),
        )
        .with_page_size(5);
        migrator.execute(user_uuid).await.unwrap();

        assert_eq!(primary.count_by_user_uuid(user_uuid).await.unwrap(), 12);
        assert_eq!(secondary.count_by_user_uuid(user_uuid).await.unwrap(), 0);
        // Migration fetched pages 2 and 3 only; later offsets belong to the
        // integrity pass, which pages from its own cursor at 1.
        assert_eq!(offsets.read().await[..2], [5, 10]);
    }

    #[tokio::test(start_paused = true)]
    async fn conflicting_revision_is_replaced_by_secondary_copy() {
        let harness = Harness::new();
        let user_uuid = Uuid::new_v4();
        let mut stale = revision(user_uuid, 1, 100);
        let fresh = {
            let mut fresh = stale.clone();
            fresh.updated_at = 200;
            fresh.content = Some("rewritten".to_string());
            fresh
        };
        stale.content = Some("stale".to_string());
        harness.primary.insert(stale).await.unwrap();
        harness.secondary.insert(fresh.clone()).await.unwrap();

        harness.migrator(5).execute(user_uuid).await.unwrap();

        let migrated = harness
            .primary
            .find_one_by_uuid(fresh.uuid, user_uuid)
            .await
            .unwrap()
            .unwrap();
        assert!(migrated.is_identical_to(&fresh));
        assert_eq!(
            harness.statuses_published().await.last(),
            Some(&TransitionStatus::Verified)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn newer_primary_copy_survives_migration() {
        let harness = Harness::new();
        let user_uuid = Uuid::new_v4();
        let secondary_copy = revision(user_uuid, 1, 100);
        let mut primary_copy = secondary_copy.clone();
        primary_copy.updated_at = 300;
        primary_copy.content = Some("authoritative".to_string());
        harness.primary.insert(primary_copy.clone()).await.unwrap();
        harness.secondary.insert(secondary_copy).await.unwrap();

        harness.migrator(5).execute(user_uuid).await.unwrap();

        let kept = harness
            .primary
            .find_one_by_uuid(primary_copy.uuid, user_uuid)
            .await
            .unwrap()
            .unwrap();
        assert!(kept.is_identical_to(&primary_copy));
    }

    #[tokio::test(start_paused = true)]
    async fn integrity_failure_resets_progress_and_publishes_failed() {
        let statuses = InMemoryTransitionStatusStore::new();
        let publisher = CapturingEventPublisher::new();
        let secondary = InMemoryRevisionStore::new();
        let user_uuid = Uuid::new_v4();
        let mut lost_uuid = Uuid::nil();
        for index in 0..12 {
            let rev = revision(user_uuid, index, index);
            if index == 7 {
                lost_uuid = rev.uuid;
            }
            secondary.insert(rev).await.unwrap();
        }
        let primary = LossyPrimaryStore {
            inner: InMemoryRevisionStore::new(),
            lost: lost_uuid,
        };
        // A primary-only leftover keeps the counts balanced once one insert
        // is lost, so the per-revision lookup is what detects the hole.
        primary
            .inner
            .insert(revision(user_uuid, 99, 99))
            .await
            .unwrap();

        let migrator = RevisionMigrator::new(
            Arc::new(primary),
            Some(Arc::new(secondary.clone())),
            Some(Arc::new(statuses.clone())),
            Arc::new(publisher.clone()),
        )
        .with_page_size(5);
        let err = migrator.execute(user_uuid).await.unwrap_err();

        assert!(
            err.to_string()
                .contains(&format!("Revision {} not found in primary database", lost_uuid))
        );
        assert_eq!(
            statuses
                .get_paging_progress(user_uuid, TransitionType::Revisions)
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            statuses
                .get_integrity_progress(user_uuid, TransitionType::Revisions)
                .await
                .unwrap(),
            1
        );
        // Secondary is left intact for the retry.
        assert_eq!(secondary.count_by_user_uuid(user_uuid).await.unwrap(), 12);

        let events = publisher.events().await;
        let last = events.last().unwrap();
        assert!(matches!(
            last,
            DomainEvent::TransitionStatusUpdated {
                status: TransitionStatus::Failed,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_failure_still_marks_failed() {
        let statuses = InMemoryTransitionStatusStore::new();
        let publisher = CapturingEventPublisher::new();
        let primary = InMemoryRevisionStore::new();
        let secondary = StuckSecondaryStore {
            inner: InMemoryRevisionStore::new(),
        };
        let user_uuid = Uuid::new_v4();
        for index in 0..3 {
            secondary
                .inner
                .insert(revision(user_uuid, index, index))
                .await
                .unwrap();
        }

        let migrator = RevisionMigrator::new(
            Arc::new(primary.clone()),
            Some(Arc::new(secondary)),
            Some(Arc::new(statuses)),
            Arc::new(publisher.clone()),
        )
        .with_page_size(5);
        let err = migrator.execute(user_uuid).await.unwrap_err();

        assert!(matches!(err, TransitionError::Cleanup { .. }));
        // Everything migrated and verified, yet the run reports Failed.
        assert_eq!(primary.count_by_user_uuid(user_uuid).await.unwrap(), 3);
        let events = publisher.events().await;
        assert!(matches!(
            events.last().unwrap(),
            DomainEvent::TransitionStatusUpdated {
                status: TransitionStatus::Failed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn empty_secondary_short_circuits_to_verified() {
        let harness = Harness::new();
        let user_uuid = Uuid::new_v4();

        harness.migrator(5).execute(user_uuid).await.unwrap();

        assert_eq!(
            harness.statuses_published().await,
            vec![TransitionStatus::Verified]
        );
        assert_eq!(
            harness
                .statuses
                .get_paging_progress(user_uuid, TransitionType::Revisions)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn rerunning_a_verified_migration_is_a_no_op() {
        let harness = Harness::new();
        let user_uuid = Uuid::new_v4();
        for index in 0..4 {
            harness
                .secondary
                .insert(revision(user_uuid, index, index))
                .await
                .unwrap();
        }

        let migrator = harness.migrator(5);
        migrator.execute(user_uuid).await.unwrap();
        let count_after_first = harness.primary.count_by_user_uuid(user_uuid).await.unwrap();

        migrator.execute(user_uuid).await.unwrap();

        assert_eq!(
            harness.primary.count_by_user_uuid(user_uuid).await.unwrap(),
            count_after_first
        );
        assert_eq!(
            harness.statuses_published().await.last(),
            Some(&TransitionStatus::Verified)
        );
    }

    #[tokio::test]
    async fn missing_secondary_store_is_a_configuration_error() {
        let publisher = CapturingEventPublisher::new();
        let migrator = RevisionMigrator::new(
            Arc::new(InMemoryRevisionStore::new()),
            None,
            Some(Arc::new(InMemoryTransitionStatusStore::new())),
            Arc::new(publisher.clone()),
        );

        let err = migrator.execute(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, TransitionError::SecondaryStoreNotConfigured));
        assert!(publisher.events().await.is_empty());
    }

    #[tokio::test]
    async fn missing_status_store_is_a_configuration_error() {
        let publisher = CapturingEventPublisher::new();
        let migrator = RevisionMigrator::new(
            Arc::new(InMemoryRevisionStore::new()),
            Some(Arc::new(InMemoryRevisionStore::new())),
            None,
            Arc::new(publisher.clone()),
        );

        let err = migrator.execute(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, TransitionError::StatusStoreNotConfigured));
        assert!(publisher.events().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn single_page_when_page_size_exceeds_count() {
        let harness = Harness::new();
        let user_uuid = Uuid::new_v4();
        for index in 0..3 {
            harness
                .secondary
                .insert(revision(user_uuid, index, index))
                .await
                .unwrap();
        }

        harness.migrator(100).execute(user_uuid).await.unwrap();

        assert_eq!(harness.primary.count_by_user_uuid(user_uuid).await.unwrap(), 3);
        assert_eq!(
            harness
                .statuses
                .get_paging_progress(user_uuid, TransitionType::Revisions)
                .await
                .unwrap(),
            1
        );
    }
}
