//! Post-migration dual-store verification.

use quillsync_domain::{Revision, TransitionType};
use quillsync_storage::{RevisionRepository, TransitionStatusRepository};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::IntegrityError;
use crate::migrator::DEFAULT_PAGE_SIZE;

/// Compares record counts and per-record identity between the primary and
/// secondary revision stores for one user.
///
/// Verification pages from the persisted `integrity_progress` cursor; the
/// cursor is written before each fetch so an interrupted check resumes where
/// it stopped.
pub struct RevisionIntegrityChecker {
    primary_store: Arc<dyn RevisionRepository>,
    secondary_store: Arc<dyn RevisionRepository>,
    status_store: Arc<dyn TransitionStatusRepository>,
    page_size: u32,
}

impl RevisionIntegrityChecker {
    pub fn new(
        primary_store: Arc<dyn RevisionRepository>,
        secondary_store: Arc<dyn RevisionRepository>,
        status_store: Arc<dyn TransitionStatusRepository>,
    ) -> Self {
        Self {
            primary_store,
            secondary_store,
            status_store,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Verify one user's migrated history.
    ///
    /// A revision present in both stores is accepted when the primary copy is
    /// newer (`updated_at` strictly greater) or the copies are identical;
    /// anything else fails with both copies rendered as JSON.
    pub async fn check(&self, user_uuid: Uuid) -> Result<(), IntegrityError> {
        let primary_count = self.primary_store.count_by_user_uuid(user_uuid).await?;
        let secondary_count = self.secondary_store.count_by_user_uuid(user_uuid).await?;
        if primary_count < secondary_count {
            return Err(IntegrityError::CountMismatch {
                user_uuid,
                primary: primary_count,
                secondary: secondary_count,
            });
        }

        let total_pages = primary_count.div_ceil(self.page_size as u64) as u32;
        let initial_page = self
            .status_store
            .get_integrity_progress(user_uuid, TransitionType::Revisions)
            .await?;

        for page in initial_page..=total_pages {
            self.status_store
                .set_integrity_progress(user_uuid, TransitionType::Revisions, page)
                .await?;
            let offset = (page as u64 - 1) * self.page_size as u64;
            let revisions = self
                .secondary_store
                .find_by_user_uuid(user_uuid, offset, self.page_size)
                .await?;
            for revision in revisions {
                self.check_revision(user_uuid, &revision).await?;
            }
        }

        Ok(())
    }

    async fn check_revision(
        &self,
        user_uuid: Uuid,
        secondary: &Revision,
    ) -> Result<(), IntegrityError> {
        let primary = self
            .primary_store
            .find_one_by_uuid(secondary.uuid, user_uuid)
            .await?
            .ok_or(IntegrityError::MissingInPrimary {
                revision_uuid: secondary.uuid,
            })?;

        if primary.updated_at > secondary.updated_at {
            return Ok(());
        }
        if !primary.is_identical_to(secondary) {
            return Err(IntegrityError::Divergent {
                revision_uuid: secondary.uuid,
                primary_json: render(&primary),
                secondary_json: render(secondary),
            });
        }
        Ok(())
    }
}

fn render(revision: &Revision) -> String {
    serde_json::to_string(revision).unwrap_or_else(|_| format!("{revision:?}"))
}
