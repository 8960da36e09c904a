//! Windowed enumeration of users and transition request fan-out.

use quillsync_domain::time;
use quillsync_domain::{TRANSITION_USER_ROLE, TransitionStatus, TransitionType, User};
use quillsync_events::{DomainEvent, EventPublisher};
use quillsync_storage::{TransitionStatusRepository, UserRepository};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::SchedulerError;

/// Fixed page size for user enumeration.
pub const USER_PAGE_SIZE: u32 = 100;

/// Aggregate counts reported at the end of a sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    pub users_scanned: u64,
    pub items_requested: u64,
    pub revisions_requested: u64,
    pub users_skipped: u64,
}

/// Enumerates users created in a time window and requests transitions for
/// candidates.
///
/// Requesting deletes the existing status row first, which forces the next
/// migration attempt to start from fresh paging. That also makes the sweep
/// idempotent under retry: a re-request of the same user is safe.
pub struct TransitionScheduler {
    user_repository: Arc<dyn UserRepository>,
    status_store: Arc<dyn TransitionStatusRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl TransitionScheduler {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        status_store: Arc<dyn TransitionStatusRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            user_repository,
            status_store,
            publisher,
        }
    }

    /// Sweep users created inside `[start, end]` (UTC microseconds,
    /// inclusive) and request transitions for candidates.
    ///
    /// `force_run` additionally re-requests transitions that are still
    /// `InProgress`, for recovering stalled migrations.
    pub async fn run(
        &self,
        start: i64,
        end: i64,
        force_run: bool,
    ) -> Result<SchedulerReport, SchedulerError> {
        let total_users = self
            .user_repository
            .count_all_created_between(start, end)
            .await?;
        let total_pages = total_users.div_ceil(USER_PAGE_SIZE as u64);
        info!(
            "Sweeping {} users created between {} and {} ({} pages, force_run={})",
            total_users, start, end, total_pages, force_run
        );

        let mut report = SchedulerReport::default();
        for page in 1..=total_pages {
            let offset = (page - 1) * USER_PAGE_SIZE as u64;
            let users = self
                .user_repository
                .find_all_created_between(start, end, offset, USER_PAGE_SIZE)
                .await?;
            for user in users {
                self.consider_user(&user, force_run, &mut report).await?;
            }
        }

        info!(
            "Sweep finished: {} users scanned, {} item requests, {} revision requests, {} skipped",
            report.users_scanned,
            report.items_requested,
            report.revisions_requested,
            report.users_skipped
        );
        Ok(report)
    }

    async fn consider_user(
        &self,
        user: &User,
        force_run: bool,
        report: &mut SchedulerReport,
    ) -> Result<(), SchedulerError> {
        report.users_scanned += 1;

        let items_status = self
            .status_store
            .get_status(user.uuid, TransitionType::Items)
            .await?;
        let revisions_status = self
            .status_store
            .get_status(user.uuid, TransitionType::Revisions)
            .await?;

        let fully_verified = items_status == Some(TransitionStatus::Verified)
            && revisions_status == Some(TransitionStatus::Verified);
        if fully_verified && !user.has_role(TRANSITION_USER_ROLE) {
            debug!("User {} already fully verified, skipping", user.uuid);
            report.users_skipped += 1;
            return Ok(());
        }

        for (transition_type, status) in [
            (TransitionType::Items, items_status),
            (TransitionType::Revisions, revisions_status),
        ] {
            if !should_request(status, force_run) {
                continue;
            }
            self.request(user.uuid, transition_type).await?;
            match transition_type {
                TransitionType::Items => report.items_requested += 1,
                TransitionType::Revisions => report.revisions_requested += 1,
            }
        }

        Ok(())
    }

    async fn request(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
    ) -> Result<(), SchedulerError> {
        // Dropping the row resets paging before the migrator ever runs.
        self.status_store.remove(user_uuid, transition_type).await?;
        self.publisher
            .publish(DomainEvent::TransitionRequested {
                user_uuid,
                transition_type,
                timestamp: time::now_microseconds(),
            })
            .await?;
        debug!("Requested {} transition for user {}", transition_type, user_uuid);
        Ok(())
    }
}

fn should_request(status: Option<TransitionStatus>, force_run: bool) -> bool {
    match status {
        None => true,
        Some(TransitionStatus::Failed) => true,
        Some(TransitionStatus::InProgress) => force_run,
        Some(TransitionStatus::Verified) => false,
    }
}
