//! # Quillsync Transition Engine
//!
//! Migrates a user's revision history from a secondary store into the primary
//! store with durable, resumable progress and dual-store integrity
//! verification.
//!
//! The engine has three moving parts:
//! - [`TransitionScheduler`] enumerates users created in a time window and
//!   publishes `TransitionRequested` events for candidates.
//! - [`RevisionMigrator`] executes the staged migration state machine for one
//!   user, publishing `TransitionStatusUpdated` events as it goes:
//!   `InProgress` (with keep-alives at 10% boundaries), then `Verified` or
//!   `Failed`.
//! - [`RevisionIntegrityChecker`] compares record counts and per-record
//!   identity between the stores after migration.
//!
//! Progress cursors are written to the status store *before* the reads they
//! gate, so a crashed or cancelled migration resumes at the page it was on.

mod error;
mod handlers;
mod integrity;
mod migrator;
mod scheduler;

pub mod state_machine;

pub use error::{IntegrityError, SchedulerError, TransitionError};
pub use handlers::{TransitionRequestedHandler, TransitionStatusUpdatedHandler};
pub use integrity::RevisionIntegrityChecker;
pub use migrator::{DEFAULT_PAGE_SIZE, REPLICATION_CATCHUP, RevisionMigrator};
pub use scheduler::{SchedulerReport, TransitionScheduler, USER_PAGE_SIZE};
