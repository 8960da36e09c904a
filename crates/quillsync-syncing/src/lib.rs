//! # Quillsync Item Sync
//!
//! Ingests client-submitted item hashes for existing server items: validates
//! the payload, applies deterministic conflict and deletion rules, maintains
//! shared-vault and key-system associations, persists the result, and
//! publishes revision-creation and duplicate-sync events.

mod error;
mod update_existing_item;

pub use error::ItemSyncError;
pub use update_existing_item::{UpdateExistingItem, UpdateExistingItemInput};
