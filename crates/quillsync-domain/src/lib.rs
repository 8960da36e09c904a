//! # Quillsync Domain Model
//!
//! Core types shared by every Quillsync service crate: server-held items and
//! their client-submitted hashes, immutable revisions, users, shared-vault and
//! key-system associations, the transition lifecycle vocabulary, and the
//! microsecond time helpers the whole backend keys its timestamps on.
//!
//! All identifiers are 128-bit UUIDs. All machine timestamps are UTC
//! microseconds (`i64`); human-facing dates are `chrono::DateTime<Utc>` pairs
//! derived from them.

mod content_type;
mod item;
mod item_hash;
mod revision;
mod transition;
mod user;

pub mod time;

pub use content_type::{ContentType, UnknownContentType};
pub use item::{
    Dates, InvalidKeySystemIdentifier, Item, KeySystemAssociation, KeySystemIdentifier,
    SharedVaultAssociation, Timestamps,
};
pub use item_hash::ItemHash;
pub use revision::Revision;
pub use transition::{TransitionStatus, TransitionType};
pub use user::{TRANSITION_USER_ROLE, User};

pub use time::TimeError;
