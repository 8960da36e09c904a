//! # Quillsync Storage Abstractions
//!
//! Repository traits the sync and transition cores depend on, with pluggable
//! backends:
//! - InMemory: development and testing
//! - SQLite: single-instance production
//!
//! The transition engine reads revisions from two independent stores (primary
//! and secondary), so every backend is instantiable more than once; nothing in
//! this crate assumes a single global database.

mod error;
mod traits;

pub mod prelude;

pub use error::StorageError;
pub use traits::{
    ItemRepository, RevisionRepository, TransitionStatusRepository, UserRepository,
};

#[cfg(feature = "in-memory")]
pub mod in_memory;

#[cfg(feature = "in-memory")]
pub use in_memory::{
    InMemoryItemStore, InMemoryRevisionStore, InMemoryTransitionStatusStore, InMemoryUserStore,
};

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::{
    SqliteConfig, SqliteItemStore, SqliteRevisionStore, SqliteTransitionStatusStore,
    SqliteUserStore,
};
