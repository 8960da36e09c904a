//! Convenience re-exports for repository consumers.

pub use crate::error::StorageError;
pub use crate::traits::{
    ItemRepository, RevisionRepository, TransitionStatusRepository, UserRepository,
};

#[cfg(feature = "in-memory")]
pub use crate::in_memory::{
    InMemoryItemStore, InMemoryRevisionStore, InMemoryTransitionStatusStore, InMemoryUserStore,
};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{
    SqliteConfig, SqliteItemStore, SqliteRevisionStore, SqliteTransitionStatusStore,
    SqliteUserStore, connect,
};
