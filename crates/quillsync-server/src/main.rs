//! Item sync server binary.
//!
//! Serves `PUT /v1/items/{uuid}`. Persists to SQLite when
//! `QUILLSYNC_DATABASE` is set, otherwise runs on in-memory storage for
//! development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quillsync_events::InProcessEventBus;
use quillsync_server::{ItemSyncServer, ServerConfig};
use quillsync_storage::in_memory::InMemoryItemStore;
use quillsync_storage::sqlite::{self, SqliteConfig, SqliteItemStore};
use quillsync_storage::ItemRepository;
use quillsync_syncing::UpdateExistingItem;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut config = ServerConfig::default();
    if let Ok(raw) = std::env::var("QUILLSYNC_BIND") {
        config.bind_address = raw.parse::<SocketAddr>()?;
    }

    let item_repository: Arc<dyn ItemRepository> = match std::env::var("QUILLSYNC_DATABASE") {
        Ok(path) => {
            let pool = sqlite::connect(&SqliteConfig {
                database_path: PathBuf::from(path),
                ..SqliteConfig::default()
            })
            .await?;
            Arc::new(SqliteItemStore::new(pool).await?)
        }
        Err(_) => {
            info!("QUILLSYNC_DATABASE not set, using in-memory item storage");
            Arc::new(InMemoryItemStore::new())
        }
    };

    let bus = Arc::new(InProcessEventBus::new());
    let updater = Arc::new(UpdateExistingItem::new(
        Arc::clone(&item_repository),
        bus,
    ));

    let server = ItemSyncServer::new(config, item_repository, updater);
    server.run().await?;
    Ok(())
}
