//! SQLite repository backends.
//!
//! Single-instance production persistence. The primary and secondary revision
//! stores live in separate database files, so each store is constructed from
//! its own pool via [`connect`].

use async_trait::async_trait;
use chrono::NaiveDate;
use quillsync_domain::{
    ContentType, Dates, Item, KeySystemAssociation, Revision, SharedVaultAssociation, Timestamps,
    TransitionStatus, TransitionType, User,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

use crate::error::StorageError;
use crate::traits::{
    ItemRepository, RevisionRepository, TransitionStatusRepository, UserRepository,
};

/// Configuration for a SQLite-backed store.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database file path.
    pub database_path: PathBuf,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// Create the database file if it does not exist.
    pub create_if_missing: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("quillsync.db"),
            max_connections: 10,
            create_if_missing: true,
        }
    }
}

/// Open a connection pool for one database file.
pub async fn connect(config: &SqliteConfig) -> Result<SqlitePool, StorageError> {
    info!("Opening SQLite database at {:?}", config.database_path);
    let options = SqliteConnectOptions::new()
        .filename(&config.database_path)
        .create_if_missing(config.create_if_missing);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;
    Ok(pool)
}

fn parse_uuid(value: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(value).map_err(|err| StorageError::Serialization(err.to_string()))
}

fn parse_optional_uuid(value: Option<String>) -> Result<Option<Uuid>, StorageError> {
    value.as_deref().map(parse_uuid).transpose()
}

fn parse_status(value: &str) -> Result<TransitionStatus, StorageError> {
    match value {
        "IN_PROGRESS" => Ok(TransitionStatus::InProgress),
        "VERIFIED" => Ok(TransitionStatus::Verified),
        "FAILED" => Ok(TransitionStatus::Failed),
        other => Err(StorageError::Serialization(format!(
            "unknown transition status: {other}"
        ))),
    }
}

/// SQLite-backed revision store.
pub struct SqliteRevisionStore {
    pool: SqlitePool,
}

impl SqliteRevisionStore {
    pub async fn new(pool: SqlitePool) -> Result<Self, StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS revisions (
                uuid TEXT PRIMARY KEY,
                item_uuid TEXT NOT NULL,
                user_uuid TEXT NOT NULL,
                content TEXT,
                content_type TEXT,
                items_key_id TEXT,
                enc_item_key TEXT,
                auth_hash TEXT,
                creation_date TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_revisions_user_created ON revisions(user_uuid, created_at)",
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }

    fn from_row(row: &SqliteRow) -> Result<Revision, StorageError> {
        let creation_date: Option<String> = row.try_get("creation_date")?;
        let creation_date = creation_date
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .map_err(|err| StorageError::Serialization(err.to_string()))
            })
            .transpose()?;
        Ok(Revision {
            uuid: parse_uuid(row.try_get::<String, _>("uuid")?.as_str())?,
            item_uuid: parse_uuid(row.try_get::<String, _>("item_uuid")?.as_str())?,
            user_uuid: parse_uuid(row.try_get::<String, _>("user_uuid")?.as_str())?,
            content: row.try_get("content")?,
            content_type: row.try_get("content_type")?,
            items_key_id: row.try_get("items_key_id")?,
            enc_item_key: row.try_get("enc_item_key")?,
            auth_hash: row.try_get("auth_hash")?,
            creation_date,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl RevisionRepository for SqliteRevisionStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn count_by_user_uuid(&self, user_uuid: Uuid) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM revisions WHERE user_uuid = ?")
            .bind(user_uuid.to_string())
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = row.try_get("total")?;
        Ok(total as u64)
    }

    async fn find_by_user_uuid(
        &self,
        user_uuid: Uuid,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Revision>, StorageError> {
        let rows = sqlx::query(
            "SELECT * FROM revisions WHERE user_uuid = ? ORDER BY created_at ASC, uuid ASC LIMIT ? OFFSET ?",
        )
        .bind(user_uuid.to_string())
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::from_row).collect()
    }

    async fn find_one_by_uuid(
        &self,
        revision_uuid: Uuid,
        user_uuid: Uuid,
    ) -> Result<Option<Revision>, StorageError> {
        let row = sqlx::query("SELECT * FROM revisions WHERE uuid = ? AND user_uuid = ?")
            .bind(revision_uuid.to_string())
            .bind(user_uuid.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::from_row).transpose()
    }

    async fn insert(&self, revision: Revision) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO revisions
                (uuid, item_uuid, user_uuid, content, content_type, items_key_id,
                 enc_item_key, auth_hash, creation_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(uuid) DO NOTHING
            "#,
        )
        .bind(revision.uuid.to_string())
        .bind(revision.item_uuid.to_string())
        .bind(revision.user_uuid.to_string())
        .bind(&revision.content)
        .bind(&revision.content_type)
        .bind(&revision.items_key_id)
        .bind(&revision.enc_item_key)
        .bind(&revision.auth_hash)
        .bind(revision.creation_date.map(|d| d.to_string()))
        .bind(revision.created_at)
        .bind(revision.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_one_by_uuid(
        &self,
        revision_uuid: Uuid,
        user_uuid: Uuid,
    ) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM revisions WHERE uuid = ? AND user_uuid = ?")
            .bind(revision_uuid.to_string())
            .bind(user_uuid.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_by_user_uuid(&self, user_uuid: Uuid) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM revisions WHERE user_uuid = ?")
            .bind(user_uuid.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// SQLite-backed user store.
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub async fn new(pool: SqlitePool) -> Result<Self, StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                uuid TEXT PRIMARY KEY,
                roles TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }

    /// Seed a user row. Used by operational tooling and tests.
    pub async fn add(&self, user: &User) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT OR REPLACE INTO users (uuid, roles, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user.uuid.to_string())
        .bind(serde_json::to_string(&user.roles)?)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn from_row(row: &SqliteRow) -> Result<User, StorageError> {
        let roles: String = row.try_get("roles")?;
        Ok(User {
            uuid: parse_uuid(row.try_get::<String, _>("uuid")?.as_str())?,
            roles: serde_json::from_str(&roles)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl UserRepository for SqliteUserStore {
    async fn count_all_created_between(&self, start: i64, end: i64) -> Result<u64, StorageError> {
        let row =
            sqlx::query("SELECT COUNT(*) AS total FROM users WHERE created_at BETWEEN ? AND ?")
                .bind(start)
                .bind(end)
                .fetch_one(&self.pool)
                .await?;
        let total: i64 = row.try_get("total")?;
        Ok(total as u64)
    }

    async fn find_all_created_between(
        &self,
        start: i64,
        end: i64,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<User>, StorageError> {
        let rows = sqlx::query(
            "SELECT * FROM users WHERE created_at BETWEEN ? AND ? ORDER BY created_at ASC, uuid ASC LIMIT ? OFFSET ?",
        )
        .bind(start)
        .bind(end)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::from_row).collect()
    }
}

/// SQLite-backed item store. Associations are persisted as JSON columns.
pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    pub async fn new(pool: SqlitePool) -> Result<Self, StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                uuid TEXT NOT NULL,
                user_uuid TEXT NOT NULL,
                updated_with_session TEXT,
                content TEXT,
                content_type TEXT NOT NULL,
                enc_item_key TEXT,
                auth_hash TEXT,
                items_key_id TEXT,
                duplicate_of TEXT,
                deleted INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                shared_vault_association TEXT,
                key_system_association TEXT,
                PRIMARY KEY (uuid, user_uuid)
            )
            "#,
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }

    fn from_row(row: &SqliteRow) -> Result<Item, StorageError> {
        let content_type: String = row.try_get("content_type")?;
        let content_type: ContentType = content_type
            .parse()
            .map_err(|err: quillsync_domain::UnknownContentType| {
                StorageError::Serialization(err.to_string())
            })?;
        let timestamps =
            Timestamps::new(row.try_get("created_at")?, row.try_get("updated_at")?)
                .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let dates = Dates::from_timestamps(&timestamps)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let shared_vault_association: Option<String> = row.try_get("shared_vault_association")?;
        let shared_vault_association: Option<SharedVaultAssociation> = shared_vault_association
            .map(|raw| serde_json::from_str(&raw))
            .transpose()?;
        let key_system_association: Option<String> = row.try_get("key_system_association")?;
        let key_system_association: Option<KeySystemAssociation> = key_system_association
            .map(|raw| serde_json::from_str(&raw))
            .transpose()?;
        Ok(Item {
            uuid: parse_uuid(row.try_get::<String, _>("uuid")?.as_str())?,
            user_uuid: parse_uuid(row.try_get::<String, _>("user_uuid")?.as_str())?,
            updated_with_session: parse_optional_uuid(row.try_get("updated_with_session")?)?,
            content: row.try_get("content")?,
            content_type,
            enc_item_key: row.try_get("enc_item_key")?,
            auth_hash: row.try_get("auth_hash")?,
            items_key_id: row.try_get("items_key_id")?,
            duplicate_of: parse_optional_uuid(row.try_get("duplicate_of")?)?,
            deleted: row.try_get("deleted")?,
            dates,
            timestamps,
            shared_vault_association,
            key_system_association,
        })
    }
}

#[async_trait]
impl ItemRepository for SqliteItemStore {
    async fn save(&self, item: &Item) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO items
                (uuid, user_uuid, updated_with_session, content, content_type,
                 enc_item_key, auth_hash, items_key_id, duplicate_of, deleted,
                 created_at, updated_at, shared_vault_association, key_system_association)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.uuid.to_string())
        .bind(item.user_uuid.to_string())
        .bind(item.updated_with_session.map(|uuid| uuid.to_string()))
        .bind(&item.content)
        .bind(item.content_type.as_str())
        .bind(&item.enc_item_key)
        .bind(&item.auth_hash)
        .bind(&item.items_key_id)
        .bind(item.duplicate_of.map(|uuid| uuid.to_string()))
        .bind(item.deleted)
        .bind(item.timestamps.created_at)
        .bind(item.timestamps.updated_at)
        .bind(
            item.shared_vault_association
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
        )
        .bind(
            item.key_system_association
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_one_by_uuid(
        &self,
        item_uuid: Uuid,
        user_uuid: Uuid,
    ) -> Result<Option<Item>, StorageError> {
        let row = sqlx::query("SELECT * FROM items WHERE uuid = ? AND user_uuid = ?")
            .bind(item_uuid.to_string())
            .bind(user_uuid.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::from_row).transpose()
    }
}

/// SQLite-backed transition status store.
pub struct SqliteTransitionStatusStore {
    pool: SqlitePool,
}

impl SqliteTransitionStatusStore {
    pub async fn new(pool: SqlitePool) -> Result<Self, StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transition_statuses (
                user_uuid TEXT NOT NULL,
                transition_type TEXT NOT NULL,
                status TEXT,
                status_updated_at INTEGER,
                paging_progress INTEGER NOT NULL DEFAULT 1,
                integrity_progress INTEGER NOT NULL DEFAULT 1,
                PRIMARY KEY (user_uuid, transition_type)
            )
            "#,
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl TransitionStatusRepository for SqliteTransitionStatusStore {
    async fn get_status(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
    ) -> Result<Option<TransitionStatus>, StorageError> {
        let row = sqlx::query(
            "SELECT status FROM transition_statuses WHERE user_uuid = ? AND transition_type = ?",
        )
        .bind(user_uuid.to_string())
        .bind(transition_type.as_str())
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => {
                let status: Option<String> = row.try_get("status")?;
                status.as_deref().map(parse_status).transpose()
            }
            None => Ok(None),
        }
    }

    async fn set_status(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
        status: TransitionStatus,
        timestamp: i64,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO transition_statuses (user_uuid, transition_type, status, status_updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_uuid, transition_type)
            DO UPDATE SET status = excluded.status, status_updated_at = excluded.status_updated_at
            "#,
        )
        .bind(user_uuid.to_string())
        .bind(transition_type.as_str())
        .bind(status.as_str())
        .bind(timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_paging_progress(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
    ) -> Result<u32, StorageError> {
        let row = sqlx::query(
            "SELECT paging_progress FROM transition_statuses WHERE user_uuid = ? AND transition_type = ?",
        )
        .bind(user_uuid.to_string())
        .bind(transition_type.as_str())
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => {
                let progress: i64 = row.try_get("paging_progress")?;
                Ok(progress as u32)
            }
            None => Ok(1),
        }
    }

    async fn set_paging_progress(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
        progress: u32,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO transition_statuses (user_uuid, transition_type, paging_progress)
            VALUES (?, ?, ?)
            ON CONFLICT(user_uuid, transition_type)
            DO UPDATE SET paging_progress = excluded.paging_progress
            "#,
        )
        .bind(user_uuid.to_string())
        .bind(transition_type.as_str())
        .bind(progress as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_integrity_progress(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
    ) -> Result<u32, StorageError> {
        let row = sqlx::query(
            "SELECT integrity_progress FROM transition_statuses WHERE user_uuid = ? AND transition_type = ?",
        )
        .bind(user_uuid.to_string())
        .bind(transition_type.as_str())
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => {
                let progress: i64 = row.try_get("integrity_progress")?;
                Ok(progress as u32)
            }
            None => Ok(1),
        }
    }

    async fn set_integrity_progress(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
        progress: u32,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO transition_statuses (user_uuid, transition_type, integrity_progress)
            VALUES (?, ?, ?)
            ON CONFLICT(user_uuid, transition_type)
            DO UPDATE SET integrity_progress = excluded.integrity_progress
            "#,
        )
        .bind(user_uuid.to_string())
        .bind(transition_type.as_str())
        .bind(progress as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(
        &self,
        user_uuid: Uuid,
        transition_type: TransitionType,
    ) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM transition_statuses WHERE user_uuid = ? AND transition_type = ?")
            .bind(user_uuid.to_string())
            .bind(transition_type.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
