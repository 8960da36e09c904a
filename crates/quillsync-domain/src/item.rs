//! Server-held item state and its association records.

use crate::content_type::ContentType;
use crate::time::{self, TimeError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Machine timestamps in UTC microseconds.
///
/// Construction enforces `updated_at >= created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: i64,
    pub updated_at: i64,
}

impl Timestamps {
    pub fn new(created_at: i64, updated_at: i64) -> Result<Self, TimeError> {
        if updated_at < created_at {
            return Err(TimeError::InvertedPair {
                created_at,
                updated_at,
            });
        }
        Ok(Self {
            created_at,
            updated_at,
        })
    }
}

/// Human-time mirror of [`Timestamps`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dates {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dates {
    /// Build the date pair from a microsecond pair.
    pub fn from_timestamps(timestamps: &Timestamps) -> Result<Self, TimeError> {
        Ok(Self {
            created_at: time::datetime_from_microseconds(timestamps.created_at)?,
            updated_at: time::datetime_from_microseconds(timestamps.updated_at)?,
        })
    }
}

/// Opaque identifier of a key system, supplied by clients as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeySystemIdentifier(String);

/// Error for malformed key system identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid key system identifier: {0:?}")]
pub struct InvalidKeySystemIdentifier(pub String);

impl KeySystemIdentifier {
    /// Maximum accepted identifier length on the wire.
    pub const MAX_LENGTH: usize = 255;

    pub fn new(value: &str) -> Result<Self, InvalidKeySystemIdentifier> {
        if value.is_empty() || value.len() > Self::MAX_LENGTH {
            return Err(InvalidKeySystemIdentifier(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeySystemIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Link between an item and the shared vault it lives in.
///
/// Carries its own identity: the association is only re-created when an
/// incoming hash names a different vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedVaultAssociation {
    pub uuid: Uuid,
    pub item_uuid: Uuid,
    pub shared_vault_uuid: Uuid,
    pub last_edited_by: Uuid,
    pub timestamps: Timestamps,
}

impl SharedVaultAssociation {
    pub fn new(
        item_uuid: Uuid,
        shared_vault_uuid: Uuid,
        last_edited_by: Uuid,
        timestamps: Timestamps,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            item_uuid,
            shared_vault_uuid,
            last_edited_by,
            timestamps,
        }
    }
}

/// Link between an item and the key system that encrypts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySystemAssociation {
    pub uuid: Uuid,
    pub item_uuid: Uuid,
    pub key_system_identifier: KeySystemIdentifier,
    pub timestamps: Timestamps,
}

impl KeySystemAssociation {
    pub fn new(
        item_uuid: Uuid,
        key_system_identifier: KeySystemIdentifier,
        timestamps: Timestamps,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            item_uuid,
            key_system_identifier,
            timestamps,
        }
    }
}

/// The latest server-held state for one synced item.
///
/// Payload fields are opaque ciphertext; the server copies them verbatim.
/// A deleted item holds no payload: `content`, `enc_item_key`, `auth_hash`,
/// `items_key_id` and `duplicate_of` are all cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub uuid: Uuid,
    pub user_uuid: Uuid,
    /// Session that last wrote this item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_with_session: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enc_item_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<Uuid>,
    pub deleted: bool,
    pub dates: Dates,
    pub timestamps: Timestamps,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_vault_association: Option<SharedVaultAssociation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_system_association: Option<KeySystemAssociation>,
}
