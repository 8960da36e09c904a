//! The client-submitted mutation payload for one item.

use serde::{Deserialize, Serialize};

/// Wire image of an incoming item mutation.
///
/// Every field except `uuid` and `content_type` is optional. Creation time
/// may arrive either as `created_at_timestamp` (UTC microseconds) or as the
/// `created_at` date string; at least one of the two must be present for the
/// hash to be applicable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemHash {
    pub uuid: String,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enc_item_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_vault_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_system_identifier: Option<String>,
}

impl ItemHash {
    /// Whether the hash carries a creation time in either accepted form.
    pub fn has_creation_time(&self) -> bool {
        self.created_at_timestamp.is_some() || self.created_at.is_some()
    }
}
