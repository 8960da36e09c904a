//! Immutable historical snapshots of item state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One historical record of an item's state.
///
/// Revisions never change after insert. The migration engine compares copies
/// across stores with [`Revision::is_identical_to`]: every payload field and
/// both microsecond timestamps must match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub uuid: Uuid,
    pub item_uuid: Uuid,
    pub user_uuid: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enc_item_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<NaiveDate>,
    /// UTC microseconds.
    pub created_at: i64,
    /// UTC microseconds.
    pub updated_at: i64,
}

impl Revision {
    /// Whether two copies of a revision are indistinguishable.
    pub fn is_identical_to(&self, other: &Revision) -> bool {
        self == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn revision() -> Revision {
        Revision {
            uuid: Uuid::new_v4(),
            item_uuid: Uuid::new_v4(),
            user_uuid: Uuid::new_v4(),
            content: Some("ciphertext".to_string()),
            content_type: Some("Note".to_string()),
            items_key_id: None,
            enc_item_key: Some("key".to_string()),
            auth_hash: None,
            creation_date: None,
            created_at: 100,
            updated_at: 200,
        }
    }

    #[test]
    fn identical_copies_match() {
        let a = revision();
        let b = a.clone();
        assert!(a.is_identical_to(&b));
    }

    #[test]
    fn timestamp_drift_breaks_identity() {
        let a = revision();
        let mut b = a.clone();
        b.updated_at += 1;
        assert!(!a.is_identical_to(&b));
    }

    #[test]
    fn payload_drift_breaks_identity() {
        let a = revision();
        let mut b = a.clone();
        b.content = Some("different ciphertext".to_string());
        assert!(!a.is_identical_to(&b));
    }
}
