//! The item update use case: validation, conflict rules, associations,
//! persistence, events.

use quillsync_domain::time;
use quillsync_domain::{
    ContentType, Dates, Item, ItemHash, KeySystemAssociation, KeySystemIdentifier,
    SharedVaultAssociation, Timestamps,
};
use quillsync_events::{DomainEvent, EventPublisher};
use quillsync_storage::ItemRepository;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::error::ItemSyncError;

/// Inputs for one update of an existing server item.
#[derive(Debug, Clone)]
pub struct UpdateExistingItemInput {
    pub existing_item: Item,
    pub item_hash: ItemHash,
    /// Session performing the write, as received from the gateway.
    pub session_uuid: String,
    /// Authenticated user performing the write.
    pub performing_user_uuid: String,
}

/// Applies an incoming item hash to an existing item.
///
/// Validation is ordered and short-circuits on the first failure; nothing is
/// persisted or published until the whole payload has been accepted.
pub struct UpdateExistingItem {
    item_repository: Arc<dyn ItemRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl UpdateExistingItem {
    pub fn new(item_repository: Arc<dyn ItemRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            item_repository,
            publisher,
        }
    }

    pub async fn execute(&self, input: UpdateExistingItemInput) -> Result<Item, ItemSyncError> {
        let hash = &input.item_hash;

        let session_uuid = Uuid::parse_str(&input.session_uuid)
            .map_err(|_| ItemSyncError::InvalidSessionUuid(input.session_uuid.clone()))?;
        let performing_user_uuid = Uuid::parse_str(&input.performing_user_uuid)
            .map_err(|_| ItemSyncError::InvalidUserUuid(input.performing_user_uuid.clone()))?;
        let content_type: ContentType = hash
            .content_type
            .parse()
            .map_err(|_| ItemSyncError::UnknownContentType(hash.content_type.clone()))?;
        let duplicate_of = hash
            .duplicate_of
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|_| {
                ItemSyncError::InvalidDuplicateUuid(hash.duplicate_of.clone().unwrap_or_default())
            })?;
        if !hash.has_creation_time() {
            return Err(ItemSyncError::MissingCreationTime(hash.uuid.clone()));
        }
        let shared_vault_uuid = hash
            .shared_vault_uuid
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|_| {
                ItemSyncError::InvalidSharedVaultUuid(
                    hash.shared_vault_uuid.clone().unwrap_or_default(),
                )
            })?;
        let key_system_identifier = hash
            .key_system_identifier
            .as_deref()
            .map(KeySystemIdentifier::new)
            .transpose()
            .map_err(|err| ItemSyncError::InvalidKeySystemIdentifier(err.0))?;

        let mut item = input.existing_item;
        item.updated_with_session = Some(session_uuid);
        item.content = hash.content.clone();
        item.content_type = content_type;
        item.enc_item_key = hash.enc_item_key.clone();
        item.auth_hash = hash.auth_hash.clone();
        item.items_key_id = hash.items_key_id.clone();
        item.deleted = hash.deleted.unwrap_or(false);
        if item.deleted {
            // Deletion clears the payload, including duplication.
            item.content = None;
            item.enc_item_key = None;
            item.auth_hash = None;
            item.items_key_id = None;
            item.duplicate_of = None;
        } else {
            item.duplicate_of = duplicate_of;
        }

        let timestamps = decide_timestamps(hash)?;
        let dates = Dates::from_timestamps(&timestamps)?;
        item.timestamps = timestamps;
        item.dates = dates;

        if let Some(shared_vault_uuid) = shared_vault_uuid {
            let names_different_vault = item
                .shared_vault_association
                .as_ref()
                .is_none_or(|existing| existing.shared_vault_uuid != shared_vault_uuid);
            if names_different_vault {
                debug!(
                    "Associating item {} with shared vault {}",
                    item.uuid, shared_vault_uuid
                );
                item.shared_vault_association = Some(SharedVaultAssociation::new(
                    item.uuid,
                    shared_vault_uuid,
                    performing_user_uuid,
                    item.timestamps,
                ));
            }
        }

        if let Some(key_system_identifier) = key_system_identifier {
            let names_different_key_system = item
                .key_system_association
                .as_ref()
                .is_none_or(|existing| existing.key_system_identifier != key_system_identifier);
            if names_different_key_system {
                debug!(
                    "Associating item {} with key system {}",
                    item.uuid, key_system_identifier
                );
                item.key_system_association = Some(KeySystemAssociation::new(
                    item.uuid,
                    key_system_identifier,
                    item.timestamps,
                ));
            }
        }

        self.item_repository.save(&item).await?;

        self.publisher
            .publish(DomainEvent::ItemRevisionCreationRequested {
                item_uuid: item.uuid,
                user_uuid: item.user_uuid,
            })
            .await?;
        if let Some(duplicate_of_uuid) = duplicate_of {
            self.publisher
                .publish(DomainEvent::DuplicateItemSynced {
                    item_uuid: item.uuid,
                    duplicate_of_uuid,
                    user_uuid: item.user_uuid,
                })
                .await?;
        }

        Ok(item)
    }
}

/// Resolve the microsecond pair an incoming hash describes.
///
/// The numeric path is taken only when *both* `created_at_timestamp` and
/// `updated_at_timestamp` are present; any other combination falls back to
/// the string form, where `created_at` must exist even if a numeric
/// `created_at_timestamp` was sent. A missing `updated_at` string uses the
/// server clock.
fn decide_timestamps(hash: &ItemHash) -> Result<Timestamps, ItemSyncError> {
    if let (Some(created_at), Some(updated_at)) =
        (hash.created_at_timestamp, hash.updated_at_timestamp)
    {
        return Ok(Timestamps::new(created_at, updated_at)?);
    }

    let created_at_string = hash
        .created_at
        .as_deref()
        .ok_or_else(|| ItemSyncError::MissingCreationTime(hash.uuid.clone()))?;
    let created_at = time::microseconds_from_string(created_at_string)?;
    let updated_at = match hash.updated_at.as_deref() {
        Some(raw) => time::microseconds_from_string(raw)?,
        None => time::now_microseconds(),
    };
    Ok(Timestamps::new(created_at, updated_at)?)
}
