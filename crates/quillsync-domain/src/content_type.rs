//! The fixed content-type vocabulary for synced items.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Known item content types.
///
/// Incoming item hashes carry the type as a wire string; anything outside
/// this vocabulary is rejected during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Note,
    Tag,
    SmartView,
    ItemsKey,
    KeySystemItemsKey,
    KeySystemRootKey,
    VaultListing,
    Component,
    Theme,
    Editor,
    UserPreferences,
    Privileges,
    ExtensionRepo,
    File,
    FileSafeCredentials,
    FileSafeFileFormat,
    FileSafeIntegration,
}

impl ContentType {
    /// The wire string for this content type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Note => "Note",
            ContentType::Tag => "Tag",
            ContentType::SmartView => "SmartView",
            ContentType::ItemsKey => "ItemsKey",
            ContentType::KeySystemItemsKey => "KeySystemItemsKey",
            ContentType::KeySystemRootKey => "KeySystemRootKey",
            ContentType::VaultListing => "VaultListing",
            ContentType::Component => "Component",
            ContentType::Theme => "Theme",
            ContentType::Editor => "Editor",
            ContentType::UserPreferences => "UserPreferences",
            ContentType::Privileges => "Privileges",
            ContentType::ExtensionRepo => "ExtensionRepo",
            ContentType::File => "File",
            ContentType::FileSafeCredentials => "FileSafeCredentials",
            ContentType::FileSafeFileFormat => "FileSafeFileFormat",
            ContentType::FileSafeIntegration => "FileSafeIntegration",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for wire strings outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown content type: {0}")]
pub struct UnknownContentType(pub String);

impl FromStr for ContentType {
    type Err = UnknownContentType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Note" => Ok(ContentType::Note),
            "Tag" => Ok(ContentType::Tag),
            "SmartView" => Ok(ContentType::SmartView),
            "ItemsKey" => Ok(ContentType::ItemsKey),
            "KeySystemItemsKey" => Ok(ContentType::KeySystemItemsKey),
            "KeySystemRootKey" => Ok(ContentType::KeySystemRootKey),
            "VaultListing" => Ok(ContentType::VaultListing),
            "Component" => Ok(ContentType::Component),
            "Theme" => Ok(ContentType::Theme),
            "Editor" => Ok(ContentType::Editor),
            "UserPreferences" => Ok(ContentType::UserPreferences),
            "Privileges" => Ok(ContentType::Privileges),
            "ExtensionRepo" => Ok(ContentType::ExtensionRepo),
            "File" => Ok(ContentType::File),
            "FileSafeCredentials" => Ok(ContentType::FileSafeCredentials),
            "FileSafeFileFormat" => Ok(ContentType::FileSafeFileFormat),
            "FileSafeIntegration" => Ok(ContentType::FileSafeIntegration),
            other => Err(UnknownContentType(other.to_string())),
        }
    }
}
