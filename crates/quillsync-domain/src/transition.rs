//! Per-user migration lifecycle vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which store a transition migrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionType {
    Items,
    Revisions,
}

impl TransitionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionType::Items => "ITEMS",
            TransitionType::Revisions => "REVISIONS",
        }
    }
}

impl fmt::Display for TransitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable status of one `(user, transition type)` migration.
///
/// A never-started transition has no status row at all, so there is no
/// `NotStarted` variant here; absence is that state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionStatus {
    InProgress,
    Verified,
    Failed,
}

impl TransitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionStatus::InProgress => "IN_PROGRESS",
            TransitionStatus::Verified => "VERIFIED",
            TransitionStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TransitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
