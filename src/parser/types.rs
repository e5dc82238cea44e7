//! Common types for parsers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One package announcement extracted from the registry feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Package name (feed item title)
    pub name: String,
    /// Link to the package page
    pub link: String,
    /// Publish time of the announcement
    pub published_at: DateTime<Utc>,
    /// Package description, empty when the feed omits it
    pub description: String,
    /// Publisher name, empty when the feed omits it
    pub creator: String,
}

/// A version and the instant it was published, recovered from a versions page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub version: String,
    pub published_at: DateTime<Utc>,
}

impl VersionRecord {
    pub fn new(version: impl Into<String>, published_at: DateTime<Utc>) -> Self {
        Self {
            version: version.into(),
            published_at,
        }
    }
}
