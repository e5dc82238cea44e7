//! Common types for the version layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::parser::types::FeedItem;

/// A feed item whose version has been resolved; the unit sent downstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPackage {
    pub name: String,
    pub version: String,
    pub published_at: DateTime<Utc>,
    pub description: String,
    pub creator: String,
}

impl ResolvedPackage {
    /// Combine a feed item with its resolved version
    pub fn from_feed_item(item: FeedItem, version: String) -> Self {
        Self {
            name: item.name,
            version,
            published_at: item.published_at,
            description: item.description,
            creator: item.creator,
        }
    }
}

/// A version with its distance from the reference instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedVersion {
    pub version: String,
    #[serde(rename = "date")]
    pub published_at: DateTime<Utc>,
    /// Absolute distance from the reference instant in milliseconds
    pub time_diff: u64,
}

/// Versions ordered by closeness to a reference instant
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedVersions {
    /// Version published closest to the reference instant
    #[serde(rename = "closestVersion")]
    pub closest: Option<String>,
    /// All versions, closest first
    #[serde(rename = "allVersions")]
    pub ranked: Vec<RankedVersion>,
}
