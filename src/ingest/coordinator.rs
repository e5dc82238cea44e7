//! Scheduled ingestion run
//!
//! Fetches the registry feed, resolves a version for every announced package
//! and queues the result. Items are handled strictly one after another.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::ingest::error::IngestError;
use crate::ingest::queue::PackageQueue;
use crate::parser::feed::FeedItemExtractor;
use crate::parser::types::FeedItem;
use crate::version::registry::Registry;
use crate::version::resolver::VersionResolver;
use crate::version::types::ResolvedPackage;

/// Counts for one ingestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Items extracted from the feed
    pub discovered: usize,
    /// Items handed to the queue
    pub queued: usize,
    /// Items without a resolvable version or with missing fields
    pub skipped: usize,
    /// Items the queue refused
    pub failed: usize,
}

enum ItemOutcome {
    Queued,
    Skipped,
    Failed,
}

pub struct IngestionCoordinator {
    registry: Arc<dyn Registry>,
    resolver: Arc<dyn VersionResolver>,
    queue: Arc<dyn PackageQueue>,
    extractor: FeedItemExtractor,
}

impl IngestionCoordinator {
    pub fn new(
        registry: Arc<dyn Registry>,
        resolver: Arc<dyn VersionResolver>,
        queue: Arc<dyn PackageQueue>,
    ) -> Self {
        Self {
            registry,
            resolver,
            queue,
            extractor: FeedItemExtractor::new(),
        }
    }

    /// Run one ingestion pass over the current feed
    pub async fn run(&self) -> Result<RunSummary, IngestError> {
        let xml = self.registry.fetch_feed().await.map_err(|e| {
            error!("Scheduled handler: Failed to fetch feed: {}", e);
            IngestError::Feed(e)
        })?;

        let items: Vec<FeedItem> = self.extractor.extract(&xml).collect();
        info!(
            "Scheduled handler: {} packages in feed, resolving with {}",
            items.len(),
            self.resolver.strategy()
        );

        let mut summary = RunSummary {
            discovered: items.len(),
            ..RunSummary::default()
        };

        for item in items {
            match self.process_item(item).await {
                ItemOutcome::Queued => summary.queued += 1,
                ItemOutcome::Skipped => summary.skipped += 1,
                ItemOutcome::Failed => summary.failed += 1,
            }
        }

        info!(
            "Scheduled handler: queued {}, skipped {}, failed {}",
            summary.queued, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    async fn process_item(&self, item: FeedItem) -> ItemOutcome {
        let version = self
            .resolver
            .resolve_version(&item.name)
            .await
            .inspect_err(|e| warn!("Could not resolve version for {}: {}", item.name, e))
            .ok()
            .filter(|v| !v.trim().is_empty());

        let missing = missing_fields(&item, version.as_deref());
        let Some(version) = version.filter(|_| missing.is_empty()) else {
            warn!(
                "Skipping queue due to missing values for {:?}: {}",
                item.name,
                missing.join(", ")
            );
            return ItemOutcome::Skipped;
        };

        let package = ResolvedPackage::from_feed_item(item, version);
        let (name, version) = (package.name.clone(), package.version.clone());

        match self.queue.send(package).await {
            Ok(()) => {
                info!(
                    "Scheduled handler: Package: {} - {} queued for processing",
                    name, version
                );
                ItemOutcome::Queued
            }
            Err(e) => {
                error!("Failed to queue {}@{}: {}", name, version, e);
                ItemOutcome::Failed
            }
        }
    }
}

/// Names of required fields that are empty
fn missing_fields(item: &FeedItem, version: Option<&str>) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if item.name.trim().is_empty() {
        missing.push("name");
    }
    if version.is_none() {
        missing.push("version");
    }
    missing
}
