//! Versions page resolver
//!
//! Scrapes the package's "versions" tab and picks the version whose publish
//! time is closest to now.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info};

use crate::parser::version_table::VersionTableScanner;
use crate::version::error::ResolveError;
use crate::version::registry::Registry;
use crate::version::resolver::VersionResolver;
use crate::version::selector::select;
use crate::version::types::RankedVersions;

pub struct VersionsPageResolver {
    registry: Arc<dyn Registry>,
    scanner: VersionTableScanner,
}

impl VersionsPageResolver {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self {
            registry,
            scanner: VersionTableScanner::new(),
        }
    }

    /// Fetch the versions page and rank every version by distance from now.
    ///
    /// Fails when the page cannot be fetched or holds no dated version.
    pub async fn ranked_versions(&self, package_name: &str) -> Result<RankedVersions, ResolveError> {
        info!("Fetching versions page for package: {}", package_name);

        let html = self
            .registry
            .fetch_versions_page(package_name)
            .await
            .inspect_err(|e| error!("Error fetching versions page for {}: {}", package_name, e))?;

        let records = self.scanner.scan(&html);
        let ranked = select(records.values(), Utc::now());

        if ranked.closest.is_none() {
            error!("Failed to find version for package: {}", package_name);
            return Err(ResolveError::NoVersionFound(package_name.to_string()));
        }

        debug!(
            "Found {} versions for {}, closest: {:?}",
            ranked.ranked.len(),
            package_name,
            ranked.closest
        );
        Ok(ranked)
    }
}

#[async_trait]
impl VersionResolver for VersionsPageResolver {
    fn strategy(&self) -> &'static str {
        "versions-page"
    }

    async fn resolve_version(&self, package_name: &str) -> Result<String, ResolveError> {
        let ranked = self.ranked_versions(package_name).await?;
        ranked
            .closest
            .ok_or_else(|| ResolveError::NoVersionFound(package_name.to_string()))
    }
}
