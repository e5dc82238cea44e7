//! dist-tags version resolver

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::version::comparator::latest_of;
use crate::version::error::ResolveError;
use crate::version::registry::Registry;
use crate::version::resolver::VersionResolver;

/// Resolves the highest version among a package's dist-tags
pub struct DistTagResolver {
    registry: Arc<dyn Registry>,
}

impl DistTagResolver {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl VersionResolver for DistTagResolver {
    fn strategy(&self) -> &'static str {
        "dist-tags"
    }

    async fn resolve_version(&self, package_name: &str) -> Result<String, ResolveError> {
        let dist_tags = self
            .registry
            .fetch_dist_tags(package_name)
            .await
            .inspect_err(|e| error!("Failed to fetch version for {}: {}", package_name, e))?;

        let latest = latest_of(Some(&dist_tags))
            .ok_or_else(|| ResolveError::NoVersionFound(package_name.to_string()))?;

        debug!("Latest version for {}: {}", package_name, latest);
        Ok(latest)
    }
}
