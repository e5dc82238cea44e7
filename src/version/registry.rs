//! Registry trait for fetching the feed and package metadata

#[cfg(test)]
use mockall::automock;

use indexmap::IndexMap;

use crate::version::error::RegistryError;

/// Trait for the remote package registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Fetches the raw RSS feed of recently published packages
    async fn fetch_feed(&self) -> Result<String, RegistryError>;

    /// Fetches the dist-tags of a package
    ///
    /// # Returns
    /// * `Ok(IndexMap)` - tag name to version, in the order the registry sent them
    /// * `Err(RegistryError)` - If the fetch fails or the body is empty
    async fn fetch_dist_tags(
        &self,
        package_name: &str,
    ) -> Result<IndexMap<String, String>, RegistryError>;

    /// Fetches the HTML of the package's versions page
    async fn fetch_versions_page(&self, package_name: &str) -> Result<String, RegistryError>;
}
