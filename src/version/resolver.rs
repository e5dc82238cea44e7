//! Latest version resolver trait
//!
//! A feed item only names a package; the version that was just published has
//! to be looked up. Two strategies exist:
//! - dist-tags: ask the registry API and take the highest tagged version
//! - versions page: scrape the package page and take the version published
//!   closest to now
//!
//! The caller picks one when wiring; there is no runtime fallback between them.

#[cfg(test)]
use mockall::automock;

use crate::version::error::ResolveError;

/// Trait for resolving the current version of a package
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait VersionResolver: Send + Sync {
    /// Short name used in logs
    fn strategy(&self) -> &'static str;

    /// Resolve the version a package was most recently published at
    ///
    /// # Returns
    /// * `Ok(String)` - The resolved version
    /// * `Err(ResolveError)` - The registry failed or no version could be determined
    async fn resolve_version(&self, package_name: &str) -> Result<String, ResolveError>;
}
