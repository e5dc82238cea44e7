//! npm registry API implementation

use std::time::Duration;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::config::FETCH_TIMEOUT_MS;
use crate::version::error::RegistryError;
use crate::version::registry::Registry;

/// Default base URL for npm registry
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Default base URL for the npm website (versions pages)
pub const DEFAULT_WEBSITE_URL: &str = "https://www.npmjs.com";

/// Registry implementation for the npm registry API and website
pub struct NpmRegistry {
    client: reqwest::Client,
    registry_url: String,
    website_url: String,
}

impl NpmRegistry {
    /// Creates a new NpmRegistry with custom base URLs
    pub fn new(registry_url: &str, website_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("npm-watch/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_millis(FETCH_TIMEOUT_MS as u64))
                .build()
                .expect("Failed to create HTTP client"),
            registry_url: registry_url.trim_end_matches('/').to_string(),
            website_url: website_url.trim_end_matches('/').to_string(),
        }
    }

    /// Encode package name for URL (handles scoped packages)
    fn encode_package_name(package_name: &str) -> String {
        if package_name.starts_with('@') {
            // Scoped package: @scope/name -> @scope%2Fname
            package_name.replace('/', "%2F")
        } else {
            package_name.to_string()
        }
    }

    /// Percent-encode a package name as website path segments (`@scope/name` keeps its `@` and `/`)
    fn encode_page_path(package_name: &str) -> String {
        package_name
            .split('/')
            .map(|segment| match segment.strip_prefix('@') {
                Some(scope) => format!("@{}", urlencoding::encode(scope)),
                None => urlencoding::encode(segment).into_owned(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// GET `url` and return the body, mapping 404 to `NotFound(subject)`
    async fn get_text(&self, url: &str, subject: &str) -> Result<String, RegistryError> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(subject.to_string()));
        }

        if !status.is_success() {
            warn!("npm returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        Ok(response.text().await?)
    }
}

impl Default for NpmRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_URL, DEFAULT_WEBSITE_URL)
    }
}

#[async_trait::async_trait]
impl Registry for NpmRegistry {
    async fn fetch_feed(&self) -> Result<String, RegistryError> {
        let url = format!("{}/-/rss", self.registry_url);
        self.get_text(&url, "rss feed").await
    }

    async fn fetch_dist_tags(
        &self,
        package_name: &str,
    ) -> Result<IndexMap<String, String>, RegistryError> {
        let encoded_name = Self::encode_package_name(package_name);
        let url = format!(
            "{}/-/package/{}/dist-tags",
            self.registry_url, encoded_name
        );

        let body = self.get_text(&url, package_name).await?;
        if body.trim().is_empty() {
            return Err(RegistryError::InvalidResponse(format!(
                "Empty dist-tags response for {}",
                package_name
            )));
        }

        let dist_tags: Option<IndexMap<String, String>> =
            serde_json::from_str(&body).map_err(|e| {
                warn!("Failed to parse dist-tags response: {}", e);
                RegistryError::InvalidResponse(e.to_string())
            })?;

        dist_tags.ok_or_else(|| {
            RegistryError::InvalidResponse(format!("No dist-tags found for {}", package_name))
        })
    }

    async fn fetch_versions_page(&self, package_name: &str) -> Result<String, RegistryError> {
        let url = format!(
            "{}/package/{}?activeTab=versions",
            self.website_url,
            Self::encode_page_path(package_name)
        );
        self.get_text(&url, package_name).await
    }
}
