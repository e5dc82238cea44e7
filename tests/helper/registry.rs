//! Registry test utilities

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use npm_watch::ingest::error::NotifyError;
use npm_watch::ingest::notifier::Notifier;
use npm_watch::version::error::RegistryError;
use npm_watch::version::registry::Registry;
use npm_watch::version::types::ResolvedPackage;

/// In-memory registry for testing
#[derive(Default)]
pub struct MockRegistry {
    feed: Option<String>,
    dist_tags: HashMap<String, IndexMap<String, String>>,
    pages: HashMap<String, String>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, feed: String) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn with_dist_tags(mut self, package: &str, tags: &[(&str, &str)]) -> Self {
        self.dist_tags.insert(
            package.to_string(),
            tags.iter()
                .map(|(tag, version)| (tag.to_string(), version.to_string()))
                .collect(),
        );
        self
    }

    pub fn with_versions_page(mut self, package: &str, html: String) -> Self {
        self.pages.insert(package.to_string(), html);
        self
    }
}

#[async_trait]
impl Registry for MockRegistry {
    async fn fetch_feed(&self) -> Result<String, RegistryError> {
        self.feed
            .clone()
            .ok_or_else(|| RegistryError::InvalidResponse("Unexpected status: 503".to_string()))
    }

    async fn fetch_dist_tags(
        &self,
        package_name: &str,
    ) -> Result<IndexMap<String, String>, RegistryError> {
        self.dist_tags
            .get(package_name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(package_name.to_string()))
    }

    async fn fetch_versions_page(&self, package_name: &str) -> Result<String, RegistryError> {
        self.pages
            .get(package_name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(package_name.to_string()))
    }
}

/// Notifier that remembers every package it was asked to announce
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<ResolvedPackage>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|p| (p.name.clone(), p.version.clone()))
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, package: &ResolvedPackage) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(package.clone());
        Ok(())
    }
}

/// RSS document announcing `(name, pubDate)` items in order
pub fn rss_feed(items: &[(&str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(name, published)| {
            format!(
                "<item><title><![CDATA[{name}]]></title>\
                 <link>https://www.npmjs.com/package/{name}</link>\
                 <pubDate>{published}</pubDate>\
                 <description><![CDATA[{name} description]]></description>\
                 <dc:creator><![CDATA[{name}-author]]></dc:creator></item>"
            )
        })
        .collect();
    format!(r#"<?xml version="1.0"?><rss><channel><title>npm</title>{items}</channel></rss>"#)
}

/// Versions tab markup listing `(version, published)` rows
pub fn versions_page(rows: &[(&str, DateTime<Utc>)]) -> String {
    let rows: String = rows
        .iter()
        .map(|(version, published)| {
            format!(
                r#"<tr><td><a class="code black-80" href="/package/x/v/{version}">{version}</a></td><td>12</td><td><time datetime="{}" title="x">ago</time></td></tr>"#,
                published.to_rfc3339()
            )
        })
        .collect();
    format!(
        "<html><body><h3>Version History</h3><table><thead><tr><th>Version</th></tr></thead><tbody>{rows}</tbody></table></body></html>"
    )
}
