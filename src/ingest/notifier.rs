//! Webhook notification for newly recorded packages

#[cfg(test)]
use mockall::automock;

use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::FETCH_TIMEOUT_MS;
use crate::ingest::error::NotifyError;
use crate::version::types::ResolvedPackage;

/// Trait for announcing a newly recorded package
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, package: &ResolvedPackage) -> Result<(), NotifyError>;
}

/// Request body sent to the webhook
#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    data: String,
    package: &'a str,
}

/// Posts a summary of each new package to a Slack workflow webhook
pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl SlackNotifier {
    pub fn new(webhook_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("npm-watch/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_millis(FETCH_TIMEOUT_MS as u64))
                .build()
                .expect("Failed to create HTTP client"),
            webhook_url: webhook_url.to_string(),
        }
    }

    /// Build a notifier when a webhook URL is configured
    pub fn from_webhook_url(webhook_url: Option<&str>) -> Option<Self> {
        webhook_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(Self::new)
    }
}

/// Human-readable summary of a package
pub fn format_summary(package: &ResolvedPackage) -> String {
    format!(
        "New npm package published!\nName: {}\nVersion: {}\nDescription: {}\nCreator: {}\nPublished at: {}",
        package.name,
        package.version,
        package.description,
        package.creator,
        package
            .published_at
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, package: &ResolvedPackage) -> Result<(), NotifyError> {
        let message = WebhookMessage {
            data: format_summary(package),
            package: &package.name,
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Webhook returned status {} for {}", status, package.name);
            return Err(NotifyError::Status(status.as_u16()));
        }

        debug!("Sent notification for {}@{}", package.name, package.version);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn package() -> ResolvedPackage {
        ResolvedPackage {
            name: "left-pad".to_string(),
            version: "1.3.0".to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap(),
            description: "String left pad".to_string(),
            creator: "azer".to_string(),
        }
    }

    #[test]
    fn format_summary_lists_all_fields() {
        assert_eq!(
            format_summary(&package()),
            "New npm package published!\nName: left-pad\nVersion: 1.3.0\n\
             Description: String left pad\nCreator: azer\nPublished at: 2026-10-19T10:00:00.000Z"
        );
    }

    #[test]
    fn from_webhook_url_is_disabled_without_url() {
        assert!(SlackNotifier::from_webhook_url(None).is_none());
        assert!(SlackNotifier::from_webhook_url(Some("  ")).is_none());
        assert!(SlackNotifier::from_webhook_url(Some("http://hooks.local/x")).is_some());
    }

    #[tokio::test]
    async fn notify_posts_json_summary() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/hook")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "data": format_summary(&package()),
                "package": "left-pad"
            })))
            .with_status(200)
            .create_async()
            .await;

        let notifier = SlackNotifier::new(&format!("{}/hook", server.url()));
        notifier.notify(&package()).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn notify_reports_non_success_status() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/hook")
            .with_status(500)
            .create_async()
            .await;

        let notifier = SlackNotifier::new(&format!("{}/hook", server.url()));
        let result = notifier.notify(&package()).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(NotifyError::Status(500))));
    }
}
