use thiserror::Error;

use crate::version::error::{RegistryError, StoreError};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to fetch feed: {0}")]
    Feed(#[source] RegistryError),

    #[error("Ingestion run timed out after {0} ms")]
    Timeout(u64),
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Package queue is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Webhook returned status {0}")]
    Status(u16),
}

#[derive(Debug, Error)]
pub enum ConsumeError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
