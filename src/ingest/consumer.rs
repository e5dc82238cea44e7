//! Queue consumer: dedup gate, persistence and notification
//!
//! Every message is handled on its own. A failure while processing one
//! message is logged and counted, and the rest of the batch still runs.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::ingest::error::ConsumeError;
use crate::ingest::notifier::Notifier;
use crate::ingest::queue::PackageReceiver;
use crate::version::store::PackageStore;
use crate::version::types::ResolvedPackage;

/// Result of processing one queued package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Newly recorded
    Saved { notified: bool },
    /// Already recorded earlier
    Duplicate,
}

/// Counts for one processed batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub saved: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub notifications_failed: usize,
}

pub struct QueueConsumer<S: PackageStore> {
    store: Arc<S>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl<S: PackageStore> QueueConsumer<S> {
    pub fn new(store: Arc<S>, notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self { store, notifier }
    }

    /// Drain `receiver` until every producer has gone away
    pub async fn run(&self, mut receiver: PackageReceiver) {
        while let Some(batch) = receiver.next_batch().await {
            self.process_batch(batch).await;
        }
        debug!("Queue consumer: queue closed");
    }

    pub async fn process_batch(&self, batch: Vec<ResolvedPackage>) -> BatchSummary {
        info!(
            "Queue consumer: Processing batch of {} messages",
            batch.len()
        );

        let mut summary = BatchSummary::default();
        for package in &batch {
            match self.process_message(package).await {
                Ok(MessageOutcome::Saved { notified }) => {
                    summary.saved += 1;
                    if !notified && self.notifier.is_some() {
                        summary.notifications_failed += 1;
                    }
                }
                Ok(MessageOutcome::Duplicate) => summary.duplicates += 1,
                Err(e) => {
                    error!(
                        "Queue consumer: Error processing {}@{}: {}",
                        package.name, package.version, e
                    );
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    pub async fn process_message(
        &self,
        package: &ResolvedPackage,
    ) -> Result<MessageOutcome, ConsumeError> {
        if self.store.exists(&package.name, &package.version)? {
            debug!(
                "Package {} version {} already exists in database",
                package.name, package.version
            );
            return Ok(MessageOutcome::Duplicate);
        }

        // Another consumer may have recorded the pair since the check
        if !self
            .store
            .save(&package.name, &package.version, package.published_at)?
        {
            return Ok(MessageOutcome::Duplicate);
        }
        info!(
            "Queue consumer: Package: {} - {} saved to database",
            package.name, package.version
        );

        let notified = match &self.notifier {
            Some(notifier) => notifier
                .notify(package)
                .await
                .inspect_err(|e| {
                    error!(
                        "Queue consumer: Failed to notify for {}@{}: {}",
                        package.name, package.version, e
                    )
                })
                .is_ok(),
            None => false,
        };

        Ok(MessageOutcome::Saved { notified })
    }
}
