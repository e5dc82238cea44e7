//! Package queue between the scheduled run and the consumer
//!
//! The producer only waits until a message is accepted by the channel; it
//! never waits for the consumer to process it.

#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::ingest::error::QueueError;
use crate::version::types::ResolvedPackage;

/// Trait for sending resolved packages downstream
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PackageQueue: Send + Sync {
    async fn send(&self, package: ResolvedPackage) -> Result<(), QueueError>;
}

/// Bounded in-process queue backed by a tokio channel
#[derive(Clone)]
pub struct ChannelQueue {
    sender: mpsc::Sender<ResolvedPackage>,
}

/// Receiving side of a [`ChannelQueue`], yielding batches
pub struct PackageReceiver {
    receiver: mpsc::Receiver<ResolvedPackage>,
    batch_size: usize,
}

impl ChannelQueue {
    /// Create a queue holding up to `capacity` messages, delivered in batches of `batch_size`
    pub fn new(capacity: usize, batch_size: usize) -> (Self, PackageReceiver) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self { sender },
            PackageReceiver {
                receiver,
                batch_size: batch_size.max(1),
            },
        )
    }
}

#[async_trait]
impl PackageQueue for ChannelQueue {
    async fn send(&self, package: ResolvedPackage) -> Result<(), QueueError> {
        self.sender
            .send(package)
            .await
            .map_err(|_| QueueError::Closed)
    }
}

impl PackageReceiver {
    /// Wait for the next batch; `None` once every sender is gone and the queue is drained
    pub async fn next_batch(&mut self) -> Option<Vec<ResolvedPackage>> {
        let mut batch = Vec::with_capacity(self.batch_size);
        let received = self.receiver.recv_many(&mut batch, self.batch_size).await;
        (received > 0).then_some(batch)
    }
}
