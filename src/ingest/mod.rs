//! Ingestion layer
//!
//! Moves packages from the registry feed to the notification webhook.
//!
//! ```text
//! scheduler ──▶ coordinator ──▶ queue ──▶ consumer ──▶ store / notifier
//! ```
//!
//! # Modules
//!
//! - [`coordinator`]: one ingestion run over the feed
//! - [`scheduler`]: periodic trigger with a per-run timeout
//! - [`queue`]: in-process queue between coordinator and consumer
//! - [`consumer`]: dedup gate, persistence and notification
//! - [`notifier`]: webhook notification
//! - [`error`]: Error types for the layer

pub mod consumer;
pub mod coordinator;
pub mod error;
pub mod notifier;
pub mod queue;
pub mod scheduler;

pub use consumer::{BatchSummary, QueueConsumer};
pub use coordinator::{IngestionCoordinator, RunSummary};
pub use notifier::{Notifier, SlackNotifier};
pub use queue::{ChannelQueue, PackageQueue, PackageReceiver};
