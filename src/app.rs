//! Wiring of the long-running service and the one-shot commands

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::{BulkStrategy, Config};
use crate::ingest::consumer::QueueConsumer;
use crate::ingest::coordinator::{IngestionCoordinator, RunSummary};
use crate::ingest::notifier::{Notifier, SlackNotifier};
use crate::ingest::queue::{ChannelQueue, PackageReceiver};
use crate::ingest::scheduler::{run_schedule, run_with_timeout};
use crate::server::{self, AppState};
use crate::version::registries::NpmRegistry;
use crate::version::registry::Registry;
use crate::version::resolver::VersionResolver;
use crate::version::resolvers::{DistTagResolver, VersionsPageResolver};
use crate::version::store::SqliteStore;
use crate::version::types::RankedVersions;

/// Registry client for the configured endpoints
pub fn registry(config: &Config) -> Arc<dyn Registry> {
    Arc::new(NpmRegistry::new(
        &config.registry.registry_url,
        &config.registry.website_url,
    ))
}

/// Resolver used by scheduled runs
pub fn bulk_resolver(
    strategy: BulkStrategy,
    registry: Arc<dyn Registry>,
) -> Arc<dyn VersionResolver> {
    match strategy {
        BulkStrategy::DistTags => Arc::new(DistTagResolver::new(registry)),
        BulkStrategy::VersionsPage => Arc::new(VersionsPageResolver::new(registry)),
    }
}

fn notifier(config: &Config) -> Option<Arc<dyn Notifier>> {
    let notifier = SlackNotifier::from_webhook_url(config.notification.webhook_url.as_deref());
    if notifier.is_none() {
        warn!("No webhook URL configured, notifications are disabled");
    }
    notifier.map(|n| Arc::new(n) as Arc<dyn Notifier>)
}

fn open_store(config: &Config) -> anyhow::Result<Arc<SqliteStore>> {
    let db_path = config.resolved_db_path();
    if let Some(dir) = db_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory {:?}", dir))?;
    }
    info!("Opening package store at {:?}", db_path);

    let store = SqliteStore::new(&db_path)
        .with_context(|| format!("Failed to open database {:?}", db_path))?;
    Ok(Arc::new(store))
}

/// Queue, consumer task and coordinator sharing one store
struct Pipeline {
    coordinator: Arc<IngestionCoordinator>,
    consumer: tokio::task::JoinHandle<()>,
}

impl Pipeline {
    fn start(config: &Config, registry: Arc<dyn Registry>) -> anyhow::Result<Self> {
        let store = open_store(config)?;
        let (queue, receiver) = ChannelQueue::new(config.queue.capacity, config.queue.batch_size);

        let consumer = spawn_consumer(QueueConsumer::new(store, notifier(config)), receiver);
        let coordinator = Arc::new(IngestionCoordinator::new(
            registry.clone(),
            bulk_resolver(config.bulk_strategy, registry),
            Arc::new(queue),
        ));

        Ok(Self {
            coordinator,
            consumer,
        })
    }

    /// Release the producer side and wait until the consumer drained the queue
    async fn finish(self) -> anyhow::Result<()> {
        drop(self.coordinator);
        self.consumer.await.context("Queue consumer task failed")
    }
}

fn spawn_consumer(
    consumer: QueueConsumer<SqliteStore>,
    receiver: PackageReceiver,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move { consumer.run(receiver).await })
}

/// Run the scheduler, the queue consumer and the HTTP endpoint until Ctrl-C
pub async fn serve(config: Config, listen: &str) -> anyhow::Result<()> {
    let registry = registry(&config);
    let pipeline = Pipeline::start(&config, registry.clone())?;
    let run_timeout = Duration::from_millis(config.schedule.run_timeout);

    let scheduler = tokio::spawn(run_schedule(
        pipeline.coordinator.clone(),
        Duration::from_millis(config.schedule.interval),
        run_timeout,
    ));

    let state = AppState {
        versions: Arc::new(VersionsPageResolver::new(registry)),
        coordinator: pipeline.coordinator.clone(),
        run_timeout,
    };

    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind {}", listen))?;
    server::serve(listener, server::router(state), shutdown_signal()).await?;

    scheduler.abort();
    // Cancelled is the expected outcome; the task only has to release its coordinator
    let _ = scheduler.await;

    pipeline.finish().await?;
    info!("Shut down");
    Ok(())
}

/// Run a single ingestion pass and wait for every queued package to be processed
pub async fn run_once(config: Config) -> anyhow::Result<RunSummary> {
    let pipeline = Pipeline::start(&config, registry(&config))?;

    let result = run_with_timeout(
        &pipeline.coordinator,
        Duration::from_millis(config.schedule.run_timeout),
    )
    .await;

    pipeline.finish().await?;
    Ok(result?)
}

/// Rank all versions of `package` by closeness to now
pub async fn query(config: &Config, package: &str) -> anyhow::Result<RankedVersions> {
    let resolver = VersionsPageResolver::new(registry(config));
    Ok(resolver.ranked_versions(package).await?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
