use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::{self, AppState};
use crate::broker::{Broker, NatsBroker};
use crate::config::WorkerConfig;
use crate::metrics::worker_metrics::WorkerMetrics;
use crate::notifier::{ActionDispatcher, Notifier, SlackNotifier};
use crate::processor::MessageProcessor;
use crate::store::{load_rules_file, RuleStore};
use crate::subscription::{Reconciler, SubscriptionManager, TopicHints};
use crate::throttle::ThrottleRegistry;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub struct Components {
    pub metrics: Arc<WorkerMetrics>,
    pub rules: RuleStore,
    pub throttle: Arc<ThrottleRegistry>,
    pub processor: Arc<MessageProcessor>,
    pub manager: Arc<SubscriptionManager>,
    pub hints: TopicHints,
    pub reconciler: Reconciler,
}

impl Components {
    pub fn build(config: &WorkerConfig, broker: Arc<dyn Broker>, slack: Arc<dyn Notifier>) -> Self {
        let metrics = WorkerMetrics::new();
        let rules = RuleStore::new();
        let throttle = Arc::new(ThrottleRegistry::new(config.throttle.settings()));
        let dispatcher = Arc::new(ActionDispatcher::new(slack, metrics.clone()));
        let processor = Arc::new(MessageProcessor::new(
            Arc::new(rules.clone()),
            throttle.clone(),
            dispatcher,
            metrics.clone(),
        ));
        let manager = Arc::new(SubscriptionManager::new(
            broker,
            processor.clone(),
            config.consumer_group.clone(),
            config.reconcile.stop_timeout(),
            metrics.clone(),
        ));
        let (hints, hint_rx) = TopicHints::channel();
        let reconciler = Reconciler::new(
            manager.clone(),
            Arc::new(rules.clone()),
            config.reconcile.interval(),
            hint_rx,
        );

        Self {
            metrics,
            rules,
            throttle,
            processor,
            manager,
            hints,
            reconciler,
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            metrics: self.metrics.clone(),
            manager: self.manager.clone(),
            throttle: self.throttle.clone(),
            rules: self.rules.clone(),
            hints: self.hints.clone(),
        }
    }
}

pub async fn run(config: WorkerConfig) -> Result<(), BoxError> {
    tracing::info!(
        nats_url = %config.nats_url,
        group = %config.consumer_group,
        api_addr = %config.api_addr,
        reconcile_interval_s = config.reconcile.interval_seconds,
        "worker configured"
    );

    tracing::info!(url = %config.nats_url, "connecting to NATS");
    let broker = Arc::new(NatsBroker::connect(&config.nats_url).await?);
    let slack = Arc::new(SlackNotifier::new(config.notifier.timeout())?);
    let components = Components::build(&config, broker, slack);

    if let Some(path) = &config.rules_file {
        let seeded = components.rules.seed(load_rules_file(path)?).await;
        tracing::info!(path = %path.display(), seeded, "rules loaded");
    }

    let shutdown = CancellationToken::new();
    let listener = TcpListener::bind(&config.api_addr).await?;
    tracing::info!(api_addr = %config.api_addr, "worker API server starting");

    let state = components.app_state();
    let api_shutdown = shutdown.clone();
    let api_handle = tokio::spawn(async move { api::serve(listener, state, api_shutdown).await });

    let Components {
        manager, reconciler, ..
    } = components;
    let mut reconciler_handle = reconciler.spawn(shutdown.clone());

    let reconciler_running = tokio::select! {
        _ = crate::shutdown::wait_for_shutdown() => {
            tracing::info!("shutdown signal received");
            true
        }
        r = &mut reconciler_handle => {
            if let Err(e) = r {
                tracing::error!("reconciler join: {e}");
            }
            false
        }
    };

    shutdown.cancel();
    if reconciler_running {
        stop_reconciler(reconciler_handle, config.reconcile.stop_timeout()).await;
    }
    manager.shutdown().await;
    match api_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("API: {e}"),
        Err(e) => tracing::error!("API join: {e}"),
    }

    tracing::info!("worker stopped");
    Ok(())
}

async fn stop_reconciler(mut handle: JoinHandle<()>, timeout: Duration) {
    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("reconciler join: {e}"),
        Err(_) => {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "reconciler did not stop in time, aborting");
            handle.abort();
            let _ = handle.await;
        }
    }
}
