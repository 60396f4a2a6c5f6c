use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::manager::{ReconcileReport, SubscriptionManager};
use crate::store::RuleSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicHint {
    Added(String),
    Removed(String),
}

#[derive(Clone)]
pub struct TopicHints {
    tx: mpsc::UnboundedSender<TopicHint>,
}

impl TopicHints {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TopicHint>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn notify_topic_added(&self, topic: &str) {
        self.send(TopicHint::Added(topic.to_string()));
    }

    pub fn notify_topic_removed(&self, topic: &str) {
        self.send(TopicHint::Removed(topic.to_string()));
    }

    fn send(&self, hint: TopicHint) {
        if self.tx.send(hint).is_err() {
            tracing::debug!("reconciler is not running, topic hint dropped");
        }
    }
}

pub struct Reconciler {
    manager: Arc<SubscriptionManager>,
    source: Arc<dyn RuleSource>,
    interval: Duration,
    hints: mpsc::UnboundedReceiver<TopicHint>,
}

impl Reconciler {
    pub fn new(
        manager: Arc<SubscriptionManager>,
        source: Arc<dyn RuleSource>,
        interval: Duration,
        hints: mpsc::UnboundedReceiver<TopicHint>,
    ) -> Self {
        Self {
            manager,
            source,
            interval,
            hints,
        }
    }

    pub async fn reconcile_once(&self) -> Option<ReconcileReport> {
        match self.source.list_enabled_rule_topics().await {
            Ok(topics) => Some(self.manager.reconcile(&topics).await),
            Err(e) => {
                tracing::warn!(error = %e, "could not list rule topics, keeping current subscriptions");
                None
            }
        }
    }

    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(mut self, shutdown: CancellationToken) {
        self.reconcile_once().await;

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        let mut hints_open = true;
        loop {
            let hinted = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => None,
                hint = self.hints.recv(), if hints_open => match hint {
                    Some(hint) => Some(hint),
                    None => {
                        hints_open = false;
                        continue;
                    }
                },
            };
            if let Some(hint) = hinted {
                let coalesced = self.drain_hints();
                tracing::debug!(?hint, coalesced, "topic hint received");
            }
            self.reconcile_once().await;
        }
        tracing::info!("reconciler stopped");
    }

    fn drain_hints(&mut self) -> usize {
        let mut drained = 0;
        while self.hints.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{BrokerMessage, InMemoryBroker};
    use crate::metrics::worker_metrics::WorkerMetrics;
    use crate::store::ConfigError;
    use crate::subscription::MessageHandler;
    use std::collections::BTreeSet;
    use std::sync::Mutex as StdMutex;
    use tripwire_common::rule::RuleConfiguration;

    struct Ignore;

    #[async_trait::async_trait]
    impl MessageHandler for Ignore {
        async fn handle(&self, _message: BrokerMessage) {}
    }

    #[derive(Default)]
    struct Topics(StdMutex<BTreeSet<String>>);

    impl Topics {
        fn set(&self, names: &[&str]) {
            if let Ok(mut t) = self.0.lock() {
                *t = names.iter().map(|s| s.to_string()).collect();
            }
        }
    }

    #[async_trait::async_trait]
    impl RuleSource for Topics {
        async fn list_enabled_rule_topics(&self) -> Result<BTreeSet<String>, ConfigError> {
            self.0
                .lock()
                .map(|t| t.clone())
                .map_err(|e| ConfigError::Unavailable(e.to_string()))
        }

        async fn find_enabled_rules_for_topic(
            &self,
            _topic: &str,
        ) -> Result<Vec<RuleConfiguration>, ConfigError> {
            Ok(Vec::new())
        }
    }

    fn setup(interval: Duration) -> (Reconciler, Arc<SubscriptionManager>, Arc<Topics>, TopicHints) {
        let manager = Arc::new(SubscriptionManager::new(
            Arc::new(InMemoryBroker::new()),
            Arc::new(Ignore),
            "g",
            Duration::from_secs(1),
            WorkerMetrics::new(),
        ));
        let topics = Arc::new(Topics::default());
        let (hints, rx) = TopicHints::channel();
        let reconciler = Reconciler::new(manager.clone(), topics.clone(), interval, rx);
        (reconciler, manager, topics, hints)
    }

    async fn wait_for(manager: &SubscriptionManager, expected: &[&str]) {
        let expected: BTreeSet<String> = expected.iter().map(|s| s.to_string()).collect();
        tokio::time::timeout(Duration::from_secs(2), async {
            while manager.active_subscriptions() != expected {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn reconcile_once_follows_source() {
        let (reconciler, manager, topics, _hints) = setup(Duration::from_secs(60));
        topics.set(&["a", "b"]);
        let report = reconciler.reconcile_once().await.unwrap();
        assert_eq!(report.added.len(), 2);
        assert!(manager.is_subscribed("a"));
    }

    #[tokio::test]
    async fn initial_reconcile_runs_on_start() {
        let (reconciler, manager, topics, _hints) = setup(Duration::from_secs(3600));
        topics.set(&["boot"]);
        let shutdown = CancellationToken::new();
        let handle = reconciler.spawn(shutdown.clone());

        wait_for(&manager, &["boot"]).await;
        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn hints_trigger_immediate_reconcile() {
        let (reconciler, manager, topics, hints) = setup(Duration::from_secs(3600));
        let shutdown = CancellationToken::new();
        let handle = reconciler.spawn(shutdown.clone());

        topics.set(&["new"]);
        hints.notify_topic_added("new");
        wait_for(&manager, &["new"]).await;

        topics.set(&[]);
        hints.notify_topic_removed("new");
        wait_for(&manager, &[]).await;

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn periodic_poll_picks_up_changes() {
        let (reconciler, manager, topics, _hints) = setup(Duration::from_millis(20));
        let shutdown = CancellationToken::new();
        let handle = reconciler.spawn(shutdown.clone());

        topics.set(&["polled"]);
        wait_for(&manager, &["polled"]).await;

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn keeps_polling_after_hint_senders_drop() {
        let (reconciler, manager, topics, hints) = setup(Duration::from_millis(20));
        drop(hints);
        let shutdown = CancellationToken::new();
        let handle = reconciler.spawn(shutdown.clone());

        topics.set(&["late"]);
        wait_for(&manager, &["late"]).await;

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[test]
    fn hint_without_reconciler_is_dropped_quietly() {
        let (hints, rx) = TopicHints::channel();
        drop(rx);
        hints.notify_topic_added("a");
    }
}
