use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;
use tripwire_common::nats_config::is_valid_topic;

use super::worker::TopicWorker;
use super::MessageHandler;
use crate::broker::Broker;
use crate::metrics::worker_metrics::WorkerMetrics;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub failed: Vec<String>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.failed.is_empty()
    }
}

pub struct SubscriptionManager {
    broker: Arc<dyn Broker>,
    handler: Arc<dyn MessageHandler>,
    consumer_group: String,
    stop_timeout: Duration,
    workers: DashMap<String, Arc<TopicWorker>>,
    topic_locks: DashMap<String, Arc<Mutex<()>>>,
    reconcile_lock: Mutex<()>,
    metrics: Arc<WorkerMetrics>,
}

impl SubscriptionManager {
    pub fn new(
        broker: Arc<dyn Broker>,
        handler: Arc<dyn MessageHandler>,
        consumer_group: impl Into<String>,
        stop_timeout: Duration,
        metrics: Arc<WorkerMetrics>,
    ) -> Self {
        Self {
            broker,
            handler,
            consumer_group: consumer_group.into(),
            stop_timeout,
            workers: DashMap::new(),
            topic_locks: DashMap::new(),
            reconcile_lock: Mutex::new(()),
            metrics,
        }
    }

    pub fn consumer_group(&self) -> &str {
        &self.consumer_group
    }

    pub async fn reconcile(&self, required: &BTreeSet<String>) -> ReconcileReport {
        let _serial = self.reconcile_lock.lock().await;
        self.prune_finished();

        let active = self.active_subscriptions();
        let mut report = ReconcileReport::default();

        for topic in active.difference(required) {
            if self.unsubscribe(topic).await {
                report.removed.push(topic.clone());
            }
        }
        for topic in required.difference(&active) {
            if self.subscribe(topic).await {
                report.added.push(topic.clone());
            } else {
                report.failed.push(topic.clone());
            }
        }

        self.metrics.inc_reconcile_runs();
        if !report.is_noop() {
            tracing::info!(
                added = ?report.added,
                removed = ?report.removed,
                failed = ?report.failed,
                active = self.workers.len(),
                "subscriptions reconciled"
            );
        }
        report
    }

    pub async fn subscribe(&self, topic: &str) -> bool {
        let lock = self.topic_lock(topic);
        let held = lock.lock().await;
        let subscribed = self.subscribe_locked(topic).await;
        drop(held);
        if !subscribed {
            self.release_topic_lock(topic, lock);
        }
        subscribed
    }

    async fn subscribe_locked(&self, topic: &str) -> bool {
        let stale = match self.workers.get(topic) {
            Some(worker) if !worker.is_finished() => return true,
            Some(_) => true,
            None => false,
        };
        if stale {
            self.workers.remove(topic);
        }

        if !is_valid_topic(topic) {
            tracing::warn!(%topic, "refusing to subscribe to invalid topic");
            self.metrics.inc_subscribe_failures();
            return false;
        }

        match self.broker.subscribe(topic, &self.consumer_group).await {
            Ok(stream) => {
                let worker = TopicWorker::spawn(topic.to_string(), stream, self.handler.clone());
                self.workers.insert(topic.to_string(), Arc::new(worker));
                self.metrics.set_active_subscriptions(self.workers.len());
                tracing::info!(%topic, group = %self.consumer_group, "subscribed");
                true
            }
            Err(e) => {
                self.metrics.inc_subscribe_failures();
                tracing::warn!(%topic, error = %e, "subscribe failed, will retry on next reconcile");
                false
            }
        }
    }

    pub async fn unsubscribe(&self, topic: &str) -> bool {
        let lock = self.topic_lock(topic);
        let held = lock.lock().await;

        let Some(worker) = self.workers.get(topic).map(|w| w.value().clone()) else {
            drop(held);
            self.release_topic_lock(topic, lock);
            return false;
        };

        let clean = worker.stop(self.stop_timeout).await;
        self.workers.remove(topic);
        self.metrics.set_active_subscriptions(self.workers.len());
        tracing::info!(%topic, clean, uptime_s = worker.uptime().as_secs(), "unsubscribed");
        drop(held);
        self.release_topic_lock(topic, lock);
        true
    }

    pub fn active_subscriptions(&self) -> BTreeSet<String> {
        self.workers
            .iter()
            .filter(|w| !w.value().is_finished())
            .map(|w| w.key().clone())
            .collect()
    }

    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.workers
            .get(topic)
            .is_some_and(|w| !w.value().is_finished())
    }

    pub async fn shutdown(&self) {
        let topics: Vec<String> = self.workers.iter().map(|w| w.key().clone()).collect();
        futures::future::join_all(topics.iter().map(|t| self.unsubscribe(t))).await;
        tracing::info!(stopped = topics.len(), "subscription manager shut down");
    }

    fn prune_finished(&self) {
        let mut pruned = Vec::new();
        self.workers.retain(|topic, worker| {
            if worker.is_finished() {
                tracing::warn!(%topic, "pruning dead topic worker");
                pruned.push(topic.clone());
                false
            } else {
                true
            }
        });
        for topic in &pruned {
            self.forget_idle_lock(topic);
        }
        self.metrics.set_active_subscriptions(self.workers.len());
    }

    fn release_topic_lock(&self, topic: &str, lock: Arc<Mutex<()>>) {
        drop(lock);
        self.forget_idle_lock(topic);
    }

    fn forget_idle_lock(&self, topic: &str) {
        self.topic_locks
            .remove_if(topic, |_, l| Arc::strong_count(l) == 1 && !self.workers.contains_key(topic));
    }

    pub fn tracked_topic_locks(&self) -> usize {
        self.topic_locks.len()
    }

    fn topic_lock(&self, topic: &str) -> Arc<Mutex<()>> {
        self.topic_locks
            .entry(topic.to_string())
            .or_default()
            .value()
            .clone()
    }
}
