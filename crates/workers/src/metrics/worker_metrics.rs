use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Default)]
pub struct WorkerMetrics {
    messages_received: AtomicU64,
    rules_evaluated: AtomicU64,
    rules_matched: AtomicU64,
    rule_faults: AtomicU64,
    notifications_throttled: AtomicU64,
    notifications_sent: AtomicU64,
    notifications_failed: AtomicU64,
    subscribe_failures: AtomicU64,
    reconcile_runs: AtomicU64,
    active_subscriptions: AtomicU64,
    processing_latency_sum_us: AtomicU64,
    processing_latency_count: AtomicU64,
}

impl WorkerMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_messages_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rules_evaluated(&self) {
        self.rules_evaluated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rules_matched(&self) {
        self.rules_matched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rule_faults(&self) {
        self.rule_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_notifications_throttled(&self) {
        self.notifications_throttled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_notifications_sent(&self) {
        self.notifications_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_notifications_failed(&self) {
        self.notifications_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_subscribe_failures(&self) {
        self.subscribe_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_reconcile_runs(&self) {
        self.reconcile_runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_active_subscriptions(&self, count: usize) {
        self.active_subscriptions
            .store(count as u64, Ordering::Relaxed);
    }

    pub fn record_processing_latency(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.processing_latency_sum_us
            .fetch_add(us, Ordering::Relaxed);
        self.processing_latency_count
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn messages_received_val(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }

    pub fn rules_evaluated_val(&self) -> u64 {
        self.rules_evaluated.load(Ordering::Relaxed)
    }

    pub fn rules_matched_val(&self) -> u64 {
        self.rules_matched.load(Ordering::Relaxed)
    }

    pub fn rule_faults_val(&self) -> u64 {
        self.rule_faults.load(Ordering::Relaxed)
    }

    pub fn notifications_throttled_val(&self) -> u64 {
        self.notifications_throttled.load(Ordering::Relaxed)
    }

    pub fn notifications_sent_val(&self) -> u64 {
        self.notifications_sent.load(Ordering::Relaxed)
    }

    pub fn notifications_failed_val(&self) -> u64 {
        self.notifications_failed.load(Ordering::Relaxed)
    }

    pub fn subscribe_failures_val(&self) -> u64 {
        self.subscribe_failures.load(Ordering::Relaxed)
    }

    pub fn reconcile_runs_val(&self) -> u64 {
        self.reconcile_runs.load(Ordering::Relaxed)
    }

    pub fn active_subscriptions_val(&self) -> u64 {
        self.active_subscriptions.load(Ordering::Relaxed)
    }

    pub fn processing_latency_vals(&self) -> (u64, u64) {
        (
            self.processing_latency_sum_us.load(Ordering::Relaxed),
            self.processing_latency_count.load(Ordering::Relaxed),
        )
    }
}
