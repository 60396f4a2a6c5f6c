use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use serde::Serialize;
use tripwire_common::message::Message;
use tripwire_common::rule::RuleConfiguration;

use crate::broker::BrokerMessage;
use crate::metrics::worker_metrics::WorkerMetrics;
use crate::notifier::{ActionDispatcher, DispatchOutcome};
use crate::store::RuleSource;
use crate::subscription::MessageHandler;
use crate::throttle::ThrottleRegistry;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MessageReport {
    pub evaluated: usize,
    pub matched: usize,
    pub throttled: usize,
    pub dispatched: usize,
    pub failed: usize,
    pub faulted: usize,
}

impl MessageReport {
    fn merge(&mut self, other: MessageReport) {
        self.evaluated += other.evaluated;
        self.matched += other.matched;
        self.throttled += other.throttled;
        self.dispatched += other.dispatched;
        self.failed += other.failed;
        self.faulted += other.faulted;
    }
}

pub struct MessageProcessor {
    source: Arc<dyn RuleSource>,
    throttle: Arc<ThrottleRegistry>,
    dispatcher: Arc<ActionDispatcher>,
    metrics: Arc<WorkerMetrics>,
}

impl MessageProcessor {
    pub fn new(
        source: Arc<dyn RuleSource>,
        throttle: Arc<ThrottleRegistry>,
        dispatcher: Arc<ActionDispatcher>,
        metrics: Arc<WorkerMetrics>,
    ) -> Self {
        Self {
            source,
            throttle,
            dispatcher,
            metrics,
        }
    }

    pub async fn on_message(&self, topic: &str, raw: &str) -> MessageReport {
        let start = Instant::now();
        self.metrics.inc_messages_received();
        let mut report = MessageReport::default();

        let rules = match self.source.find_enabled_rules_for_topic(topic).await {
            Ok(rules) => rules,
            Err(e) => {
                tracing::warn!(%topic, error = %e, "could not load rules for message, skipping");
                return report;
            }
        };

        let message = Message::parse(raw);
        for rule in &rules {
            match AssertUnwindSafe(self.process_rule(rule, &message))
                .catch_unwind()
                .await
            {
                Ok(outcome) => report.merge(outcome),
                Err(panic) => {
                    report.faulted += 1;
                    self.metrics.inc_rule_faults();
                    tracing::error!(
                        %topic,
                        rule_id = %rule.id,
                        rule = %rule.name,
                        panic = %panic_message(panic.as_ref()),
                        "rule processing panicked, continuing with remaining rules"
                    );
                }
            }
        }

        self.metrics.record_processing_latency(start);
        report
    }

    async fn process_rule(&self, rule: &RuleConfiguration, message: &Message) -> MessageReport {
        let mut report = MessageReport {
            evaluated: 1,
            ..Default::default()
        };
        self.metrics.inc_rules_evaluated();

        if !rule.matches(message) {
            return report;
        }
        report.matched = 1;
        self.metrics.inc_rules_matched();

        let settings = self
            .throttle
            .effective(rule.throttle_period(), rule.throttle_permits);
        if !self.throttle.should_send(&rule.id, settings) {
            report.throttled = 1;
            self.metrics.inc_notifications_throttled();
            tracing::info!(rule_id = %rule.id, rule = %rule.name, "rule matched but notification throttled");
            return report;
        }

        for action in &rule.actions {
            match self.dispatcher.dispatch(action, message, rule).await {
                DispatchOutcome::Sent => report.dispatched += 1,
                DispatchOutcome::Failed | DispatchOutcome::Unsupported | DispatchOutcome::Invalid => {
                    report.failed += 1
                }
            }
        }
        report
    }
}

#[async_trait::async_trait]
impl MessageHandler for MessageProcessor {
    async fn handle(&self, message: BrokerMessage) {
        let report = self.on_message(&message.topic, &message.text()).await;
        tracing::debug!(
            topic = %message.topic,
            evaluated = report.evaluated,
            matched = report.matched,
            dispatched = report.dispatched,
            "message processed"
        );
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
