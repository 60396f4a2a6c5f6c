use std::sync::Arc;

use serde::Serialize;
use tripwire_common::message::Message;
use tripwire_common::rule::{Action, ActionKind, Provider, RuleConfiguration};
use tripwire_common::template;

use super::channel::Notifier;
use crate::metrics::worker_metrics::WorkerMetrics;

pub const WEBHOOK_URL_PARAM: &str = "webhookURL";
pub const MESSAGE_PARAM: &str = "message";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    Sent,
    Failed,
    Unsupported,
    Invalid,
}

pub struct ActionDispatcher {
    slack: Arc<dyn Notifier>,
    metrics: Arc<WorkerMetrics>,
}

impl ActionDispatcher {
    pub fn new(slack: Arc<dyn Notifier>, metrics: Arc<WorkerMetrics>) -> Self {
        Self { slack, metrics }
    }

    pub async fn dispatch(
        &self,
        action: &Action,
        message: &Message,
        rule: &RuleConfiguration,
    ) -> DispatchOutcome {
        let Some(ActionKind::Call) = action.action_kind() else {
            tracing::warn!(
                rule_id = %rule.id,
                action_type = %action.kind,
                "unsupported action type, skipping"
            );
            return DispatchOutcome::Unsupported;
        };

        match action.provider() {
            Some(Provider::Slack) => self.call(self.slack.as_ref(), action, message, rule).await,
            None => {
                tracing::warn!(
                    rule_id = %rule.id,
                    provider = action.provider_name().unwrap_or("<missing>"),
                    "unsupported notification provider, skipping"
                );
                DispatchOutcome::Unsupported
            }
        }
    }

    pub async fn dispatch_raw(
        &self,
        action: &Action,
        raw_message: &str,
        rule: &RuleConfiguration,
    ) -> DispatchOutcome {
        self.dispatch(action, &Message::parse(raw_message), rule).await
    }

    async fn call(
        &self,
        notifier: &dyn Notifier,
        action: &Action,
        message: &Message,
        rule: &RuleConfiguration,
    ) -> DispatchOutcome {
        let (Some(webhook_url), Some(template_text)) = (
            action.param_str(WEBHOOK_URL_PARAM).filter(|s| !s.is_empty()),
            action.param_str(MESSAGE_PARAM),
        ) else {
            tracing::warn!(
                rule_id = %rule.id,
                notifier = notifier.name(),
                "action is missing webhookURL or message, skipping"
            );
            return DispatchOutcome::Invalid;
        };

        let text = template::render(template_text, message);
        match notifier.send(webhook_url, &text).await {
            Ok(()) => {
                self.metrics.inc_notifications_sent();
                tracing::info!(rule_id = %rule.id, rule = %rule.name, notifier = notifier.name(), "notification sent");
                DispatchOutcome::Sent
            }
            Err(e) => {
                self.metrics.inc_notifications_failed();
                tracing::error!(rule_id = %rule.id, notifier = notifier.name(), error = %e, "notification failed");
                DispatchOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::channel::NotifyError;
    use serde_json::json;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Notifier for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn send(&self, webhook_url: &str, text: &str) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError("503".into()));
            }
            self.sent
                .lock()
                .await
                .push((webhook_url.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn rule_with(action: Action) -> RuleConfiguration {
        serde_json::from_value(json!({
            "id": "r1",
            "name": "cpu",
            "topic": "metrics",
            "rule": {"$gt": {"$field": "cpu", "$value": 80}},
            "actions": [action],
        }))
        .unwrap()
    }

    fn dispatcher(recorder: Arc<Recorder>) -> (ActionDispatcher, Arc<WorkerMetrics>) {
        let metrics = WorkerMetrics::new();
        (ActionDispatcher::new(recorder, metrics.clone()), metrics)
    }

    #[tokio::test]
    async fn slack_call_renders_template() {
        let recorder = Arc::new(Recorder::default());
        let (d, metrics) = dispatcher(recorder.clone());
        let action = Action::slack("https://hooks.slack.test/a", "CPU ${cpu} on ${host.name}");
        let rule = rule_with(action.clone());

        let outcome = d
            .dispatch_raw(&action, r#"{"cpu": 91, "host": {"name": "web-1"}}"#, &rule)
            .await;

        assert_eq!(outcome, DispatchOutcome::Sent);
        let sent = recorder.sent.lock().await;
        assert_eq!(sent[0], ("https://hooks.slack.test/a".into(), "CPU 91 on web-1".into()));
        assert_eq!(metrics.notifications_sent_val(), 1);
    }

    #[tokio::test]
    async fn type_and_provider_are_case_insensitive() {
        let recorder = Arc::new(Recorder::default());
        let (d, _) = dispatcher(recorder.clone());
        let mut action = Action::slack("https://hooks.slack.test/a", "${value}");
        action.kind = "CALL".into();
        action.params.insert("provider".into(), json!("slack"));
        let rule = rule_with(action.clone());

        assert_eq!(d.dispatch_raw(&action, "42", &rule).await, DispatchOutcome::Sent);
        assert_eq!(recorder.sent.lock().await[0].1, "42");
    }

    #[tokio::test]
    async fn unknown_type_is_unsupported() {
        let recorder = Arc::new(Recorder::default());
        let (d, _) = dispatcher(recorder.clone());
        let mut action = Action::slack("https://hooks.slack.test/a", "x");
        action.kind = "email".into();
        let rule = rule_with(action.clone());

        assert_eq!(d.dispatch_raw(&action, "1", &rule).await, DispatchOutcome::Unsupported);
        assert!(recorder.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_provider_is_unsupported() {
        let recorder = Arc::new(Recorder::default());
        let (d, _) = dispatcher(recorder.clone());
        let mut action = Action::slack("https://hooks.slack.test/a", "x");
        action.params.insert("provider".into(), json!("TEAMS"));
        let rule = rule_with(action.clone());

        assert_eq!(d.dispatch_raw(&action, "1", &rule).await, DispatchOutcome::Unsupported);

        action.params.remove("provider");
        assert_eq!(d.dispatch_raw(&action, "1", &rule).await, DispatchOutcome::Unsupported);
    }

    #[tokio::test]
    async fn missing_params_are_invalid() {
        let recorder = Arc::new(Recorder::default());
        let (d, _) = dispatcher(recorder.clone());
        let mut action = Action::slack("", "x");
        let rule = rule_with(action.clone());
        assert_eq!(d.dispatch_raw(&action, "1", &rule).await, DispatchOutcome::Invalid);

        action.params.insert(WEBHOOK_URL_PARAM.into(), json!("https://hooks.slack.test/a"));
        action.params.remove(MESSAGE_PARAM);
        assert_eq!(d.dispatch_raw(&action, "1", &rule).await, DispatchOutcome::Invalid);
    }

    #[tokio::test]
    async fn delivery_failure_is_reported_not_raised() {
        let recorder = Arc::new(Recorder {
            fail: true,
            ..Default::default()
        });
        let (d, metrics) = dispatcher(recorder);
        let action = Action::slack("https://hooks.slack.test/a", "x");
        let rule = rule_with(action.clone());

        assert_eq!(d.dispatch_raw(&action, "1", &rule).await, DispatchOutcome::Failed);
        assert_eq!(metrics.notifications_failed_val(), 1);
    }
}
