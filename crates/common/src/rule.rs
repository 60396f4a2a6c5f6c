use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::expression::Expression;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleConfiguration {
    pub id: String,
    pub name: String,
    pub topic: String,
    pub rule: RuleExpression,
    pub actions: Vec<Action>,
    #[serde(default = "yes")]
    pub enabled: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub throttle_period_minutes: Option<u64>,
    #[serde(default)]
    pub throttle_permits: Option<u32>,
    #[serde(default)]
    pub created_at_ms: i64,
    #[serde(default)]
    pub updated_at_ms: i64,
}

impl RuleConfiguration {
    pub fn throttle_period(&self) -> Option<Duration> {
        self.throttle_period_minutes
            .map(|m| Duration::from_secs(m.saturating_mul(60)))
    }

    pub fn matches(&self, message: &crate::message::Message) -> bool {
        crate::evaluator::evaluate(self.rule.expression(), message)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewRule {
    pub name: String,
    pub topic: String,
    pub rule: RuleExpression,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default = "yes")]
    pub enabled: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub throttle_period_minutes: Option<u64>,
    #[serde(default)]
    pub throttle_permits: Option<u32>,
}

impl NewRule {
    pub fn into_configuration(self, id: String, now_ms: i64) -> RuleConfiguration {
        RuleConfiguration {
            id,
            name: self.name,
            topic: self.topic,
            rule: self.rule,
            actions: self.actions,
            enabled: self.enabled,
            description: self.description,
            throttle_period_minutes: self.throttle_period_minutes,
            throttle_permits: self.throttle_permits,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct RuleExpression {
    raw: Value,
    compiled: Expression,
}

impl RuleExpression {
    pub fn new(raw: Value) -> Self {
        let compiled = Expression::parse(&raw);
        Self { raw, compiled }
    }

    pub fn expression(&self) -> &Expression {
        &self.compiled
    }
}

impl PartialEq for RuleExpression {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl From<Value> for RuleExpression {
    fn from(raw: Value) -> Self {
        Self::new(raw)
    }
}

impl From<RuleExpression> for Value {
    fn from(expr: RuleExpression) -> Self {
        expr.raw
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Call,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Slack,
}

impl ActionKind {
    pub fn parse(kind: &str) -> Option<Self> {
        kind.eq_ignore_ascii_case("call").then_some(Self::Call)
    }
}

impl Provider {
    pub fn parse(name: &str) -> Option<Self> {
        name.eq_ignore_ascii_case("slack").then_some(Self::Slack)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slack => "SLACK",
        }
    }
}

impl Action {
    pub fn action_kind(&self) -> Option<ActionKind> {
        ActionKind::parse(&self.kind)
    }

    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }

    pub fn provider_name(&self) -> Option<&str> {
        self.param_str("provider")
    }

    pub fn provider(&self) -> Option<Provider> {
        self.provider_name().and_then(Provider::parse)
    }

    pub fn slack(webhook_url: &str, message: &str) -> Self {
        let mut params = Map::new();
        params.insert("provider".into(), Value::String(Provider::Slack.as_str().into()));
        params.insert("webhookURL".into(), Value::String(webhook_url.into()));
        params.insert("message".into(), Value::String(message.into()));
        Self {
            kind: "call".into(),
            params,
        }
    }
}

fn yes() -> bool {
    true
}
