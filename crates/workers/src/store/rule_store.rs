use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tripwire_common::nats_config::is_valid_topic;
use tripwire_common::rule::{NewRule, RuleConfiguration};

use super::error::ConfigError;
use super::source::RuleSource;

#[derive(Clone)]
pub struct RuleStore {
    rules: Arc<DashMap<String, RuleConfiguration>>,
    write_lock: Arc<Mutex<()>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleChange {
    pub before: Option<RuleConfiguration>,
    pub after: Option<RuleConfiguration>,
}

impl RuleChange {
    pub fn topic_added(&self) -> Option<&str> {
        self.after
            .as_ref()
            .filter(|r| r.enabled)
            .map(|r| r.topic.as_str())
    }

    pub fn topic_removed(&self) -> Option<&str> {
        let before = self.before.as_ref()?;
        let still_served = self
            .after
            .as_ref()
            .is_some_and(|after| after.enabled && after.topic == before.topic);
        (!still_served).then_some(before.topic.as_str())
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleStore {
    pub fn new() -> Self {
        Self {
            rules: Arc::new(DashMap::new()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn create(&self, new: NewRule) -> Result<RuleConfiguration, ConfigError> {
        validate(&new)?;
        let _write = self.write_lock.lock().await;
        self.ensure_unique(&new.name, &new.topic, None)?;

        let record = new.into_configuration(uuid::Uuid::new_v4().to_string(), now_ms());
        self.rules.insert(record.id.clone(), record.clone());
        tracing::info!(rule_id = %record.id, rule = %record.name, topic = %record.topic, "rule created");
        Ok(record)
    }

    pub async fn update(&self, id: &str, new: NewRule) -> Result<RuleChange, ConfigError> {
        validate(&new)?;
        let _write = self.write_lock.lock().await;
        let existing = self
            .get(id)
            .ok_or_else(|| ConfigError::NotFound(id.to_string()))?;
        self.ensure_unique(&new.name, &new.topic, Some(id))?;

        let mut updated = new.into_configuration(existing.id.clone(), now_ms());
        updated.created_at_ms = existing.created_at_ms;
        self.rules.insert(updated.id.clone(), updated.clone());
        tracing::info!(rule_id = %id, rule = %updated.name, topic = %updated.topic, "rule updated");

        Ok(RuleChange {
            before: Some(existing),
            after: Some(updated),
        })
    }

    pub async fn delete(&self, id: &str) -> Result<RuleChange, ConfigError> {
        let _write = self.write_lock.lock().await;
        let (_, removed) = self
            .rules
            .remove(id)
            .ok_or_else(|| ConfigError::NotFound(id.to_string()))?;
        tracing::info!(rule_id = %id, topic = %removed.topic, "rule deleted");

        Ok(RuleChange {
            before: Some(removed),
            after: None,
        })
    }

    pub async fn toggle(&self, id: &str) -> Result<RuleChange, ConfigError> {
        let _write = self.write_lock.lock().await;
        let existing = self
            .get(id)
            .ok_or_else(|| ConfigError::NotFound(id.to_string()))?;

        let mut toggled = existing.clone();
        toggled.enabled = !existing.enabled;
        toggled.updated_at_ms = now_ms();
        self.rules.insert(toggled.id.clone(), toggled.clone());
        tracing::info!(rule_id = %id, enabled = toggled.enabled, "rule toggled");

        Ok(RuleChange {
            before: Some(existing),
            after: Some(toggled),
        })
    }

    pub async fn seed(&self, rules: Vec<NewRule>) -> usize {
        let mut created = 0;
        for rule in rules {
            let name = rule.name.clone();
            match self.create(rule).await {
                Ok(_) => created += 1,
                Err(e) => tracing::warn!(rule = %name, error = %e, "skipping seeded rule"),
            }
        }
        created
    }

    pub fn get(&self, id: &str) -> Option<RuleConfiguration> {
        self.rules.get(id).map(|r| r.clone())
    }

    pub fn list(&self) -> Vec<RuleConfiguration> {
        let mut rules: Vec<_> = self.rules.iter().map(|r| r.value().clone()).collect();
        rules.sort_by(|a, b| (&a.topic, &a.name).cmp(&(&b.topic, &b.name)));
        rules
    }

    pub fn list_by_topic(&self, topic: &str) -> Vec<RuleConfiguration> {
        let mut rules: Vec<_> = self
            .rules
            .iter()
            .filter(|r| r.value().topic == topic)
            .map(|r| r.value().clone())
            .collect();
        rules.sort_by(|a, b| a.name.cmp(&b.name));
        rules
    }

    pub fn enabled_topics(&self) -> BTreeSet<String> {
        self.rules
            .iter()
            .filter(|r| r.value().enabled)
            .map(|r| r.value().topic.clone())
            .collect()
    }

    pub fn enabled_for_topic(&self, topic: &str) -> Vec<RuleConfiguration> {
        self.list_by_topic(topic)
            .into_iter()
            .filter(|r| r.enabled)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.rules.len()
    }

    fn ensure_unique(&self, name: &str, topic: &str, except_id: Option<&str>) -> Result<(), ConfigError> {
        let clash = self.rules.iter().any(|r| {
            let r = r.value();
            r.name == name && r.topic == topic && Some(r.id.as_str()) != except_id
        });
        if clash {
            return Err(ConfigError::Duplicate {
                name: name.to_string(),
                topic: topic.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RuleSource for RuleStore {
    async fn list_enabled_rule_topics(&self) -> Result<BTreeSet<String>, ConfigError> {
        Ok(self.enabled_topics())
    }

    async fn find_enabled_rules_for_topic(
        &self,
        topic: &str,
    ) -> Result<Vec<RuleConfiguration>, ConfigError> {
        Ok(self.enabled_for_topic(topic))
    }
}

fn validate(new: &NewRule) -> Result<(), ConfigError> {
    if new.name.trim().is_empty() {
        return Err(ConfigError::MissingName);
    }
    if !is_valid_topic(&new.topic) {
        return Err(ConfigError::InvalidTopic(new.topic.clone()));
    }
    let problems = new.rule.expression().problems();
    if !problems.is_empty() {
        return Err(ConfigError::InvalidRule(problems));
    }
    if new.actions.is_empty() {
        return Err(ConfigError::NoActions);
    }
    Ok(())
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
