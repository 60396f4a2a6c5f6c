use std::collections::BTreeSet;

use tripwire_common::rule::RuleConfiguration;

use super::error::ConfigError;

#[async_trait::async_trait]
pub trait RuleSource: Send + Sync {
    async fn list_enabled_rule_topics(&self) -> Result<BTreeSet<String>, ConfigError>;
    async fn find_enabled_rules_for_topic(
        &self,
        topic: &str,
    ) -> Result<Vec<RuleConfiguration>, ConfigError>;
}
