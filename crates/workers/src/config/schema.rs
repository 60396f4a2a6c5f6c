use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tripwire_common::nats_config::{DEFAULT_CONSUMER_GROUP, DEFAULT_NATS_URL};

use crate::throttle::ThrottleSettings;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkerConfig {
    #[serde(default = "default_nats_url")]
    pub nats_url: String,
    #[serde(default = "default_consumer_group")]
    pub consumer_group: String,
    #[serde(default = "default_api_addr")]
    pub api_addr: String,
    #[serde(default)]
    pub rules_file: Option<PathBuf>,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ReconcileConfig {
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    #[serde(default = "default_stop_timeout_seconds")]
    pub stop_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ThrottleConfig {
    #[serde(default = "default_period_minutes")]
    pub period_minutes: u64,
    #[serde(default = "default_permits")]
    pub permits: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NotifierConfig {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            nats_url: default_nats_url(),
            consumer_group: default_consumer_group(),
            api_addr: default_api_addr(),
            rules_file: None,
            reconcile: ReconcileConfig::default(),
            throttle: ThrottleConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            stop_timeout_seconds: default_stop_timeout_seconds(),
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            period_minutes: default_period_minutes(),
            permits: default_permits(),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl ReconcileConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_seconds)
    }
}

impl ThrottleConfig {
    pub fn settings(&self) -> ThrottleSettings {
        ThrottleSettings::new(
            Duration::from_secs(self.period_minutes.saturating_mul(60)),
            self.permits,
        )
    }
}

impl NotifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_nats_url() -> String {
    DEFAULT_NATS_URL.to_string()
}

fn default_consumer_group() -> String {
    DEFAULT_CONSUMER_GROUP.to_string()
}

fn default_api_addr() -> String {
    "0.0.0.0:9090".to_string()
}

fn default_interval_seconds() -> u64 {
    30
}

fn default_stop_timeout_seconds() -> u64 {
    10
}

fn default_period_minutes() -> u64 {
    5
}

fn default_permits() -> u32 {
    1
}

fn default_timeout_seconds() -> u64 {
    10
}
