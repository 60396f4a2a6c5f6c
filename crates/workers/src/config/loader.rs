use std::path::Path;

use super::schema::WorkerConfig;

pub const NATS_URL_ENV: &str = "TRIPWIRE_NATS_URL";
pub const API_ADDR_ENV: &str = "TRIPWIRE_API_ADDR";

#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
    Validation(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Validation(msg) => write!(f, "validation: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_yaml::Error> for LoadError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e)
    }
}

pub fn load_from_file(path: &Path) -> Result<WorkerConfig, LoadError> {
    let contents = std::fs::read_to_string(path)?;
    load_from_str(&contents)
}

pub fn load_from_str(yaml: &str) -> Result<WorkerConfig, LoadError> {
    let cfg: WorkerConfig = if yaml.trim().is_empty() {
        WorkerConfig::default()
    } else {
        serde_yaml::from_str(yaml)?
    };
    validate(&cfg)?;
    Ok(cfg)
}

pub fn apply_env_overrides(mut cfg: WorkerConfig) -> Result<WorkerConfig, LoadError> {
    if let Ok(url) = std::env::var(NATS_URL_ENV) {
        cfg.nats_url = url;
    }
    if let Ok(addr) = std::env::var(API_ADDR_ENV) {
        cfg.api_addr = addr;
    }
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &WorkerConfig) -> Result<(), LoadError> {
    if cfg.nats_url.is_empty() {
        return Err(LoadError::Validation("nats_url must not be empty".into()));
    }
    if cfg.consumer_group.trim().is_empty() {
        return Err(LoadError::Validation("consumer_group must not be empty".into()));
    }
    if cfg.api_addr.is_empty() {
        return Err(LoadError::Validation("api_addr must not be empty".into()));
    }
    if cfg.reconcile.interval_seconds == 0 {
        return Err(LoadError::Validation(
            "reconcile.interval_seconds must be > 0".into(),
        ));
    }
    if cfg.reconcile.stop_timeout_seconds == 0 {
        return Err(LoadError::Validation(
            "reconcile.stop_timeout_seconds must be > 0".into(),
        ));
    }
    if cfg.notifier.timeout_seconds == 0 {
        return Err(LoadError::Validation(
            "notifier.timeout_seconds must be > 0".into(),
        ));
    }
    Ok(())
}
