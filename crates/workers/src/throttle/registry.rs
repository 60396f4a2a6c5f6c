use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;

use super::window::FixedWindow;

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_PERMITS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThrottleSettings {
    #[serde(rename = "period_seconds", serialize_with = "as_seconds")]
    pub period: Duration,
    pub permits: u32,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            permits: DEFAULT_PERMITS,
        }
    }
}

impl ThrottleSettings {
    pub fn new(period: Duration, permits: u32) -> Self {
        Self { period, permits }
    }

    pub fn with_overrides(&self, period: Option<Duration>, permits: Option<u32>) -> Self {
        Self {
            period: period.unwrap_or(self.period),
            permits: permits.unwrap_or(self.permits),
        }
    }
}

fn as_seconds<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_secs())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThrottleKey {
    pub rule_id: String,
    pub permits: u32,
    pub period: Duration,
}

impl ThrottleKey {
    pub fn new(rule_id: &str, settings: ThrottleSettings) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            permits: settings.permits,
            period: settings.period,
        }
    }
}

pub struct ThrottleRegistry {
    defaults: ThrottleSettings,
    windows: DashMap<ThrottleKey, FixedWindow>,
}

impl Default for ThrottleRegistry {
    fn default() -> Self {
        Self::new(ThrottleSettings::default())
    }
}

impl ThrottleRegistry {
    pub fn new(defaults: ThrottleSettings) -> Self {
        Self {
            defaults,
            windows: DashMap::new(),
        }
    }

    pub fn defaults(&self) -> ThrottleSettings {
        self.defaults
    }

    pub fn effective(&self, period: Option<Duration>, permits: Option<u32>) -> ThrottleSettings {
        self.defaults.with_overrides(period, permits)
    }

    pub fn should_send(&self, rule_id: &str, settings: ThrottleSettings) -> bool {
        self.should_send_at(rule_id, settings, Instant::now())
    }

    pub fn should_send_at(&self, rule_id: &str, settings: ThrottleSettings, now: Instant) -> bool {
        let key = ThrottleKey::new(rule_id, settings);
        let mut window = self
            .windows
            .entry(key)
            .or_insert_with(|| FixedWindow::new(settings.permits, settings.period, now));
        let allowed = window.try_acquire(now);
        if !allowed {
            tracing::debug!(
                rule_id,
                permits = settings.permits,
                period_secs = settings.period.as_secs(),
                "notification throttled"
            );
        }
        allowed
    }

    pub fn test(&self, rule_id: &str) -> bool {
        self.should_send(rule_id, self.defaults)
    }

    pub fn clear(&self, rule_id: &str) -> usize {
        let before = self.windows.len();
        self.windows.retain(|k, _| k.rule_id != rule_id);
        let removed = before.saturating_sub(self.windows.len());
        tracing::info!(rule_id, removed, "throttle state cleared");
        removed
    }

    pub fn clear_all(&self) -> usize {
        let removed = self.windows.len();
        self.windows.clear();
        tracing::info!(removed, "all throttle state cleared");
        removed
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn keys_for(&self, rule_id: &str) -> Vec<ThrottleKey> {
        self.windows
            .iter()
            .filter(|e| e.key().rule_id == rule_id)
            .map(|e| e.key().clone())
            .collect()
    }

    pub fn forget_stale(&self, rule_id: &str, current: ThrottleSettings) -> usize {
        let keep = ThrottleKey::new(rule_id, current);
        let before = self.windows.len();
        self.windows.retain(|k, _| k.rule_id != rule_id || *k == keep);
        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            tracing::debug!(rule_id, removed, "stale throttle windows dropped");
        }
        removed
    }
}
