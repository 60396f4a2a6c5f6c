use anyhow::Result;
use serde::Serialize;

use super::helpers::metric_value;
use crate::output::{dim, emit, field, field_status, heading, OutputMode};

const COUNTERS: &[(&str, &str)] = &[
    ("messages", "tripwire_worker_messages_received_total"),
    ("rules matched", "tripwire_worker_rules_matched_total"),
    ("rule faults", "tripwire_worker_rule_faults_total"),
    ("sent", "tripwire_worker_notifications_sent_total"),
    ("throttled", "tripwire_worker_notifications_throttled_total"),
    ("failed", "tripwire_worker_notifications_failed_total"),
    ("reconciles", "tripwire_worker_reconcile_runs_total"),
];

#[derive(Serialize)]
struct Status {
    server: String,
    reachable: bool,
    ready: bool,
    consumer_group: Option<String>,
    subscriptions: Vec<String>,
    rules: Option<usize>,
    enabled_rules: Option<usize>,
    counters: serde_json::Map<String, serde_json::Value>,
}

pub async fn execute(mode: OutputMode, base: &str) -> Result<()> {
    let status = collect(base).await;
    emit(mode, &status, render)
}

async fn collect(base: &str) -> Status {
    let reachable = reqwest::get(format!("{base}/healthz")).await.is_ok();
    let ready = match reqwest::get(format!("{base}/ready")).await {
        Ok(resp) => resp.status().is_success(),
        Err(_) => false,
    };

    let subscriptions: Option<serde_json::Value> = fetch_json(&format!("{base}/v1/subscriptions")).await;
    let rules: Option<Vec<serde_json::Value>> = fetch_json(&format!("{base}/v1/rules")).await;
    let exposition = match reqwest::get(format!("{base}/metrics")).await {
        Ok(resp) => resp.text().await.ok(),
        Err(_) => None,
    };

    let counters = COUNTERS
        .iter()
        .map(|(label, name)| {
            let value = exposition.as_deref().and_then(|e| metric_value(e, name));
            (label.to_string(), serde_json::json!(value))
        })
        .collect();

    Status {
        server: base.to_string(),
        reachable,
        ready,
        consumer_group: subscriptions
            .as_ref()
            .and_then(|s| s["consumer_group"].as_str().map(str::to_string)),
        subscriptions: subscriptions
            .as_ref()
            .and_then(|s| s["topics"].as_array())
            .map(|t| t.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default(),
        rules: rules.as_ref().map(Vec::len),
        enabled_rules: rules
            .as_ref()
            .map(|r| r.iter().filter(|rule| rule["enabled"] == true).count()),
        counters,
    }
}

fn render(s: &Status) {
    heading("tripwire worker");
    field("server", &s.server);
    field_status("reachable", s.reachable, "yes", "no");
    field_status("ready", s.ready, "yes", "waiting for first reconcile");
    if !s.reachable {
        return;
    }

    heading("subscriptions");
    field("consumer group", s.consumer_group.as_deref().unwrap_or("-"));
    if s.subscriptions.is_empty() {
        dim("no active topics");
    }
    for topic in &s.subscriptions {
        field("topic", topic);
    }

    heading("rules");
    match (s.rules, s.enabled_rules) {
        (Some(total), Some(enabled)) => field("enabled", &format!("{enabled} of {total}")),
        _ => dim("unavailable"),
    }

    heading("counters");
    for (label, value) in &s.counters {
        let shown = value.as_f64().map_or_else(|| "-".to_string(), |v| v.to_string());
        field(label, &shown);
    }
    println!();
}

async fn fetch_json<T: serde::de::DeserializeOwned>(url: &str) -> Option<T> {
    let resp = reqwest::get(url).await.ok()?.error_for_status().ok()?;
    resp.json().await.ok()
}
