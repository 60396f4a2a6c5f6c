use anyhow::{Context, Result};
use std::path::Path;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:9090";

pub fn resolve_api_url(server_flag: Option<&str>) -> String {
    let base = server_flag
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_API_URL);
    base.trim_end_matches('/').to_string()
}

pub fn parse_rule_data(data: &str) -> Result<serde_json::Value> {
    let content = if Path::new(data).exists() {
        std::fs::read_to_string(data).with_context(|| format!("reading {data}"))?
    } else {
        data.to_string()
    };
    serde_yaml::from_str(&content).context("rule definition is neither valid YAML nor JSON")
}

pub async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    anyhow::bail!("HTTP {status}: {}", error_message(&body))
}

pub fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

pub fn metric_value(exposition: &str, name: &str) -> Option<f64> {
    exposition
        .lines()
        .filter(|l| !l.starts_with('#'))
        .find_map(|l| {
            let (metric, value) = l.split_once(' ')?;
            (metric == name).then(|| value.trim().parse().ok()).flatten()
        })
}
