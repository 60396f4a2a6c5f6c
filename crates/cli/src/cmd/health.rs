use std::time::Instant;

use anyhow::Result;
use serde::Serialize;

use crate::output::{emit, report, OutputMode};

#[derive(Serialize)]
struct Check {
    endpoint: &'static str,
    ok: bool,
    status: Option<u16>,
    latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Check {
    fn describe(&self) -> String {
        match (self.status, &self.error) {
            (Some(code), _) => format!("{:<9} HTTP {code} in {}ms", self.endpoint, self.latency_ms),
            (None, Some(e)) => format!("{:<9} unreachable: {e}", self.endpoint),
            (None, None) => format!("{:<9} no response", self.endpoint),
        }
    }
}

pub async fn execute(mode: OutputMode, base: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let checks = vec![
        check(&client, base, "/healthz").await,
        check(&client, base, "/ready").await,
    ];

    emit(mode, &checks, |checks| {
        for c in checks {
            report(c.ok, &c.describe());
        }
    })?;

    anyhow::ensure!(checks.iter().all(|c| c.ok), "worker at {base} is not healthy");
    Ok(())
}

async fn check(client: &reqwest::Client, base: &str, endpoint: &'static str) -> Check {
    let started = Instant::now();
    let result = client.get(format!("{base}{endpoint}")).send().await;
    let latency_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(resp) => Check {
            endpoint,
            ok: resp.status().is_success(),
            status: Some(resp.status().as_u16()),
            latency_ms,
            error: None,
        },
        Err(e) => Check {
            endpoint,
            ok: false,
            status: None,
            latency_ms,
            error: Some(e.to_string()),
        },
    }
}
