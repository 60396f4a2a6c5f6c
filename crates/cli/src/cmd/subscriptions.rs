use anyhow::Result;

use super::helpers::ensure_success;
use crate::output::{dim, emit, field, heading, new_table, spinner, OutputMode};

pub async fn execute(mode: OutputMode, base: &str) -> Result<()> {
    let body: serde_json::Value = spinner::while_running(mode, "Fetching subscriptions...", async {
        let resp = ensure_success(reqwest::get(format!("{base}/v1/subscriptions")).await?).await?;
        Ok::<_, anyhow::Error>(resp.json::<serde_json::Value>().await?)
    })
    .await?;

    emit(mode, &body, |body| {
        let topics = body["topics"].as_array().cloned().unwrap_or_default();
        heading("active subscriptions");
        field("consumer group", body["consumer_group"].as_str().unwrap_or("-"));
        if topics.is_empty() {
            dim("no topic has an enabled rule");
            return;
        }
        let mut table = new_table(&["#", "Topic"]);
        for (i, topic) in topics.iter().enumerate() {
            table.add_row(vec![(i + 1).to_string(), topic.as_str().unwrap_or("-").to_string()]);
        }
        println!("{table}");
    })
}
