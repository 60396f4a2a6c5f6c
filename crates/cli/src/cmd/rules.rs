use anyhow::Result;
use clap::Subcommand;
use comfy_table::Cell;

use super::helpers::{self, ensure_success};
use crate::output::{dim, emit, enabled_cell, field, heading, new_table, prompt, report, spinner, OutputMode};

#[derive(Subcommand)]
pub enum RulesCmd {
    List(ListArgs),
    Get(IdArgs),
    Create(CreateArgs),
    Update(UpdateArgs),
    Delete(DeleteArgs),
    Toggle(IdArgs),
}

#[derive(clap::Args)]
pub struct ListArgs {
    #[arg(long, help = "Only rules bound to this topic")]
    topic: Option<String>,
}

#[derive(clap::Args)]
pub struct IdArgs {
    #[arg(help = "Rule ID")]
    id: String,
}

#[derive(clap::Args)]
pub struct CreateArgs {
    #[arg(long, help = "YAML/JSON file path or inline JSON")]
    data: String,
}

#[derive(clap::Args)]
pub struct UpdateArgs {
    #[arg(help = "Rule ID")]
    id: String,
    #[arg(long, help = "YAML/JSON file path or inline JSON")]
    data: String,
}

#[derive(clap::Args)]
pub struct DeleteArgs {
    #[arg(help = "Rule ID")]
    id: String,
    #[arg(long, help = "Skip confirmation prompt")]
    yes: bool,
}

pub async fn execute(cmd: RulesCmd, mode: OutputMode, base: &str) -> Result<()> {
    let client = reqwest::Client::new();
    match cmd {
        RulesCmd::List(args) => list(&client, base, args, mode).await,
        RulesCmd::Get(args) => get(&client, base, args, mode).await,
        RulesCmd::Create(args) => create(&client, base, args, mode).await,
        RulesCmd::Update(args) => update(&client, base, args, mode).await,
        RulesCmd::Delete(args) => delete(&client, base, args, mode).await,
        RulesCmd::Toggle(args) => toggle(&client, base, args, mode).await,
    }
}

async fn send_json(req: reqwest::RequestBuilder) -> Result<serde_json::Value> {
    let resp = ensure_success(req.send().await?).await?;
    Ok(resp.json().await?)
}

async fn list(client: &reqwest::Client, base: &str, args: ListArgs, mode: OutputMode) -> Result<()> {
    let mut req = client.get(format!("{base}/v1/rules"));
    if let Some(topic) = &args.topic {
        req = req.query(&[("topic", topic)]);
    }
    let rules = spinner::while_running(mode, "Fetching rules...", send_json(req)).await?;

    emit(mode, &rules, |rules| {
        let rows = rules.as_array().map(Vec::as_slice).unwrap_or_default();
        if rows.is_empty() {
            let empty = match &args.topic {
                Some(topic) => format!("no rules bound to '{topic}'"),
                None => "no rules defined".to_string(),
            };
            dim(&empty);
            return;
        }
        let mut table = new_table(&["ID", "Name", "Topic", "State", "Actions", "Throttle"]);
        for r in rows {
            table.add_row(vec![
                Cell::new(r["id"].as_str().unwrap_or("-")),
                Cell::new(r["name"].as_str().unwrap_or("-")),
                Cell::new(r["topic"].as_str().unwrap_or("-")),
                enabled_cell(r["enabled"].as_bool().unwrap_or(false)),
                Cell::new(r["actions"].as_array().map_or(0, Vec::len)),
                Cell::new(throttle_summary(r)),
            ]);
        }
        println!("{table}");
        dim(&format!("{} rule(s)", rows.len()));
    })
}

pub(crate) fn throttle_summary(rule: &serde_json::Value) -> String {
    let permits = rule["throttle_permits"].as_u64();
    let minutes = rule["throttle_period_minutes"].as_u64();
    match (permits, minutes) {
        (None, None) => "default".to_string(),
        (p, m) => format!(
            "{}/{}m",
            p.map_or_else(|| "-".to_string(), |v| v.to_string()),
            m.map_or_else(|| "-".to_string(), |v| v.to_string())
        ),
    }
}

fn render_rule(rule: &serde_json::Value) {
    heading(rule["name"].as_str().unwrap_or("rule"));
    for (k, v) in rule.as_object().into_iter().flatten() {
        let shown = match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        field(k, &shown);
    }
}

async fn get(client: &reqwest::Client, base: &str, args: IdArgs, mode: OutputMode) -> Result<()> {
    let req = client.get(format!("{base}/v1/rules/{}", args.id));
    let rule = spinner::while_running(mode, "Fetching rule...", send_json(req)).await?;
    emit(mode, &rule, render_rule)
}

async fn create(client: &reqwest::Client, base: &str, args: CreateArgs, mode: OutputMode) -> Result<()> {
    let body = helpers::parse_rule_data(&args.data)?;
    let req = client.post(format!("{base}/v1/rules")).json(&body);
    let created = spinner::with_outcome(mode, "Creating rule", "rule created", send_json(req)).await?;
    emit(mode, &created, |c| field("id", c["id"].as_str().unwrap_or("-")))
}

async fn update(client: &reqwest::Client, base: &str, args: UpdateArgs, mode: OutputMode) -> Result<()> {
    let body = helpers::parse_rule_data(&args.data)?;
    let req = client.put(format!("{base}/v1/rules/{}", args.id)).json(&body);
    let done = format!("rule '{}' updated", args.id);
    let updated = spinner::with_outcome(mode, "Updating rule", &done, send_json(req)).await?;
    emit(mode, &updated, |u| field("topic", u["topic"].as_str().unwrap_or("-")))
}

async fn delete(client: &reqwest::Client, base: &str, args: DeleteArgs, mode: OutputMode) -> Result<()> {
    if !prompt::allow_destructive(mode, args.yes, &format!("Delete rule '{}'", args.id)) {
        dim("cancelled");
        return Ok(());
    }

    let req = client.delete(format!("{base}/v1/rules/{}", args.id));
    let done = format!("rule '{}' deleted", args.id);
    spinner::with_outcome(mode, "Deleting rule", &done, async {
        ensure_success(req.send().await?).await?;
        Ok::<_, anyhow::Error>(())
    })
    .await?;

    emit(mode, &serde_json::json!({"deleted": true, "id": args.id}), |_| {})
}

async fn toggle(client: &reqwest::Client, base: &str, args: IdArgs, mode: OutputMode) -> Result<()> {
    let req = client.post(format!("{base}/v1/rules/{}/toggle", args.id));
    let rule = send_json(req).await?;
    emit(mode, &rule, |r| {
        let enabled = r["enabled"].as_bool().unwrap_or(false);
        let state = if enabled { "enabled" } else { "disabled" };
        report(true, &format!("rule '{}' is now {state}", args.id));
    })
}
