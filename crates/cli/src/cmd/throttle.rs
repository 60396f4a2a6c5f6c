use anyhow::Result;
use clap::Subcommand;

use super::helpers::ensure_success;
use crate::output::{dim, emit, field, field_status, heading, prompt, report, OutputMode};

#[derive(Subcommand)]
pub enum ThrottleCmd {
    Test(RuleArgs),
    Clear(RuleArgs),
    ClearAll(ClearAllArgs),
    Config,
}

#[derive(clap::Args)]
pub struct RuleArgs {
    #[arg(help = "Rule ID")]
    rule_id: String,
}

#[derive(clap::Args)]
pub struct ClearAllArgs {
    #[arg(long, help = "Skip confirmation prompt")]
    yes: bool,
}

pub async fn execute(cmd: ThrottleCmd, mode: OutputMode, base: &str) -> Result<()> {
    let client = reqwest::Client::new();

    match cmd {
        ThrottleCmd::Test(args) => {
            let url = format!("{base}/v1/throttle/{}/test", args.rule_id);
            let body: serde_json::Value = ensure_success(client.post(&url).send().await?).await?.json().await?;
            emit(mode, &body, |b| {
                let allowed = b["allowed"].as_bool().unwrap_or(false);
                field("rule", &args.rule_id);
                field_status("decision", allowed, "allowed", "throttled");
            })
        }
        ThrottleCmd::Clear(args) => {
            let url = format!("{base}/v1/throttle/{}/clear", args.rule_id);
            let body: serde_json::Value = ensure_success(client.post(&url).send().await?).await?.json().await?;
            emit(mode, &body, |b| {
                report(true, &format!("rule '{}': {} window(s) reset", args.rule_id, b["cleared"]))
            })
        }
        ThrottleCmd::ClearAll(args) => {
            if !prompt::allow_destructive(mode, args.yes, "Reset throttle state for every rule") {
                dim("cancelled");
                return Ok(());
            }
            let url = format!("{base}/v1/throttle");
            let body: serde_json::Value = ensure_success(client.delete(&url).send().await?).await?.json().await?;
            emit(mode, &body, |b| report(true, &format!("{} window(s) reset", b["cleared"])))
        }
        ThrottleCmd::Config => {
            let url = format!("{base}/v1/throttle/config");
            let body: serde_json::Value = ensure_success(client.get(&url).send().await?).await?.json().await?;
            emit(mode, &body, |b| {
                heading("throttle defaults");
                let permits = b["permits"].as_u64().unwrap_or(0);
                let period = b["period_seconds"].as_u64().unwrap_or(0);
                field("permits", &permits.to_string());
                field("period", &format!("{period}s"));
                field("rate", &format!("{permits} per {}", human_period(period)));
            })
        }
    }
}

pub(crate) fn human_period(seconds: u64) -> String {
    match seconds {
        0 => "unlimited".to_string(),
        s if s % 3600 == 0 => format!("{}h", s / 3600),
        s if s % 60 == 0 => format!("{}m", s / 60),
        s => format!("{s}s"),
    }
}
