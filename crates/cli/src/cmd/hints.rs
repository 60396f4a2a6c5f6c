use anyhow::Result;
use clap::Subcommand;

use super::helpers::ensure_success;
use crate::output::{emit, report, OutputMode};

#[derive(Subcommand)]
pub enum HintCmd {
    Added(HintArgs),
    Removed(HintArgs),
}

#[derive(clap::Args)]
pub struct HintArgs {
    #[arg(help = "Topic name")]
    topic: String,
}

pub async fn execute(cmd: HintCmd, mode: OutputMode, base: &str) -> Result<()> {
    let (kind, topic) = match cmd {
        HintCmd::Added(args) => ("topic-added", args.topic),
        HintCmd::Removed(args) => ("topic-removed", args.topic),
    };

    let resp = reqwest::Client::new()
        .post(format!("{base}/v1/hints/{kind}/{topic}"))
        .send()
        .await?;
    ensure_success(resp).await?;

    let sent = serde_json::json!({"hint": kind, "topic": topic});
    emit(mode, &sent, |_| report(true, &format!("{kind} hint queued for '{topic}'")))
}
