mod health;
pub(crate) mod helpers;
mod hints;
pub(crate) mod rules;
mod status;
mod subscriptions;
pub(crate) mod throttle;
mod version;

use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    Health,
    Status,
    Subscriptions,
    #[command(subcommand)]
    Rules(rules::RulesCmd),
    #[command(subcommand)]
    Throttle(throttle::ThrottleCmd),
    #[command(subcommand)]
    Hint(hints::HintCmd),
    Version,
}

pub async fn run(opts: crate::Opts) -> Result<()> {
    let mode = opts.output_mode();
    let base = helpers::resolve_api_url(opts.server.as_deref());
    match opts.cmd {
        Commands::Health => health::execute(mode, &base).await,
        Commands::Status => status::execute(mode, &base).await,
        Commands::Subscriptions => subscriptions::execute(mode, &base).await,
        Commands::Rules(cmd) => rules::execute(cmd, mode, &base).await,
        Commands::Throttle(cmd) => throttle::execute(cmd, mode, &base).await,
        Commands::Hint(cmd) => hints::execute(cmd, mode, &base).await,
        Commands::Version => version::execute(mode),
    }
}
