mod cmd;
mod output;
#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use cmd::Commands;
use output::OutputMode;

#[derive(Parser)]
#[command(name = "tripwire", version, about = "Tripwire notifier admin CLI")]
pub struct Opts {
    #[clap(subcommand)]
    cmd: Commands,

    #[arg(long, global = true, help = "Output as JSON")]
    json: bool,

    #[arg(
        long,
        global = true,
        env = "TRIPWIRE_API_URL",
        help = "Worker admin API base URL"
    )]
    server: Option<String>,
}

impl Opts {
    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from_flag(self.json)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();
    cmd::run(opts).await
}
