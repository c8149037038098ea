pub mod challenge;
pub mod deploy;
pub mod error;
pub mod hook;
pub mod settings;

use clap::Parser;

use crate::error::Result;
use crate::settings::Settings;

/// DNS-01 hook for dehydrated backed by the Dreamhost DNS API
#[derive(clap::Parser)]
#[command(name = "dreamhook", version)]
struct Arguments {
    #[command(subcommand)]
    command: hook::Command,
}

pub async fn run() -> Result<()> {
    let args = Arguments::parse();
    let settings = Settings::new()?;
    hook::dispatch(args.command, &settings).await
}
