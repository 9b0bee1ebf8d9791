mod platform;

use anyhow::Context;
use clap::Parser;

use platform::cli::Cli;
use platform::config::MonitorConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = MonitorConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    platform::logging::initialize(&config);

    platform::app::run(config, cli.command).await
}
