//! Binary entry point: resolve configuration, start logging, then hand off to
//! either a one-shot command or the terminal UI.
use clap::Parser;
use songmate::cli::{self, Cli};
use songmate::config::Config;
use songmate::logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.data_dir.clone())?;
    logging::init(&config)?;

    tracing::info!(data_dir = %config.data_dir().display(), "starting songmate");
    cli::run(cli, &config)
}
