use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

mod config;
mod keymap;
mod run;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    run::run(&config)
}
