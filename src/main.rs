mod cli;

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli_opts = cli::Cli::parse();
    let stdout = io::stdout();
    cli::run(cli_opts, &mut stdout.lock(), io::stdin().lock())
}
