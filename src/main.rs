//! Minify files when they are saved.

use anyhow::Result;
use minify_on_save::cli::{Cli, Parser};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    minify_on_save::cli::run(Cli::parse())
}
