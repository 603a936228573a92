mod cli;
mod state;

use clap::Parser;
use miette::Context;
use timetable_extract::{cache::FileCache, config::Config};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use self::{cli::Cli, state::RunState};

#[tokio::main]
async fn main() -> miette::Result<()> {
  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(EnvFilter::from_default_env())
    .init();

  let cli = Cli::parse();
  let config =
    Config::from_env().context("failed to gather config from env")?;
  let cache = FileCache::new(&config.cache_dir);
  debug!(?config, cache_dir = ?cache.dir(), "configured");

  let request = cli.command.request();

  // drive state machine
  let mut state = RunState::Start;
  loop {
    match state {
      s if s.completed() => {
        info!("state machine completed");
        break;
      }
      s => {
        state = s
          .step(&config, &cache, &cli.command, &request)
          .await
          .context("failed to step state")?;
      }
    }
  }

  Ok(())
}
