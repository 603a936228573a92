use std::{path::PathBuf, time::Duration};

use miette::{Context, IntoDiagnostic, ensure};

const DEFAULT_CACHE_DIR: &str = ".timetable-cache";
const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
const DEFAULT_CALENDAR_OUTPUT: &str = "class_schedule.ics";

#[derive(Debug, Clone)]
pub struct Config {
  /// Directory holding the `.xlsx` timetable drafts.
  pub drafts_dir:      PathBuf,
  pub cache_dir:       PathBuf,
  pub cache_ttl:       Duration,
  pub calendar_output: PathBuf,
}

impl Config {
  pub fn from_env() -> miette::Result<Self> {
    let drafts_dir = std::env::var("DRAFTS_DIR")
      .into_diagnostic()
      .context("missing `DRAFTS_DIR` env var")?;
    ensure!(!drafts_dir.trim().is_empty(), "`DRAFTS_DIR` is empty");

    let cache_dir = std::env::var("CACHE_DIR")
      .unwrap_or_else(|_| DEFAULT_CACHE_DIR.to_owned())
      .into();

    let cache_ttl = match std::env::var("CACHE_TTL_SECS") {
      Ok(secs) => secs
        .parse::<u64>()
        .into_diagnostic()
        .context("failed to parse `CACHE_TTL_SECS`")?,
      Err(_) => DEFAULT_CACHE_TTL_SECS,
    };

    let calendar_output = std::env::var("CALENDAR_OUTPUT")
      .unwrap_or_else(|_| DEFAULT_CALENDAR_OUTPUT.to_owned())
      .into();

    Ok(Self {
      drafts_dir: drafts_dir.into(),
      cache_dir,
      cache_ttl: Duration::from_secs(cache_ttl),
      calendar_output,
    })
  }

  /// Config rooted at `drafts_dir` with every other setting at its default.
  pub fn with_drafts_dir(drafts_dir: impl Into<PathBuf>) -> Self {
    Self {
      drafts_dir:      drafts_dir.into(),
      cache_dir:       DEFAULT_CACHE_DIR.into(),
      cache_ttl:       Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
      calendar_output: DEFAULT_CALENDAR_OUTPUT.into(),
    }
  }
}
