//! Serving schedules for a timetable file and class, with caching.

use std::{path::Path, time::Duration};

use bytes::Bytes;
use miette::{Context, IntoDiagnostic};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
  cache::{TableCache, cache_key, hash_key},
  class_pattern::ClassPattern,
  config::Config,
  error::ExtractError,
  extract_exams::extract_exam_entries,
  extract_lectures::extract_weekly_table,
  load_workbook::DecodedWorkbook,
  schedule::{
    model::{ScheduleDay, ScheduleResponse},
    synthesize_exam_schedule, synthesize_lecture_schedule,
  },
};

const XLSX_EXTENSION: &str = ".xlsx";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableRequest {
  /// Draft file name, with or without its `.xlsx` extension.
  pub filename:      String,
  /// `"EL 3"` for lectures; a plain class prefix such as `"CE 4"` for exams.
  pub class_pattern: String,
  #[serde(default)]
  pub is_exam:       bool,
}

impl TimetableRequest {
  /// The file name without any `.xlsx`.
  pub fn base_filename(&self) -> String {
    self.filename.replace(XLSX_EXTENSION, "")
  }

  pub fn source_filename(&self) -> String {
    format!("{}{XLSX_EXTENSION}", self.base_filename())
  }

  pub fn cache_key(&self) -> String {
    cache_key(&self.base_filename(), &self.class_pattern, self.is_exam)
  }
}

/// A timetable's bytes together with their md5 hex digest.
#[derive(Debug, Clone)]
pub struct LoadedSource {
  pub payload: Bytes,
  pub version: String,
}

#[instrument(skip(drafts_dir))]
pub async fn load_source(
  drafts_dir: &Path,
  request: &TimetableRequest,
) -> miette::Result<LoadedSource> {
  let path = drafts_dir.join(request.source_filename());
  let payload = match tokio::fs::read(&path).await {
    Ok(payload) => payload,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      return Err(
        ExtractError::SourceNotFound {
          path: path.display().to_string(),
        }
        .into(),
      );
    }
    Err(e) => {
      return Err(e)
        .into_diagnostic()
        .context(format!("failed to read timetable {path:?}"));
    }
  };

  let version = format!("{:x}", md5::compute(&payload));
  debug!(bytes = payload.len(), %version, "loaded timetable");
  Ok(LoadedSource {
    payload: Bytes::from(payload),
    version,
  })
}

/// Runs the extraction matching the request's kind.
#[instrument(skip(payload))]
pub fn extract_schedule(
  payload: Bytes,
  request: &TimetableRequest,
) -> miette::Result<Vec<ScheduleDay>> {
  let pattern = if request.is_exam {
    None
  } else {
    Some(ClassPattern::new(&request.class_pattern)?)
  };
  let mut workbook = DecodedWorkbook::from_bytes(payload)
    .context("failed to decode timetable workbook")?;

  match pattern {
    None => {
      let sheet = workbook
        .first_worksheet()
        .context("failed to read exam worksheet")?;
      let entries = extract_exam_entries(&sheet, request.class_pattern.trim());
      Ok(synthesize_exam_schedule(&entries))
    }
    Some(pattern) => {
      let sheets = workbook
        .worksheets()
        .context("failed to read lecture worksheets")?;
      let table = extract_weekly_table(sheets, &pattern)?;
      Ok(synthesize_lecture_schedule(&table))
    }
  }
}

/// Returns the cached schedule if it was extracted from this exact source.
/// Cache failures are logged and read as misses.
pub async fn cached_schedule<C: TableCache>(
  cache: &C,
  key: &str,
  version: &str,
) -> Option<Vec<ScheduleDay>> {
  match lookup_cached_schedule(cache, key, version).await {
    Ok(days) => days,
    Err(e) => {
      warn!(key, error = ?e, "cache lookup failed; treating as a miss");
      None
    }
  }
}

async fn lookup_cached_schedule<C: TableCache>(
  cache: &C,
  key: &str,
  version: &str,
) -> miette::Result<Option<Vec<ScheduleDay>>> {
  let Some(cached_version) = cache.get(&hash_key(key)).await? else {
    return Ok(None);
  };
  if cached_version != version {
    debug!(key, %cached_version, version, "cached schedule is stale");
    return Ok(None);
  }
  let Some(payload) = cache.get(key).await? else {
    return Ok(None);
  };

  let deserializer = &mut serde_json::Deserializer::from_str(&payload);
  let days = serde_path_to_error::deserialize(deserializer)
    .into_diagnostic()
    .context("failed to decode cached schedule")?;
  Ok(Some(days))
}

/// Stores a schedule and the version it came from. Failures are logged.
pub async fn store_schedule<C: TableCache>(
  cache: &C,
  key: &str,
  version: &str,
  days: &[ScheduleDay],
  ttl: Duration,
) {
  let stored = async {
    let payload = serde_json::to_string(days)
      .into_diagnostic()
      .context("failed to encode schedule")?;
    cache.set(key, &payload, ttl).await?;
    cache.set(&hash_key(key), version, ttl).await
  };

  if let Err(e) = stored.await {
    warn!(key, error = ?e, "failed to cache schedule");
  }
}

/// Answers a request for an already loaded source, from the cache when
/// possible.
#[instrument(skip(cache, source), fields(version = %source.version))]
pub async fn resolve_schedule<C: TableCache>(
  cache: &C,
  cache_ttl: Duration,
  request: &TimetableRequest,
  source: LoadedSource,
) -> miette::Result<ScheduleResponse> {
  let key = request.cache_key();
  if let Some(data) = cached_schedule(cache, &key, &source.version).await {
    info!(%key, "serving cached schedule");
    return Ok(ScheduleResponse {
      data,
      version: source.version,
    });
  }

  let data = extract_schedule(source.payload, request)?;
  store_schedule(cache, &key, &source.version, &data, cache_ttl).await;
  info!(%key, days = data.len(), "extracted schedule");

  Ok(ScheduleResponse {
    data,
    version: source.version,
  })
}

/// Loads the request's timetable from the drafts directory and answers it.
pub async fn get_time_table<C: TableCache>(
  config: &Config,
  cache: &C,
  request: &TimetableRequest,
) -> miette::Result<ScheduleResponse> {
  let source = load_source(&config.drafts_dir, request).await?;
  resolve_schedule(cache, config.cache_ttl, request, source).await
}
