//! Caching of extracted schedules.
//!
//! Entries are keyed by [`cache_key`] and carry the md5 of the spreadsheet
//! they were extracted from under a companion key, so an edited spreadsheet
//! is never answered from a stale entry.

use std::{
  collections::HashMap,
  future::Future,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use chrono::{DateTime, Utc};
use miette::{Context, IntoDiagnostic, miette};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Key under which a schedule is cached.
pub fn cache_key(filename: &str, class_pattern: &str, is_exam: bool) -> String {
  let kind = if is_exam { "exam" } else { "lecture" };
  format!("{filename}-{}-{kind}", class_pattern.replace(' ', ""))
}

/// Key under which the source hash of `key`'s entry is cached.
pub fn hash_key(key: &str) -> String { format!("{key}_hash") }

/// A string store with per-entry expiry.
pub trait TableCache {
  fn get(
    &self,
    key: &str,
  ) -> impl Future<Output = miette::Result<Option<String>>> + Send;

  fn set(
    &self,
    key: &str,
    value: &str,
    ttl: Duration,
  ) -> impl Future<Output = miette::Result<()>> + Send;
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
  value:      String,
  expires_at: DateTime<Utc>,
}

impl CacheEntry {
  fn new(value: &str, ttl: Duration) -> miette::Result<Self> {
    let ttl = chrono::Duration::from_std(ttl)
      .into_diagnostic()
      .context("cache ttl is out of range")?;
    Ok(Self {
      value:      value.to_owned(),
      expires_at: Utc::now() + ttl,
    })
  }

  fn is_live(&self) -> bool { Utc::now() < self.expires_at }
}

/// Stores one JSON file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileCache {
  dir: PathBuf,
}

impl FileCache {
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

  pub fn dir(&self) -> &Path { &self.dir }

  /// Percent-encodes every byte of the key outside `[A-Za-z0-9._-]`, so
  /// distinct keys never share a file.
  fn entry_path(&self, key: &str) -> PathBuf {
    let mut file_name = String::with_capacity(key.len());
    for byte in key.bytes() {
      match byte {
        b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' => {
          file_name.push(byte as char)
        }
        _ => file_name.push_str(&format!("%{byte:02X}")),
      }
    }
    self.dir.join(format!("{file_name}.json"))
  }
}

impl TableCache for FileCache {
  async fn get(&self, key: &str) -> miette::Result<Option<String>> {
    let path = self.entry_path(key);
    let contents = match tokio::fs::read(&path).await {
      Ok(contents) => contents,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        trace!(key, "no cache entry");
        return Ok(None);
      }
      Err(e) => {
        return Err(e)
          .into_diagnostic()
          .context(format!("failed to read cache entry {path:?}"));
      }
    };

    let deserializer = &mut serde_json::Deserializer::from_slice(&contents);
    let entry: CacheEntry = serde_path_to_error::deserialize(deserializer)
      .into_diagnostic()
      .context(format!("failed to decode cache entry {path:?}"))?;

    if !entry.is_live() {
      debug!(key, expired_at = %entry.expires_at, "cache entry expired");
      if let Err(e) = tokio::fs::remove_file(&path).await {
        debug!(key, error = %e, "failed to remove expired cache entry");
      }
      return Ok(None);
    }
    Ok(Some(entry.value))
  }

  async fn set(
    &self,
    key: &str,
    value: &str,
    ttl: Duration,
  ) -> miette::Result<()> {
    let entry = CacheEntry::new(value, ttl)?;
    let contents = serde_json::to_vec(&entry)
      .into_diagnostic()
      .context("failed to encode cache entry")?;

    tokio::fs::create_dir_all(&self.dir)
      .await
      .into_diagnostic()
      .context(format!("failed to create cache dir {:?}", self.dir))?;
    let path = self.entry_path(key);
    tokio::fs::write(&path, contents)
      .await
      .into_diagnostic()
      .context(format!("failed to write cache entry {path:?}"))?;

    trace!(key, ?ttl, "stored cache entry");
    Ok(())
  }
}

/// Keeps entries in process memory.
#[derive(Debug, Default)]
pub struct MemoryCache {
  entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
  pub fn new() -> Self { Self::default() }
}

impl TableCache for MemoryCache {
  async fn get(&self, key: &str) -> miette::Result<Option<String>> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|_| miette!("memory cache lock is poisoned"))?;
    match entries.get(key) {
      Some(entry) if entry.is_live() => Ok(Some(entry.value.clone())),
      Some(_) => {
        entries.remove(key);
        Ok(None)
      }
      None => Ok(None),
    }
  }

  async fn set(
    &self,
    key: &str,
    value: &str,
    ttl: Duration,
  ) -> miette::Result<()> {
    let entry = CacheEntry::new(value, ttl)?;
    self
      .entries
      .lock()
      .map_err(|_| miette!("memory cache lock is poisoned"))?
      .insert(key.to_owned(), entry);
    Ok(())
  }
}
