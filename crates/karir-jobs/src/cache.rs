//! Disk-backed response cache for the fetch service
//!
//! One JSON object file maps a query key to `{ "data": ..., "timestamp": ... }`.
//! Validity is decided for the whole file by its modification time; there is
//! no per-entry expiry and no eviction.

use crate::error::JobsResult;
use karir_core::config::CacheConfig;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub struct ResponseCache {
    path: PathBuf,
    ttl: Duration,
    write_lock: Mutex<()>,
}

impl ResponseCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self { path: path.into(), ttl, write_lock: Mutex::new(()) }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(&config.path, Duration::from_secs(config.ttl_secs))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Key for a parameter object: sorted keys, `", "` and `": "` separators.
    pub fn key_for(params: &Value) -> String {
        let mut out = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut out, SpacedFormatter);
        // stays sorted even if serde_json's preserve_order gets enabled
        let sorted = sort_keys(params);
        if sorted.serialize(&mut ser).is_err() {
            return sorted.to_string();
        }
        String::from_utf8(out).unwrap_or_else(|_| sorted.to_string())
    }

    pub async fn is_valid(&self) -> bool {
        self.is_valid_at(SystemTime::now()).await
    }

    pub async fn is_valid_at(&self, now: SystemTime) -> bool {
        match tokio::fs::metadata(&self.path).await.and_then(|m| m.modified()) {
            Ok(mtime) => {
                // an mtime in the future counts as fresh
                let age = now.duration_since(mtime).unwrap_or_default();
                age < self.ttl
            }
            Err(_) => false,
        }
    }

    pub async fn get(&self, key: &str) -> JobsResult<Option<Value>> {
        self.get_at(key, SystemTime::now()).await
    }

    /// Cached payload for `key` as seen at `now`.
    pub async fn get_at(&self, key: &str, now: SystemTime) -> JobsResult<Option<Value>> {
        if !self.is_valid_at(now).await {
            debug!("Cache {} missing or expired", self.path.display());
            return Ok(None);
        }
        let mut entries = self.load().await?;
        Ok(entries.remove(key).and_then(|mut entry| entry.get_mut("data").map(Value::take)))
    }

    /// Read-modify-write of the whole file.
    pub async fn put(&self, key: &str, data: Value) -> JobsResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await.unwrap_or_else(|e| {
            warn!("Discarding unreadable cache {}: {}", self.path.display(), e);
            Map::new()
        });
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        entries.insert(key.to_string(), json!({ "data": data, "timestamp": timestamp }));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec(&Value::Object(entries))?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Cached response for {}", key);
        Ok(())
    }

    async fn load(&self) -> JobsResult<Map<String, Value>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes)? {
                Value::Object(map) => Ok(map),
                _ => Ok(Map::new()),
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for k in keys {
                sorted.insert(k.clone(), sort_keys(&map[k]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Compact JSON with a space after `,` and `:`.
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_matches_sorted_spaced_json() {
        assert_eq!(ResponseCache::key_for(&json!({"q": "data analyst"})), r#"{"q": "data analyst"}"#);
        assert_eq!(
            ResponseCache::key_for(&json!({"z": 1, "a": [1, 2]})),
            r#"{"a": [1, 2], "z": 1}"#
        );
    }
}
