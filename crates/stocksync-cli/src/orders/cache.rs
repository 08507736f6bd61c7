//! The synced-orders cache file.
//!
//! ```json
//! { "last_sync": "2024-03-09T14:05:07Z", "synced_orders": ["5001", "5002"] }
//! ```
//!
//! Order ids are stored as strings. The whole document is rewritten after
//! every addition (write to a sibling temp file, then rename), so a crash
//! loses at most the order being processed.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct OrdersCacheFile {
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
    #[serde(default)]
    pub synced_orders: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct OrdersCache {
    path: PathBuf,
    contents: OrdersCacheFile,
}

impl OrdersCache {
    /// Opens the cache at `path`, creating an empty one when the file does
    /// not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// a new file cannot be written.
    pub(crate) fn open(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(Self {
                path: path.to_path_buf(),
                contents: serde_json::from_str(&raw).map_err(|e| {
                    anyhow::anyhow!("corrupt orders cache {}: {e}", path.display())
                })?,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "creating orders cache");
                let cache = Self {
                    path: path.to_path_buf(),
                    contents: OrdersCacheFile::default(),
                };
                cache.save()?;
                Ok(cache)
            }
            Err(e) => Err(anyhow::anyhow!(
                "failed to read orders cache {}: {e}",
                path.display()
            )),
        }
    }

    pub(crate) fn contains(&self, order_id: i64) -> bool {
        let id = order_id.to_string();
        self.contents.synced_orders.iter().any(|cached| *cached == id)
    }

    pub(crate) fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.contents.last_sync
    }

    pub(crate) fn len(&self) -> usize {
        self.contents.synced_orders.len()
    }

    /// Adds `order_id` and rewrites the file. Returns `false` (and writes
    /// nothing) when the id was already cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub(crate) fn record(&mut self, order_id: i64, now: DateTime<Utc>) -> anyhow::Result<bool> {
        if self.contains(order_id) {
            return Ok(false);
        }
        self.contents.synced_orders.push(order_id.to_string());
        self.contents.last_sync = Some(now);
        self.save()?;
        Ok(true)
    }

    fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!("failed to create cache dir {}: {e}", parent.display())
            })?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(&self.contents)?)
            .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| anyhow::anyhow!("failed to replace {}: {e}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("stocksync-cache-{}", uuid::Uuid::new_v4()))
            .join("synced_orders.json")
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn missing_file_is_created_empty() {
        let path = scratch_path();
        let cache = OrdersCache::open(&path).unwrap();

        assert_eq!(cache.len(), 0);
        assert_eq!(cache.last_sync(), None);
        let on_disk: OrdersCacheFile =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, OrdersCacheFile::default());

        cleanup(&path);
    }

    #[test]
    fn record_dedupes_and_persists() {
        let path = scratch_path();
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();

        let mut cache = OrdersCache::open(&path).unwrap();
        assert!(cache.record(5001, now).unwrap());
        assert!(!cache.record(5001, now).unwrap());
        assert!(cache.record(5002, now).unwrap());

        let reopened = OrdersCache::open(&path).unwrap();
        assert!(reopened.contains(5001));
        assert!(reopened.contains(5002));
        assert!(!reopened.contains(5003));
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.last_sync(), Some(now));

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["synced_orders"], serde_json::json!(["5001", "5002"]));

        cleanup(&path);
    }

    #[test]
    fn accepts_null_last_sync() {
        let path = scratch_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"last_sync": null, "synced_orders": ["7"]}"#).unwrap();

        let cache = OrdersCache::open(&path).unwrap();
        assert!(cache.contains(7));
        assert_eq!(cache.last_sync(), None);

        cleanup(&path);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let path = scratch_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let err = OrdersCache::open(&path).unwrap_err();
        assert!(err.to_string().contains("corrupt orders cache"));

        cleanup(&path);
    }
}
