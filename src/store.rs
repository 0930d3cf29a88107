use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context as _;
use async_trait::async_trait;
use tokio::fs;

pub const DARK_MODE_KEY: &str = "darkMode";
pub const BOOK_VIEWS_KEY: &str = "bookViews";

pub type ViewCounts = BTreeMap<String, u64>;

/// Persistent string values keyed by name.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// One file per key under `{base_dir}/store/`.
#[derive(Debug, Clone)]
pub struct LocalFsStore {
    base_dir: PathBuf,
}

impl LocalFsStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn store_dir(&self) -> PathBuf {
        self.base_dir.join("store")
    }

    fn key_path(&self, key: &str) -> anyhow::Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            anyhow::bail!("invalid store key: {key:?}");
        }
        Ok(self.store_dir().join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for LocalFsStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("read: {}", path.display())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.key_path(key)?;
        write_atomic(&path, value.as_bytes())
            .await
            .with_context(|| format!("write store key {key}"))
    }
}

async fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("path has no parent: {}", path.display()))?;
    fs::create_dir_all(parent)
        .await
        .with_context(|| format!("create parent dir: {}", parent.display()))?;

    let tmp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
    fs::write(&tmp_path, data)
        .await
        .with_context(|| format!("write tmp: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("rename tmp to final: {}", path.display()))?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Stored dark-mode flag. Missing, unreadable or malformed values read as `false`.
pub async fn load_dark_mode(store: &dyn KeyValueStore) -> bool {
    let raw = match store.get(DARK_MODE_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return false,
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "read dark mode flag; using light mode");
            return false;
        }
    };

    match serde_json::from_str::<bool>(raw.trim()) {
        Ok(flag) => flag,
        Err(err) => {
            tracing::warn!(%err, raw = %raw, "malformed dark mode flag; using light mode");
            false
        }
    }
}

pub async fn save_dark_mode(store: &dyn KeyValueStore, enabled: bool) -> anyhow::Result<()> {
    let value = serde_json::to_string(&enabled).context("serialize dark mode flag")?;
    store.set(DARK_MODE_KEY, &value).await
}

/// Stored view counts. Entries that are not non-negative integers are dropped;
/// a value that is not a JSON object reads as an empty map.
pub async fn load_view_counts(store: &dyn KeyValueStore) -> ViewCounts {
    let raw = match store.get(BOOK_VIEWS_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return ViewCounts::new(),
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "read view counts; starting empty");
            return ViewCounts::new();
        }
    };

    parse_view_counts(&raw).unwrap_or_else(|| {
        tracing::warn!(raw = %raw, "malformed view counts; starting empty");
        ViewCounts::new()
    })
}

pub async fn save_view_counts(store: &dyn KeyValueStore, counts: &ViewCounts) -> anyhow::Result<()> {
    let value = serde_json::to_string(counts).context("serialize view counts")?;
    store.set(BOOK_VIEWS_KEY, &value).await
}

fn parse_view_counts(raw: &str) -> Option<ViewCounts> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;

    let mut counts = ViewCounts::new();
    for (id, count) in object {
        match count.as_u64() {
            Some(count) => {
                counts.insert(id.clone(), count);
            }
            None => tracing::debug!(id = %id, %count, "skipping non-integer view count"),
        }
    }
    Some(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trips() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await?, None);
        store.set("k", "v").await?;
        assert_eq!(store.get("k").await?.as_deref(), Some("v"));
        Ok(())
    }

    #[tokio::test]
    async fn local_fs_store_persists_between_instances() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        LocalFsStore::new(dir.path()).set("darkMode", "true").await?;

        let reopened = LocalFsStore::new(dir.path());
        assert_eq!(reopened.get("darkMode").await?.as_deref(), Some("true"));
        assert_eq!(reopened.get("bookViews").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn local_fs_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsStore::new(dir.path());
        assert!(store.set("../escape", "x").await.is_err());
        assert!(store.get("").await.is_err());
    }

    #[tokio::test]
    async fn dark_mode_defaults_to_false() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        assert!(!load_dark_mode(&store).await);

        store.set(DARK_MODE_KEY, "not json").await?;
        assert!(!load_dark_mode(&store).await);

        save_dark_mode(&store, true).await?;
        assert!(load_dark_mode(&store).await);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_view_counts_read_as_empty() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.set(BOOK_VIEWS_KEY, "[1,2]").await?;
        assert!(load_view_counts(&store).await.is_empty());

        store.set(BOOK_VIEWS_KEY, "{oops").await?;
        assert!(load_view_counts(&store).await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn bad_entries_are_dropped_but_good_ones_kept() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store
            .set(BOOK_VIEWS_KEY, r#"{"dune":3,"bad":"x","neg":-1}"#)
            .await?;
        let counts = load_view_counts(&store).await;
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("dune"), Some(&3));
        Ok(())
    }
}
