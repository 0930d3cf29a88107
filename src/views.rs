use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::Mutex;

use crate::store::{KeyValueStore, ViewCounts, load_view_counts, save_view_counts};

/// Identity of one navigation to a detail page.
///
/// Clones share the same navigation: entering any of them counts at most once,
/// whatever else is counted in between. A fresh navigation to the same book is
/// a different activation.
#[derive(Debug, Clone)]
pub struct Activation {
    book_id: String,
    navigation: u64,
    counted: Arc<AtomicBool>,
}

impl Activation {
    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    pub fn is_counted(&self) -> bool {
        self.counted.load(Ordering::Acquire)
    }
}

impl PartialEq for Activation {
    fn eq(&self, other: &Self) -> bool {
        self.navigation == other.navigation && self.book_id == other.book_id
    }
}

impl Eq for Activation {}

/// Counts detail-page visits, once per activation.
pub struct ViewTracker {
    store: Arc<dyn KeyValueStore>,
    next_navigation: AtomicU64,
    // Held across the read-modify-write so concurrent activations never lose an update.
    write_lock: Mutex<()>,
}

impl ViewTracker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            next_navigation: AtomicU64::new(1),
            write_lock: Mutex::new(()),
        }
    }

    /// Starts a new navigation to `book_id`.
    pub fn navigate(&self, book_id: &str) -> Activation {
        Activation {
            book_id: book_id.to_owned(),
            navigation: self.next_navigation.fetch_add(1, Ordering::Relaxed),
            counted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// On-enter hook for a detail page. Increments the book's counter and
    /// returns the new value, or returns `None` when this activation was
    /// already counted.
    pub async fn on_enter(&self, activation: &Activation) -> anyhow::Result<Option<u64>> {
        let _guard = self.write_lock.lock().await;
        if activation.is_counted() {
            tracing::debug!(book_id = %activation.book_id, "activation already counted");
            return Ok(None);
        }

        let mut counts = load_view_counts(self.store.as_ref()).await;
        let count = counts.entry(activation.book_id.clone()).or_insert(0);
        *count = count.saturating_add(1);
        let count = *count;

        save_view_counts(self.store.as_ref(), &counts).await?;
        activation.counted.store(true, Ordering::Release);

        tracing::debug!(book_id = %activation.book_id, count, "counted view");
        Ok(Some(count))
    }

    pub async fn count(&self, book_id: &str) -> u64 {
        self.counts().await.get(book_id).copied().unwrap_or(0)
    }

    pub async fn counts(&self) -> ViewCounts {
        load_view_counts(self.store.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{BOOK_VIEWS_KEY, MemoryStore};

    fn tracker() -> (Arc<MemoryStore>, ViewTracker) {
        let store = Arc::new(MemoryStore::new());
        let tracker = ViewTracker::new(store.clone());
        (store, tracker)
    }

    #[tokio::test]
    async fn each_navigation_counts_once() -> anyhow::Result<()> {
        let (_, tracker) = tracker();

        let first = tracker.navigate("dune");
        assert_eq!(tracker.on_enter(&first).await?, Some(1));
        // Re-rendering the same activation must not double count.
        assert_eq!(tracker.on_enter(&first).await?, None);
        assert_eq!(tracker.count("dune").await, 1);

        let second = tracker.navigate("dune");
        assert_ne!(first, second);
        assert_eq!(tracker.on_enter(&second).await?, Some(2));
        assert_eq!(tracker.count("dune").await, 2);
        Ok(())
    }

    #[tokio::test]
    async fn counts_are_per_book() -> anyhow::Result<()> {
        let (_, tracker) = tracker();
        tracker.on_enter(&tracker.navigate("a")).await?;
        tracker.on_enter(&tracker.navigate("b")).await?;
        tracker.on_enter(&tracker.navigate("a")).await?;

        let counts = tracker.counts().await;
        assert_eq!(counts.get("a"), Some(&2));
        assert_eq!(counts.get("b"), Some(&1));
        Ok(())
    }

    #[tokio::test]
    async fn activation_stays_counted_after_other_books() -> anyhow::Result<()> {
        let (_, tracker) = tracker();

        let a = tracker.navigate("a");
        assert_eq!(tracker.on_enter(&a).await?, Some(1));
        let b = tracker.navigate("b");
        assert_eq!(tracker.on_enter(&b).await?, Some(1));

        assert_eq!(tracker.on_enter(&a).await?, None);
        assert_eq!(tracker.on_enter(&a.clone()).await?, None);
        assert_eq!(tracker.count("a").await, 1);
        assert_eq!(tracker.count("b").await, 1);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_activations_lose_no_updates() -> anyhow::Result<()> {
        const VISITS: u64 = 32;
        let (_, tracker) = tracker();
        let tracker = Arc::new(tracker);

        let handles: Vec<_> = (0..VISITS)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                tokio::spawn(async move { tracker.on_enter(&tracker.navigate("dune")).await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await??.is_some());
        }

        assert_eq!(tracker.count("dune").await, VISITS);
        Ok(())
    }

    #[tokio::test]
    async fn continues_from_persisted_counts() -> anyhow::Result<()> {
        let (store, tracker) = tracker();
        store.set(BOOK_VIEWS_KEY, r#"{"dune":41}"#).await?;
        assert_eq!(tracker.on_enter(&tracker.navigate("dune")).await?, Some(42));
        Ok(())
    }

    #[tokio::test]
    async fn malformed_counts_restart_from_zero() -> anyhow::Result<()> {
        let (store, tracker) = tracker();
        store.set(BOOK_VIEWS_KEY, "garbage").await?;
        assert_eq!(tracker.on_enter(&tracker.navigate("dune")).await?, Some(1));
        Ok(())
    }
}
