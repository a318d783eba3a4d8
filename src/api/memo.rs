//! Extension Memo
//!
//! Memoizes the remote extension list per caller, keyed by endpoint and
//! token, with a time-to-live and explicit invalidation.

use crate::domain::models::Extension;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// =============================================================================
// Cache Key / Entry
// =============================================================================

/// Identity of a memoized lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoKey {
    pub endpoint: String,
    pub token: String,
}

impl MemoKey {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct MemoEntry {
    extensions: Arc<Vec<Extension>>,
    fetched_at: Instant,
}

impl MemoEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() > ttl
    }
}

// =============================================================================
// Extension Cache
// =============================================================================

/// Process-wide memo of extension lists
///
/// Concurrent misses on the same key may both fetch; the later insert wins.
#[derive(Debug)]
pub struct ExtensionCache {
    entries: DashMap<MemoKey, MemoEntry>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ExtensionCache {
    /// Default time-to-live for memoized lists
    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh memoized list for this key, if any
    pub fn get(&self, key: &MemoKey) -> Option<Arc<Vec<Extension>>> {
        let fresh = self
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired(self.ttl))
            .map(|entry| entry.extensions.clone());

        match fresh {
            Some(extensions) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(extensions)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                // Drop a stale entry so the map does not grow with dead tokens
                self.entries.remove_if(key, |_, entry| entry.is_expired(self.ttl));
                None
            }
        }
    }

    /// Store a freshly fetched list
    ///
    /// Expired entries of every key are swept first, so lists memoized
    /// under tokens that are never presented again do not accumulate.
    pub fn put(&self, key: MemoKey, extensions: Vec<Extension>) -> Arc<Vec<Extension>> {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| !entry.is_expired(ttl));

        let extensions = Arc::new(extensions);
        self.entries.insert(
            key,
            MemoEntry {
                extensions: extensions.clone(),
                fetched_at: Instant::now(),
            },
        );
        extensions
    }

    /// Forget the list memoized for one key
    pub fn invalidate(&self, key: &MemoKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Forget every memoized list
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

impl Default for ExtensionCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}
