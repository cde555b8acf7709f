//! Session Store
//!
//! Bounded in-memory registry of encode sessions. Every operation takes the
//! one store lock, so a `put` is either fully visible to a `get` or not at all.
//! Sessions are handed out as `Arc`s: evicting an entry never disturbs a
//! request that is still reading it.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::model::Session;
use crate::codec::Compressed;
use crate::error::{HuffmanError, Result};

struct Entry {
    session: Arc<Session>,
    /// Recency stamp, the key of this entry in `Inner::recency`
    stamp: u64,
    last_accessed: Instant,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<String, Entry>,
    /// stamp -> session id, oldest first
    recency: BTreeMap<u64, String>,
    next_stamp: u64,
}

impl Inner {
    fn stamp(&mut self, id: &str) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        self.recency.insert(stamp, id.to_string());
        stamp
    }

    fn remove(&mut self, id: &str) -> Option<Entry> {
        let entry = self.sessions.remove(id)?;
        self.recency.remove(&entry.stamp);
        Some(entry)
    }
}

/// Store for encode sessions with LRU eviction and idle expiry.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<Inner>>,
    /// Maximum number of live sessions
    capacity: usize,
    /// Sessions idle for longer than this are dropped
    max_idle: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub const DEFAULT_CAPACITY: usize = 1024;
    pub const DEFAULT_MAX_IDLE: Duration = Duration::from_secs(3600);

    pub fn new() -> Self {
        Self::with_limits(Self::DEFAULT_CAPACITY, Self::DEFAULT_MAX_IDLE)
    }

    /// A capacity of zero is raised to one.
    pub fn with_limits(capacity: usize, max_idle: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            capacity: capacity.max(1),
            max_idle,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Entries are immutable once inserted, so a panic elsewhere cannot
        // leave one half-written.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores the result of an encode under a fresh id and returns the id.
    /// Evicts the least recently used sessions when the store is full.
    pub fn put(&self, compressed: Compressed) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(Session::new(id.clone(), compressed));

        let mut inner = self.lock();
        while inner.sessions.len() >= self.capacity {
            let Some((_, oldest)) = inner.recency.pop_first() else {
                break;
            };
            if let Some(entry) = inner.sessions.remove(&oldest) {
                tracing::debug!(
                    "Evicted session {} after {}s (store full)",
                    oldest,
                    entry.session.age_secs()
                );
            }
        }

        let stamp = inner.stamp(&id);
        inner.sessions.insert(
            id.clone(),
            Entry {
                session,
                stamp,
                last_accessed: Instant::now(),
            },
        );
        tracing::debug!("Stored session {} ({} live)", id, inner.sessions.len());

        id
    }

    /// Looks up a session and marks it as recently used.
    pub fn get(&self, id: &str) -> Result<Arc<Session>> {
        let mut inner = self.lock();
        let now = Instant::now();

        let expired = match inner.sessions.get(id) {
            None => return Err(HuffmanError::SessionNotFound(id.to_string())),
            Some(entry) => now.duration_since(entry.last_accessed) > self.max_idle,
        };
        if expired {
            inner.remove(id);
            tracing::debug!("Session {} expired", id);
            return Err(HuffmanError::SessionNotFound(id.to_string()));
        }

        let stamp = inner.stamp(id);
        let entry = inner
            .sessions
            .get_mut(id)
            .expect("entry checked under the same lock");
        let previous = std::mem::replace(&mut entry.stamp, stamp);
        entry.last_accessed = now;
        let session = Arc::clone(&entry.session);
        inner.recency.remove(&previous);

        Ok(session)
    }

    /// Drops a session. Returns whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    /// Drops every session idle for longer than the configured timeout.
    pub fn cleanup_expired(&self) -> usize {
        let mut inner = self.lock();
        let now = Instant::now();

        let expired: Vec<String> = inner
            .sessions
            .iter()
            .filter(|(_, e)| now.duration_since(e.last_accessed) > self.max_idle)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            inner.remove(id);
        }
        expired.len()
    }

    /// Get session count
    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
