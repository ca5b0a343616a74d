//! Per-conversation state for the guided task creation dialog.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Identifies one user in one chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub chat_id: i64,
    pub user_id: i64,
}

impl SessionKey {
    pub fn new(chat_id: i64, user_id: i64) -> Self {
        Self { chat_id, user_id }
    }
}

/// Pending input expected from the user. Absence means idle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationState {
    AwaitingTitle,
    AwaitingDescription { title: String },
}

/// Storage for conversation state, keyed per user and chat.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: SessionKey) -> Option<ConversationState>;
    fn set(&self, key: SessionKey, state: ConversationState);
    fn clear(&self, key: SessionKey);
}

struct Entry {
    state: ConversationState,
    touched: Instant,
}

/// Process-local session store. Entries idle longer than the TTL read as absent.
pub struct InMemorySessionStore {
    ttl: Duration,
    entries: Mutex<HashMap<SessionKey, Entry>>,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of live (unexpired) sessions.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .values()
            .filter(|e| e.touched.elapsed() < self.ttl)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: SessionKey) -> Option<ConversationState> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let live = entries
            .get(&key)
            .filter(|e| e.touched.elapsed() < self.ttl)
            .map(|e| e.state.clone());
        if live.is_none() {
            entries.remove(&key);
        }
        live
    }

    fn set(&self, key: SessionKey, state: ConversationState) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        // Drop stale dialogs so abandoned conversations don't accumulate
        let ttl = self.ttl;
        entries.retain(|_, e| e.touched.elapsed() < ttl);
        entries.insert(
            key,
            Entry {
                state,
                touched: Instant::now(),
            },
        );
    }

    fn clear(&self, key: SessionKey) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(&key);
    }
}
