//! In-memory session store.
//!
//! One `SessionState` per conversation id, each behind its own async mutex
//! inside a shared read-locked map. Turns on the same conversation
//! serialize on the per-key lock; different conversations proceed
//! concurrently. Snapshots for persistence never hold the map lock while
//! locking entries.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::domain::models::SessionState;
use crate::domain::ports::StateMap;

type Entry = Arc<Mutex<SessionState>>;

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Entry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from a persisted map. Intended for startup, before
    /// any turn is processed.
    pub async fn hydrate(&self, map: StateMap) {
        let mut sessions = self.sessions.write().await;
        for (id, state) in map {
            sessions.insert(id, Arc::new(Mutex::new(state)));
        }
    }

    /// Handle for one conversation, created fresh on first contact.
    pub async fn handle(&self, conversation_id: &str) -> Entry {
        {
            let sessions = self.sessions.read().await;
            if let Some(entry) = sessions.get(conversation_id) {
                return entry.clone();
            }
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(conversation_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SessionState::new())))
            .clone()
    }

    /// Clone every session for persistence. Collects the entries under the
    /// map read lock, drops it, then locks each entry briefly: a caller
    /// must not hold any entry lock across this call.
    pub async fn snapshot(&self) -> StateMap {
        let entries: Vec<(String, Entry)> = {
            let sessions = self.sessions.read().await;
            sessions
                .iter()
                .map(|(id, entry)| (id.clone(), entry.clone()))
                .collect()
        };

        let mut map = StateMap::new();
        for (id, entry) in entries {
            let state = entry.lock().await;
            map.insert(id, state.clone());
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Stage;

    #[tokio::test]
    async fn test_first_contact_creates_warmup_state() {
        let store = SessionStore::new();
        let entry = store.handle("alice").await;
        let state = entry.lock().await;
        assert_eq!(state.stage, Stage::Warmup);
        assert_eq!(state.turn_index, 0);
    }

    #[tokio::test]
    async fn test_same_id_returns_same_entry() {
        let store = SessionStore::new();
        let a = store.handle("alice").await;
        {
            let mut state = a.lock().await;
            state.turn_index = 5;
        }
        let again = store.handle("alice").await;
        assert_eq!(again.lock().await.turn_index, 5);
    }

    #[tokio::test]
    async fn test_hydrate_then_snapshot_round_trip() {
        let store = SessionStore::new();
        let mut map = StateMap::new();
        let mut state = SessionState::new();
        state.turn_index = 9;
        map.insert("bob".to_string(), state);
        store.hydrate(map).await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.get("bob").map(|s| s.turn_index), Some(9));
    }

    #[tokio::test]
    async fn test_distinct_conversations_are_independent() {
        let store = SessionStore::new();
        let a = store.handle("a").await;
        let b = store.handle("b").await;
        a.lock().await.turn_index = 1;
        b.lock().await.turn_index = 2;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.get("a").map(|s| s.turn_index), Some(1));
        assert_eq!(snapshot.get("b").map(|s| s.turn_index), Some(2));
    }
}
