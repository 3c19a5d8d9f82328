//! JSON-file state repository.
//!
//! One flat JSON document mapping conversation id to session state.
//! Tolerant on load: a missing file is an empty map, and a blob with
//! missing fields hydrates through serde defaults. Writes go through a
//! temp file and rename so a crash never leaves a half-written snapshot.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{StateMap, StateRepository};

pub struct JsonFileStateRepository {
    path: PathBuf,
}

impl JsonFileStateRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl StateRepository for JsonFileStateRepository {
    async fn load(&self) -> DomainResult<StateMap> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no state file yet, starting empty");
                return Ok(StateMap::new());
            }
            Err(e) => {
                return Err(DomainError::Persistence(format!(
                    "reading {}: {e}",
                    self.path.display()
                )))
            }
        };

        match serde_json::from_str::<StateMap>(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                // A corrupt snapshot should not brick every conversation.
                warn!(path = %self.path.display(), %e, "state file unreadable, starting empty");
                Ok(StateMap::new())
            }
        }
    }

    async fn save(&self, states: &StateMap) -> DomainResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    DomainError::Persistence(format!("creating {}: {e}", parent.display()))
                })?;
            }
        }

        let serialized = serde_json::to_string_pretty(states)
            .map_err(|e| DomainError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serialized).await.map_err(|e| {
            DomainError::Persistence(format!("writing {}: {e}", tmp.display()))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            DomainError::Persistence(format!("renaming into {}: {e}", self.path.display()))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{SessionState, Stage};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempdir().expect("tempdir");
        let repo = JsonFileStateRepository::new(dir.path().join("state.json"));
        let map = repo.load().await.expect("load");
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = tempdir().expect("tempdir");
        let repo = JsonFileStateRepository::new(dir.path().join("nested/state.json"));

        let mut map = StateMap::new();
        let mut state = SessionState::new();
        state.stage = Stage::Guidance;
        state.turn_index = 4;
        map.insert("alice".to_string(), state);

        repo.save(&map).await.expect("save");
        let loaded = repo.load().await.expect("load");
        let alice = loaded.get("alice").expect("entry");
        assert_eq!(alice.stage, Stage::Guidance);
        assert_eq!(alice.turn_index, 4);
    }

    #[tokio::test]
    async fn test_partial_blob_hydrates() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, r#"{"bob":{"stage":"guidance","turn_index":2}}"#)
            .await
            .expect("write");

        let repo = JsonFileStateRepository::new(&path);
        let loaded = repo.load().await.expect("load");
        let bob = loaded.get("bob").expect("entry");
        assert_eq!(bob.stage, Stage::Guidance);
        assert!(bob.history.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_empty() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, "{not json at all").await.expect("write");

        let repo = JsonFileStateRepository::new(&path);
        let loaded = repo.load().await.expect("load");
        assert!(loaded.is_empty());
    }
}
