//! State persistence port.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::SessionState;

/// Flat map of conversation identity to persisted session state.
pub type StateMap = HashMap<String, SessionState>;

/// Persistence boundary for session state. Implementations must tolerate
/// missing/partial blobs; callers must never fail a turn because
/// persistence failed.
#[async_trait]
pub trait StateRepository: Send + Sync {
    async fn load(&self) -> DomainResult<StateMap>;
    async fn save(&self, states: &StateMap) -> DomainResult<()>;
}

/// No-op repository for tests and ephemeral runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStateRepository;

#[async_trait]
impl StateRepository for NullStateRepository {
    async fn load(&self) -> DomainResult<StateMap> {
        Ok(StateMap::new())
    }

    async fn save(&self, _states: &StateMap) -> DomainResult<()> {
        Ok(())
    }
}
