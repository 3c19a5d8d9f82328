//! Generation service port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Fully formed request for the external generation collaborator. No partial
/// state leaks into the call beyond what the digest explicitly includes.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Assembled instruction bundle (system prompt, lens material, plan
    /// directives).
    pub instructions: String,
    /// The current utterance.
    pub input: String,
    /// Short digest of the last few exchanges, if any.
    pub digest: Option<String>,
    /// Ask for a shorter, more conversational rendering. Set only on the
    /// one-shot anti-lecture retry.
    pub force_short: bool,
}

impl GenerationRequest {
    pub fn new(instructions: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            input: input.into(),
            digest: None,
            force_short: false,
        }
    }

    pub fn with_digest(mut self, digest: Option<String>) -> Self {
        self.digest = digest;
        self
    }

    pub fn forced_short(mut self) -> Self {
        self.force_short = true;
        self
    }
}

/// Interface to the external generation service. Only the content
/// dispatcher is permitted to call this; any failure is treated as "no
/// usable text" and never propagated to the end user.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> DomainResult<String>;
}
