//! Configuration model.
//!
//! Classifier thresholds and pacing constants are configuration, not code:
//! they are tuned against the property tests rather than treated as fixed
//! contracts.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generation: GenerationConfig,
    pub logging: LoggingConfig,
    pub state: StateConfig,
    pub thresholds: Thresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            logging: LoggingConfig::default(),
            state: StateConfig::default(),
            thresholds: Thresholds::default(),
        }
    }
}

/// Generation service client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Primary model name.
    pub model: String,
    /// Fallback model tried once when the primary call fails.
    pub fallback_model: String,
    /// Base URL of the generation API.
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Client-side request timeout. A timeout is treated as a generation
    /// failure and recovered with the apology fallback.
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4.1".to_string(),
            fallback_model: "gpt-4.1-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "STOA_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of: trace, debug, info, warn, error.
    pub level: String,
    /// One of: json, pretty.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// State persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Path of the JSON state snapshot file.
    pub path: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: ".stoa/state.json".to_string(),
        }
    }
}

/// Tunable classifier thresholds and pacing constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// An utterance at least this long is substantive on length alone.
    pub long_utterance_chars: usize,
    /// Shorter utterances are substantive with enough topic markers or
    /// sentence structure.
    pub marker_utterance_chars: usize,
    pub marker_min_hits: usize,
    /// Below this length an utterance with no topic keyword may be treated
    /// as ambiguous.
    pub ambiguous_max_chars: usize,
    /// Capability detector score threshold.
    pub capability_min_score: i32,
    /// Utterances longer than this skip warmup templates outright.
    pub warmup_bypass_chars: usize,
    /// Guided-path previews are only offered below this utterance length.
    pub guided_path_max_chars: usize,
    /// Turns a chosen lens stays locked.
    pub topic_lock_turns: u32,
    /// Turns before an unresolved follow-through expires.
    pub followthrough_expiry_turns: u32,
    /// Practice cooldown set after an actionable exercise was emitted.
    pub practice_cooldown_turns: u32,
    /// Minimum turns between topical injections.
    pub injection_cooldown_turns: u32,
    /// Minimum turns between templated bridge openings.
    pub bridge_cooldown_turns: u32,
    /// Minimum guidance turns between forced-choice forks.
    pub fork_min_gap_turns: u32,
    /// History buffer cap (entries, oldest evicted first).
    pub history_cap: usize,
    /// Completion-guard minimum reply length in guidance stage.
    pub guidance_min_reply_chars: usize,
    /// Completion-guard minimum reply length in warmup stage.
    pub warmup_min_reply_chars: usize,
    /// Guidance replies shorter than this set the expand-next flag.
    pub short_reply_expand_chars: usize,
    /// Replies longer than this are judged lecturing and retried short.
    pub lecture_max_chars: usize,
    /// Line count above which a reply is judged lecturing.
    pub lecture_max_lines: usize,
    /// Hard cap on any single reply so no transport needs to truncate.
    pub max_reply_chars: usize,
    /// Minimum recorded turns before an interest suggestion may appear.
    pub suggest_min_turns: u32,
    /// Minimum turns between interest suggestions.
    pub suggest_cooldown_turns: u32,
    /// Minimum interest share for a suggestion.
    pub suggest_min_confidence: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            long_utterance_chars: 220,
            marker_utterance_chars: 160,
            marker_min_hits: 2,
            ambiguous_max_chars: 60,
            capability_min_score: 3,
            warmup_bypass_chars: 250,
            guided_path_max_chars: 250,
            topic_lock_turns: 4,
            followthrough_expiry_turns: 6,
            practice_cooldown_turns: 3,
            injection_cooldown_turns: 4,
            bridge_cooldown_turns: 2,
            fork_min_gap_turns: 3,
            history_cap: 20,
            guidance_min_reply_chars: 240,
            warmup_min_reply_chars: 60,
            short_reply_expand_chars: 280,
            lecture_max_chars: 1400,
            lecture_max_lines: 14,
            max_reply_chars: 3600,
            suggest_min_turns: 5,
            suggest_cooldown_turns: 25,
            suggest_min_confidence: 0.6,
        }
    }
}
