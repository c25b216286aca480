//! Engine configuration.

use crate::error::{RecommendError, Result};
use serde::{Deserialize, Serialize};

/// Number of recommendations returned when the caller doesn't ask for a count
pub const DEFAULT_COUNT: usize = 5;

/// How two users' rating vectors are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMode {
    /// Cosine over full vectors with unrated cells as 0.
    ///
    /// Users who left the same movies unrated look alike, so scores lean
    /// towards overlap in what was skipped rather than in taste.
    #[default]
    ZeroFilled,

    /// Cosine over the movies both users rated. Users with no co-rated
    /// movie score 0.
    Masked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_count: usize,
    pub similarity_mode: SimilarityMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_count: DEFAULT_COUNT,
            similarity_mode: SimilarityMode::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_count == 0 {
            return Err(RecommendError::InvalidConfig(
                "default_count must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
