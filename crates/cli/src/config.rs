use std::path::PathBuf;

use anyhow::Context;
use recommender::{EngineConfig, SimilarityMode, DEFAULT_COUNT};
use serde::Deserialize;

/// Settings read from `RECS_*` environment variables (and `.env`).
///
/// Command line flags override these.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Directory holding movies.dat and ratings.dat
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Recommendations returned when no limit is given
    #[serde(default = "default_count")]
    pub default_count: usize,

    /// `zero_filled` or `masked`
    #[serde(default)]
    pub similarity_mode: SimilarityMode,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/catalog")
}

fn default_count() -> usize {
    DEFAULT_COUNT
}

impl Settings {
    /// Load settings from the environment
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed("RECS_")
            .from_iter(vars)
            .context("Failed to load RECS_* settings")
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            default_count: self.default_count,
            similarity_mode: self.similarity_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_vars(vars(&[("PATH", "/usr/bin")])).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("data/catalog"));
        assert_eq!(settings.default_count, 5);
        assert_eq!(settings.similarity_mode, SimilarityMode::ZeroFilled);
    }

    #[test]
    fn test_prefixed_overrides() {
        let settings = Settings::from_vars(vars(&[
            ("RECS_DATA_DIR", "/srv/movies"),
            ("RECS_DEFAULT_COUNT", "12"),
            ("RECS_SIMILARITY_MODE", "masked"),
        ]))
        .unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("/srv/movies"));
        assert_eq!(settings.engine_config().default_count, 12);
        assert_eq!(settings.engine_config().similarity_mode, SimilarityMode::Masked);
    }

    #[test]
    fn test_bad_value_reported() {
        let result = Settings::from_vars(vars(&[("RECS_DEFAULT_COUNT", "lots")]));
        assert!(result.is_err());
    }
}
