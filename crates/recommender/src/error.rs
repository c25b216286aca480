//! Error types for the recommender crate.
//!
//! None of these escape `RecommendationEngine::recommend`; they are carried
//! inside `Outcome::Fallback` and logged before the popularity list is served.

use data_loader::{DataLoadError, MovieId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecommendError {
    /// Target user has no row in the rating matrix
    #[error("User {0} has no ratings")]
    UnknownUser(String),

    /// Nothing in the catalog to recommend or pad with
    #[error("Catalog is empty")]
    EmptyCatalog,

    /// A rating points at a movie the catalog doesn't contain
    #[error("Rating by {user_id} references unknown movie {movie_id}")]
    UnknownMovie { user_id: String, movie_id: MovieId },

    /// A rating carries a score outside 1..=5
    #[error("Rating by {user_id} for movie {movie_id} has invalid score {score}")]
    InvalidScore {
        user_id: String,
        movie_id: MovieId,
        score: u8,
    },

    /// Reading from the storage collaborator failed
    #[error("Storage read failed: {0}")]
    Storage(#[from] DataLoadError),

    /// Engine configured with values it can't run with
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Any other failure while building the matrix or scoring
    #[error("Computation failed: {0}")]
    Computation(String),
}

pub type Result<T> = std::result::Result<T, RecommendError>;
