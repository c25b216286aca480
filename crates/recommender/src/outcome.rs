//! Result of the personalized computation, before final shaping.

use crate::error::RecommendError;
use data_loader::MovieId;
use serde::Serialize;
use std::collections::HashSet;

/// A candidate movie with its similarity-weighted predicted rating
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub movie_id: MovieId,
    pub predicted_rating: f64,
    /// Neighbours that contributed to the prediction
    pub neighbor_count: usize,
}

/// What the neighbour-based pass produced for one request.
///
/// The engine turns each variant into the final list: `Personalized` is
/// padded from the catalog, `Empty` and `Fallback` get the popularity list.
#[derive(Debug)]
pub enum Outcome {
    /// Ranked predictions (possibly fewer than requested, possibly none)
    /// and the movies the user already rated.
    Personalized {
        predictions: Vec<Prediction>,
        rated: HashSet<MovieId>,
    },
    /// No rating data for this user, or none in the system at all
    Empty,
    /// The computation failed; the error has been absorbed
    Fallback(RecommendError),
}

impl Outcome {
    pub fn is_personalized(&self) -> bool {
        matches!(self, Outcome::Personalized { .. })
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Personalized { .. } => "personalized",
            Outcome::Empty => "empty",
            Outcome::Fallback(_) => "fallback",
        }
    }
}
