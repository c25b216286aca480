//! # Recommendation Engine
//!
//! Coordinates one recommendation request:
//! 1. Read the catalog
//! 2. Check whether there is any rating signal for the user
//! 3. Build the user × movie matrix and the user × user similarity matrix
//! 4. Predict ratings for unrated movies from positively similar neighbours
//! 5. Rank, then pad or replace with the popularity fallback
//!
//! Every failure is absorbed: callers always receive a list, at worst empty.
//! All working state is local to the call, so one engine can serve
//! concurrent requests.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, instrument, warn};

use data_loader::{Movie, MovieId, MovieRepository, RatingRepository, UserIdentity};

use crate::config::{EngineConfig, SimilarityMode};
use crate::error::{RecommendError, Result};
use crate::matrix::UserMovieMatrix;
use crate::neighbors;
use crate::outcome::{Outcome, Prediction};
use crate::popularity;
use crate::similarity::SimilarityMatrix;

#[derive(Clone)]
pub struct RecommendationEngine {
    movies: Arc<dyn MovieRepository>,
    ratings: Arc<dyn RatingRepository>,
    config: EngineConfig,
}

impl RecommendationEngine {
    /// Create an engine reading from the given repositories with default settings
    pub fn new(movies: Arc<dyn MovieRepository>, ratings: Arc<dyn RatingRepository>) -> Self {
        Self {
            movies,
            ratings,
            config: EngineConfig::default(),
        }
    }

    /// Replace the whole configuration, rejecting values the engine can't run with
    pub fn with_config(mut self, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Configure the similarity measure (default: zero-filled cosine)
    pub fn with_similarity_mode(mut self, mode: SimilarityMode) -> Self {
        self.config.similarity_mode = mode;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Recommend up to `count` movies for a user.
    ///
    /// Never fails. An unreadable or empty catalog yields an empty list.
    #[instrument(skip(self), fields(mode = ?self.config.similarity_mode))]
    pub fn recommend(&self, user_id: &str, count: usize) -> Vec<Movie> {
        let start = Instant::now();
        if count == 0 {
            return Vec::new();
        }

        let catalog = match self.movies.list_all_movies() {
            Ok(catalog) => catalog,
            Err(e) => {
                error!("Catalog unavailable, returning no recommendations: {}", e);
                return Vec::new();
            }
        };
        if catalog.is_empty() {
            debug!("{}", RecommendError::EmptyCatalog);
            return Vec::new();
        }

        let outcome = self.compute_with_catalog(&catalog, user_id, count);
        info!("Outcome for user {}: {}", user_id, outcome.kind());

        let recommendations = self.shape(outcome, &catalog, count);
        info!(
            "Returning {} recommendations for user {} in {:.2?}",
            recommendations.len(),
            user_id,
            start.elapsed()
        );
        recommendations
    }

    /// Recommend `default_count` movies
    pub fn recommend_default(&self, user_id: &str) -> Vec<Movie> {
        self.recommend(user_id, self.config.default_count)
    }

    /// Recommend for an authenticated identity
    pub fn recommend_for(&self, identity: &UserIdentity, count: usize) -> Vec<Movie> {
        self.recommend(&identity.user_id, count)
    }

    /// Same as [`recommend`](Self::recommend) but only the movie ids
    pub fn recommend_ids(&self, user_id: &str, count: usize) -> Vec<MovieId> {
        self.recommend(user_id, count)
            .into_iter()
            .map(|m| m.id)
            .collect()
    }

    /// Run the personalized pass alone and report what happened.
    pub fn compute(&self, user_id: &str, count: usize) -> Outcome {
        match self.movies.list_all_movies() {
            Ok(catalog) => self.compute_with_catalog(&catalog, user_id, count),
            Err(e) => Outcome::Fallback(e.into()),
        }
    }

    fn compute_with_catalog(&self, catalog: &[Movie], user_id: &str, count: usize) -> Outcome {
        match self.personalize(catalog, user_id, count) {
            Ok(Some((predictions, rated))) => Outcome::Personalized { predictions, rated },
            Ok(None) | Err(RecommendError::UnknownUser(_)) => Outcome::Empty,
            Err(e) => {
                warn!("Recommendation failed for user {}, using fallback: {}", user_id, e);
                Outcome::Fallback(e)
            }
        }
    }

    /// `Ok(None)` when there's no rating signal to personalize from
    fn personalize(
        &self,
        catalog: &[Movie],
        user_id: &str,
        count: usize,
    ) -> Result<Option<(Vec<Prediction>, HashSet<MovieId>)>> {
        if catalog.is_empty() {
            return Err(RecommendError::EmptyCatalog);
        }

        let all_ratings = self.ratings.list_all_ratings()?;
        if all_ratings.is_empty() {
            debug!("No ratings in the system");
            return Ok(None);
        }

        let user_ratings = self.ratings.list_ratings_for_user(user_id)?;
        if user_ratings.is_empty() {
            debug!("User {} has not rated anything", user_id);
            return Ok(None);
        }
        let rated: HashSet<MovieId> = user_ratings.iter().map(|r| r.movie_id).collect();

        let matrix = UserMovieMatrix::build(catalog, &all_ratings)?;
        let target = matrix.user_row(user_id)?;
        debug!(
            "Built {}x{} rating matrix",
            matrix.user_count(),
            matrix.movie_count()
        );

        let similarities = SimilarityMatrix::compute(&matrix, self.config.similarity_mode);
        let predictions = neighbors::predict(&matrix, similarities.row(target), target);
        debug!("Predicted ratings for {} movies", predictions.len());

        Ok(Some((neighbors::rank(predictions, count), rated)))
    }

    /// Turn an outcome into the final list
    fn shape(&self, outcome: Outcome, catalog: &[Movie], count: usize) -> Vec<Movie> {
        match outcome {
            Outcome::Personalized { predictions, rated } => {
                let selected: Vec<MovieId> = predictions.iter().map(|p| p.movie_id).collect();
                if selected.len() < count {
                    debug!(
                        "Padding {} personalized picks up to {}",
                        selected.len(),
                        count
                    );
                }
                popularity::pad(&selected, catalog, &rated, count)
            }
            Outcome::Empty | Outcome::Fallback(_) => popularity::top_of_catalog(catalog, count),
        }
    }
}
