//! Core domain types for the movie catalog and its ratings.
//!
//! This module defines the fundamental data structures used throughout the system:
//! - Type aliases for domain clarity (UserId, MovieId)
//! - Catalog and rating records as read by the recommendation engine
//! - The immutable user identity handed down by the authentication boundary
//! - `DataIndex`, the in-memory store that owns all of the above

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// Type Aliases
// =============================================================================

/// Identifier issued by the identity provider for a user
pub type UserId = String;

/// Catalog identifier for a movie
pub type MovieId = u32;

/// Lowest score a rating may carry
pub const MIN_SCORE: u8 = 1;

/// Highest score a rating may carry
pub const MAX_SCORE: u8 = 5;

// =============================================================================
// User-related Types
// =============================================================================

/// Identity of an authenticated user.
///
/// Produced once by the authentication boundary and passed down by value;
/// nothing below that boundary builds or mutates one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: UserId,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl UserIdentity {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name to show for this user: display name, then email, then the raw id
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.user_id)
    }
}

// =============================================================================
// Movie-related Types
// =============================================================================

/// A catalog entry. Read-only reference data for the recommender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Free-form genre field; may list several names separated by `|`
    pub genre: String,
    pub release_date: NaiveDate,
    pub description: String,
    /// Poster URL, empty until a poster has been fetched
    pub poster_url: String,
}

impl Movie {
    /// Individual genre names listed in the genre field
    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.genre
            .split('|')
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }
}

// =============================================================================
// Rating Type
// =============================================================================

/// A single user's score for a movie.
///
/// At most one exists per (user, movie) pair; the store overwrites on re-rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Score from 1 to 5
    pub score: u8,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(user_id: impl Into<UserId>, movie_id: MovieId, score: u8) -> Self {
        Self {
            user_id: user_id.into(),
            movie_id,
            score,
            review: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_review(mut self, review: impl Into<String>) -> Self {
        self.review = Some(review.into());
        self
    }

    pub fn is_valid_score(&self) -> bool {
        (MIN_SCORE..=MAX_SCORE).contains(&self.score)
    }
}

// =============================================================================
// Watchlist Type
// =============================================================================

/// A movie a user saved for later
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub added_at: DateTime<Utc>,
}

// =============================================================================
// Statistics Types
// =============================================================================

/// Precomputed rating statistics for a movie
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovieStats {
    pub avg_rating: f32,
    pub rating_count: u32,
}

// =============================================================================
// DataIndex - The In-Memory Store
// =============================================================================

/// In-memory store holding the catalog, ratings and watchlists.
///
/// Catalog order is insertion order and is what the popularity fallback
/// walks. Ratings are keyed by (user, movie) so re-rating replaces the
/// previous record in place.
#[derive(Debug, Default)]
pub struct DataIndex {
    // Primary data stores
    pub(crate) movies: Vec<Movie>,
    pub(crate) movie_positions: HashMap<MovieId, usize>,
    pub(crate) ratings: Vec<Rating>,

    // Rating indices
    /// Slot in `ratings` for each (user, movie) pair
    pub(crate) rating_slots: HashMap<(UserId, MovieId), usize>,
    /// Slots of every rating made by each user, in insertion order
    pub(crate) user_ratings: HashMap<UserId, Vec<usize>>,
    /// Slots of every rating a movie received, in insertion order
    pub(crate) movie_ratings: HashMap<MovieId, Vec<usize>>,

    // Secondary indices
    /// Movies grouped by genre name (sorted by name), catalog order within a genre
    pub(crate) genre_index: BTreeMap<String, Vec<MovieId>>,

    // Precomputed statistics
    pub(crate) movie_stats: HashMap<MovieId, MovieStats>,

    pub(crate) watchlists: HashMap<UserId, Vec<WatchlistEntry>>,
}

impl DataIndex {
    /// Creates a new, empty DataIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movie_positions.get(&id).map(|&pos| &self.movies[pos])
    }

    /// All movies in catalog order
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// All ratings in insertion order
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    /// Get all ratings made by a user, in the order they were first recorded
    pub fn get_user_ratings(&self, user_id: &str) -> Vec<&Rating> {
        self.user_ratings
            .get(user_id)
            .map(|slots| slots.iter().map(|&slot| &self.ratings[slot]).collect())
            .unwrap_or_default()
    }

    /// Get every rating a movie received, in the order they were first recorded
    pub fn get_movie_ratings(&self, movie_id: MovieId) -> Vec<&Rating> {
        self.movie_ratings
            .get(&movie_id)
            .map(|slots| slots.iter().map(|&slot| &self.ratings[slot]).collect())
            .unwrap_or_default()
    }

    /// Get the rating a user gave a movie, if any
    pub fn get_rating(&self, user_id: &str, movie_id: MovieId) -> Option<&Rating> {
        self.rating_slots
            .get(&(user_id.to_string(), movie_id))
            .map(|&slot| &self.ratings[slot])
    }

    /// Get precomputed statistics for a movie
    pub fn get_movie_stats(&self, movie_id: MovieId) -> Option<&MovieStats> {
        self.movie_stats.get(&movie_id)
    }

    /// Insert a movie, replacing any catalog entry with the same id in place.
    ///
    /// The genre index follows the new entry.
    pub fn insert_movie(&mut self, movie: Movie) {
        let pos = match self.movie_positions.get(&movie.id) {
            Some(&pos) => {
                self.unindex_genres(pos);
                self.movies[pos] = movie;
                pos
            }
            None => {
                let pos = self.movies.len();
                self.movie_positions.insert(movie.id, pos);
                self.movies.push(movie);
                pos
            }
        };
        self.index_genres(pos);
    }

    fn unindex_genres(&mut self, pos: usize) {
        let movie = &self.movies[pos];
        for genre in movie.genres() {
            if let Some(ids) = self.genre_index.get_mut(genre) {
                ids.retain(|&id| id != movie.id);
                if ids.is_empty() {
                    self.genre_index.remove(genre);
                }
            }
        }
    }

    pub(crate) fn index_genres(&mut self, pos: usize) {
        let movie = &self.movies[pos];
        for genre in movie.genres() {
            let ids = self.genre_index.entry(genre.to_string()).or_default();
            if ids.contains(&movie.id) {
                continue;
            }
            // Keep catalog order inside the genre
            let at = ids.partition_point(|id| self.movie_positions[id] < pos);
            ids.insert(at, movie.id);
        }
    }

    /// Insert a rating without validation, overwriting any prior rating
    /// for the same (user, movie) pair.
    pub fn insert_rating(&mut self, rating: Rating) {
        let key = (rating.user_id.clone(), rating.movie_id);
        match self.rating_slots.get(&key) {
            Some(&slot) => self.ratings[slot] = rating,
            None => {
                let slot = self.ratings.len();
                self.user_ratings
                    .entry(rating.user_id.clone())
                    .or_default()
                    .push(slot);
                self.movie_ratings
                    .entry(rating.movie_id)
                    .or_default()
                    .push(slot);
                self.rating_slots.insert(key, slot);
                self.ratings.push(rating);
            }
        }
    }

    /// Get counts for debugging/validation: (users with ratings, movies, ratings)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.user_ratings.len(), self.movies.len(), self.ratings.len())
    }
}
