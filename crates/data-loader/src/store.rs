//! Write paths and catalog queries on the DataIndex.
//!
//! These are what the request-handling layer calls: submitting a rating,
//! browsing and searching the catalog, and managing a watchlist.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use chrono::Utc;
use tracing::debug;

impl DataIndex {
    /// Record a user's rating, replacing any earlier rating for the same movie.
    ///
    /// Returns the previous rating when one was overwritten. Statistics for the
    /// movie are refreshed.
    pub fn upsert_rating(&mut self, rating: Rating) -> Result<Option<Rating>> {
        if !rating.is_valid_score() {
            return Err(DataLoadError::InvalidValue {
                field: "score".to_string(),
                value: rating.score.to_string(),
            });
        }
        if self.get_movie(rating.movie_id).is_none() {
            return Err(DataLoadError::MissingReference {
                entity: "Movie".to_string(),
                id: rating.movie_id.to_string(),
            });
        }

        let previous = self.get_rating(&rating.user_id, rating.movie_id).cloned();
        let movie_id = rating.movie_id;
        debug!(
            user_id = %rating.user_id,
            movie_id,
            score = rating.score,
            replaced = previous.is_some(),
            "Upserting rating"
        );
        self.insert_rating(rating);
        self.refresh_movie_stats(movie_id);
        Ok(previous)
    }

    fn refresh_movie_stats(&mut self, movie_id: MovieId) {
        let (count, total) = self
            .get_movie_ratings(movie_id)
            .into_iter()
            .fold((0u32, 0u32), |(count, total), r| (count + 1, total + r.score as u32));
        if count > 0 {
            self.movie_stats.insert(
                movie_id,
                MovieStats {
                    avg_rating: total as f32 / count as f32,
                    rating_count: count,
                },
            );
        }
    }

    /// Case-insensitive search over titles and genres.
    ///
    /// Exact title matches come first, then title substrings, then movies
    /// whose genre field matches. Catalog order is kept within each group.
    pub fn search_movies(&self, query: &str) -> Vec<&Movie> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut exact = Vec::new();
        let mut partial = Vec::new();
        let mut by_genre = Vec::new();
        for movie in &self.movies {
            let title = movie.title.to_lowercase();
            if title == needle {
                exact.push(movie);
            } else if title.contains(&needle) {
                partial.push(movie);
            } else if movie.genre.to_lowercase().contains(&needle) {
                by_genre.push(movie);
            }
        }
        exact.extend(partial);
        exact.extend(by_genre);
        exact
    }

    /// Movies listing the given genre (case-insensitive), in catalog order
    pub fn get_movies_by_genre(&self, genre: &str) -> Vec<&Movie> {
        self.genre_index
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(genre.trim()))
            .map(|(_, ids)| ids.iter().filter_map(|&id| self.get_movie(id)).collect())
            .unwrap_or_default()
    }

    /// Distinct genre names across the catalog, sorted
    pub fn genres(&self) -> Vec<&str> {
        self.genre_index.keys().map(String::as_str).collect()
    }

    /// Add a movie to a user's watchlist.
    ///
    /// Returns `false` when the movie was already on the list.
    pub fn add_to_watchlist(&mut self, user_id: &str, movie_id: MovieId) -> Result<bool> {
        if self.get_movie(movie_id).is_none() {
            return Err(DataLoadError::MissingReference {
                entity: "Movie".to_string(),
                id: movie_id.to_string(),
            });
        }

        let entries = self.watchlists.entry(user_id.to_string()).or_default();
        if entries.iter().any(|e| e.movie_id == movie_id) {
            return Ok(false);
        }
        entries.push(WatchlistEntry {
            user_id: user_id.to_string(),
            movie_id,
            added_at: Utc::now(),
        });
        Ok(true)
    }

    /// Remove a movie from a user's watchlist.
    ///
    /// Errors when the user has no watchlist; returns `false` when the movie
    /// was not on it.
    pub fn remove_from_watchlist(&mut self, user_id: &str, movie_id: MovieId) -> Result<bool> {
        let entries = self
            .watchlists
            .get_mut(user_id)
            .ok_or_else(|| DataLoadError::MissingReference {
                entity: "Watchlist".to_string(),
                id: user_id.to_string(),
            })?;
        let before = entries.len();
        entries.retain(|e| e.movie_id != movie_id);
        Ok(entries.len() < before)
    }

    /// Movies on a user's watchlist, oldest first
    pub fn watchlist(&self, user_id: &str) -> Vec<&Movie> {
        self.watchlists
            .get(user_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|e| self.get_movie(e.movie_id))
                    .collect()
            })
            .unwrap_or_default()
    }
}
