//! Read-only repository interfaces consumed by the recommender.
//!
//! The engine receives these as typed trait objects instead of looking up
//! storage by name. `DataIndex` implements both; other backends (a SQL pool,
//! a test double) only need to provide these three reads.

use crate::error::Result;
use crate::types::{DataIndex, Movie, Rating};
use std::sync::{Arc, RwLock};

/// Source of the movie catalog.
///
/// `Send + Sync` so an engine holding one can be shared across request tasks.
pub trait MovieRepository: Send + Sync {
    /// Every movie, in stable catalog order
    fn list_all_movies(&self) -> Result<Vec<Movie>>;
}

/// Source of user ratings.
pub trait RatingRepository: Send + Sync {
    /// Every rating in the system
    fn list_all_ratings(&self) -> Result<Vec<Rating>>;

    /// Ratings made by one user
    fn list_ratings_for_user(&self, user_id: &str) -> Result<Vec<Rating>>;
}

impl MovieRepository for DataIndex {
    fn list_all_movies(&self) -> Result<Vec<Movie>> {
        Ok(self.movies.clone())
    }
}

impl RatingRepository for DataIndex {
    fn list_all_ratings(&self) -> Result<Vec<Rating>> {
        Ok(self.ratings.clone())
    }

    fn list_ratings_for_user(&self, user_id: &str) -> Result<Vec<Rating>> {
        Ok(self.get_user_ratings(user_id).into_iter().cloned().collect())
    }
}

/// A store that keeps accepting writes while being read.
///
/// Reads take the lock briefly and return owned snapshots, so a
/// recommendation call never holds the lock while it computes.
impl MovieRepository for RwLock<DataIndex> {
    fn list_all_movies(&self) -> Result<Vec<Movie>> {
        read_lock(self)?.list_all_movies()
    }
}

impl RatingRepository for RwLock<DataIndex> {
    fn list_all_ratings(&self) -> Result<Vec<Rating>> {
        read_lock(self)?.list_all_ratings()
    }

    fn list_ratings_for_user(&self, user_id: &str) -> Result<Vec<Rating>> {
        read_lock(self)?.list_ratings_for_user(user_id)
    }
}

fn read_lock(lock: &RwLock<DataIndex>) -> Result<std::sync::RwLockReadGuard<'_, DataIndex>> {
    lock.read()
        .map_err(|_| crate::DataLoadError::Unavailable("store lock poisoned".to_string()))
}

impl<T: MovieRepository + ?Sized> MovieRepository for Arc<T> {
    fn list_all_movies(&self) -> Result<Vec<Movie>> {
        (**self).list_all_movies()
    }
}

impl<T: RatingRepository + ?Sized> RatingRepository for Arc<T> {
    fn list_all_ratings(&self) -> Result<Vec<Rating>> {
        (**self).list_all_ratings()
    }

    fn list_ratings_for_user(&self, user_id: &str) -> Result<Vec<Rating>> {
        (**self).list_ratings_for_user(user_id)
    }
}
