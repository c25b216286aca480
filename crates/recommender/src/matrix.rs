//! Dense user × movie rating matrix.
//!
//! Rows are users sorted by id, columns are movies in catalog order, and an
//! unrated cell holds 0. Built fresh for every recommendation call.

use crate::error::{RecommendError, Result};
use data_loader::{Movie, MovieId, Rating, UserId};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone)]
pub struct UserMovieMatrix {
    users: Vec<UserId>,
    user_index: HashMap<UserId, usize>,
    movies: Vec<MovieId>,
    movie_index: HashMap<MovieId, usize>,
    /// Row-major, `users.len() * movies.len()` cells
    values: Vec<f64>,
}

impl UserMovieMatrix {
    /// Build the matrix from the catalog and every rating.
    ///
    /// Fails on a rating for a movie missing from the catalog or a score
    /// outside 1..=5. Duplicate (user, movie) pairs keep the last value seen.
    pub fn build(movies: &[Movie], ratings: &[Rating]) -> Result<Self> {
        let movie_ids: Vec<MovieId> = movies.iter().map(|m| m.id).collect();
        let mut movie_index = HashMap::with_capacity(movie_ids.len());
        for (col, &id) in movie_ids.iter().enumerate() {
            movie_index.entry(id).or_insert(col);
        }

        let users: Vec<UserId> = ratings
            .iter()
            .map(|r| r.user_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let user_index: HashMap<UserId, usize> = users
            .iter()
            .enumerate()
            .map(|(row, id)| (id.clone(), row))
            .collect();

        let width = movie_ids.len();
        let mut values = vec![0.0; users.len() * width];

        for rating in ratings {
            if !rating.is_valid_score() {
                return Err(RecommendError::InvalidScore {
                    user_id: rating.user_id.clone(),
                    movie_id: rating.movie_id,
                    score: rating.score,
                });
            }
            let col = *movie_index
                .get(&rating.movie_id)
                .ok_or_else(|| RecommendError::UnknownMovie {
                    user_id: rating.user_id.clone(),
                    movie_id: rating.movie_id,
                })?;
            let row = user_index[&rating.user_id];
            values[row * width + col] = rating.score as f64;
        }

        Ok(Self {
            users,
            user_index,
            movies: movie_ids,
            movie_index,
            values,
        })
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn movie_count(&self) -> usize {
        self.movies.len()
    }

    /// Row of a user, or `UnknownUser` if they have no ratings
    pub fn user_row(&self, user_id: &str) -> Result<usize> {
        self.user_index
            .get(user_id)
            .copied()
            .ok_or_else(|| RecommendError::UnknownUser(user_id.to_string()))
    }

    pub fn movie_col(&self, movie_id: MovieId) -> Option<usize> {
        self.movie_index.get(&movie_id).copied()
    }

    pub fn user_at(&self, row: usize) -> &str {
        &self.users[row]
    }

    pub fn movie_at(&self, col: usize) -> MovieId {
        self.movies[col]
    }

    /// A user's rating vector
    pub fn row(&self, row: usize) -> &[f64] {
        let width = self.movies.len();
        &self.values[row * width..(row + 1) * width]
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.movies.len() + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn catalog(ids: &[MovieId]) -> Vec<Movie> {
        ids.iter()
            .map(|&id| Movie {
                id,
                title: format!("Movie {}", id),
                genre: "Drama".to_string(),
                release_date: NaiveDate::from_ymd_opt(2010, 5, 1).unwrap(),
                description: String::new(),
                poster_url: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_build_dense_matrix() {
        let movies = catalog(&[30, 10, 20]);
        let ratings = vec![
            Rating::new("zoe", 10, 4),
            Rating::new("amy", 30, 5),
            Rating::new("amy", 20, 2),
        ];

        let matrix = UserMovieMatrix::build(&movies, &ratings).unwrap();
        assert_eq!(matrix.user_count(), 2);
        assert_eq!(matrix.movie_count(), 3);

        // Users sorted by id, movies in catalog order
        assert_eq!(matrix.user_at(0), "amy");
        assert_eq!(matrix.movie_at(0), 30);
        assert_eq!(matrix.row(0), &[5.0, 0.0, 2.0]);
        assert_eq!(matrix.row(matrix.user_row("zoe").unwrap()), &[0.0, 4.0, 0.0]);
        assert_eq!(matrix.get(1, 1), 4.0);
        assert_eq!(matrix.movie_col(20), Some(2));
    }

    #[test]
    fn test_unknown_user() {
        let matrix = UserMovieMatrix::build(&catalog(&[1]), &[Rating::new("a", 1, 3)]).unwrap();
        assert!(matches!(
            matrix.user_row("b"),
            Err(RecommendError::UnknownUser(id)) if id == "b"
        ));
    }

    #[test]
    fn test_rating_for_missing_movie_fails() {
        let result = UserMovieMatrix::build(&catalog(&[1]), &[Rating::new("a", 2, 3)]);
        assert!(matches!(
            result,
            Err(RecommendError::UnknownMovie { movie_id: 2, .. })
        ));
    }

    #[test]
    fn test_out_of_range_score_fails() {
        let result = UserMovieMatrix::build(&catalog(&[1]), &[Rating::new("a", 1, 0)]);
        assert!(matches!(result, Err(RecommendError::InvalidScore { score: 0, .. })));
    }

    #[test]
    fn test_empty_inputs() {
        let matrix = UserMovieMatrix::build(&[], &[]).unwrap();
        assert_eq!(matrix.user_count(), 0);
        assert_eq!(matrix.movie_count(), 0);
    }
}
