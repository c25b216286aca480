//! DataIndex building and indexing logic.
//!
//! Builds the DataIndex from parsed data:
//! - Primary stores (catalog, ratings keyed by user and movie)
//! - Secondary indices (genre_index)
//! - Aggregate statistics (movie stats)

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

impl DataIndex {
    /// Load the catalog and ratings from a dataset directory
    ///
    /// Steps:
    /// 1. Parse `movies.dat` and `ratings.dat` in parallel
    /// 2. Insert into the store (genre index kept as movies go in,
    ///    ratings upserted in file order)
    /// 3. Compute movie statistics
    /// 4. Validate data integrity
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading dataset from {:?}", data_dir);

        let movies_path = data_dir.join("movies.dat");
        let ratings_path = data_dir.join("ratings.dat");

        let (movies, ratings) = rayon::join(
            || parser::parse_movies(&movies_path),
            || parser::parse_ratings(&ratings_path),
        );
        let movies = movies?;
        let ratings = ratings?;

        info!("Parsed {} movies, {} ratings", movies.len(), ratings.len());

        let mut index = DataIndex::new();
        for movie in movies {
            index.insert_movie(movie);
        }
        for rating in ratings {
            index.insert_rating(rating);
        }

        debug!("Indexed {} genres", index.genre_index.len());
        index.compute_movie_stats();
        index.validate()?;

        let (users, movies, ratings) = index.counts();
        info!(
            "DataIndex built: {} rating users, {} movies, {} ratings",
            users, movies, ratings
        );
        Ok(index)
    }

    /// Rebuild the genre index from the catalog
    pub fn build_secondary_indices(&mut self) {
        self.genre_index.clear();
        for pos in 0..self.movies.len() {
            self.index_genres(pos);
        }
        debug!("Indexed {} genres", self.genre_index.len());
    }

    /// Compute average score and rating count for every rated movie
    pub fn compute_movie_stats(&mut self) {
        let mut per_movie: HashMap<MovieId, Vec<u8>> = HashMap::new();
        for rating in &self.ratings {
            per_movie.entry(rating.movie_id).or_default().push(rating.score);
        }

        self.movie_stats = per_movie
            .par_iter()
            .map(|(&movie_id, scores)| {
                let rating_count = scores.len() as u32;
                let total: u32 = scores.iter().map(|&s| s as u32).sum();
                let avg_rating = if rating_count > 0 {
                    total as f32 / rating_count as f32
                } else {
                    0.0
                };
                (movie_id, MovieStats { avg_rating, rating_count })
            })
            .collect();
    }

    /// Validate data integrity
    ///
    /// Every rating must reference a catalog movie and carry a score in 1..=5.
    pub fn validate(&self) -> Result<()> {
        for rating in &self.ratings {
            if !self.movie_positions.contains_key(&rating.movie_id) {
                return Err(DataLoadError::MissingReference {
                    entity: "Movie".to_string(),
                    id: rating.movie_id.to_string(),
                });
            }
            if !rating.is_valid_score() {
                return Err(DataLoadError::InvalidValue {
                    field: "score".to_string(),
                    value: rating.score.to_string(),
                });
            }
        }
        Ok(())
    }
}
