//! Popularity fallback.
//!
//! "Popular" here is catalog order: the first movies the storage layer
//! lists. Used whole when personalization is unavailable and to top up a
//! short personalized list.

use data_loader::{Movie, MovieId};
use std::collections::HashSet;

/// The first `count` catalog movies
pub fn top_of_catalog(catalog: &[Movie], count: usize) -> Vec<Movie> {
    catalog.iter().take(count).cloned().collect()
}

/// Resolve `selected` ids against the catalog, then pad with catalog movies
/// that are neither rated nor already selected until `count` is reached.
///
/// Ids missing from the catalog are dropped. Never returns more than `count`.
pub fn pad(
    selected: &[MovieId],
    catalog: &[Movie],
    rated: &HashSet<MovieId>,
    count: usize,
) -> Vec<Movie> {
    let mut taken: HashSet<MovieId> = HashSet::with_capacity(count);
    let mut result: Vec<Movie> = Vec::with_capacity(count);

    for &movie_id in selected {
        if result.len() == count {
            return result;
        }
        if rated.contains(&movie_id) || !taken.insert(movie_id) {
            continue;
        }
        if let Some(movie) = catalog.iter().find(|m| m.id == movie_id) {
            result.push(movie.clone());
        }
    }

    for movie in catalog {
        if result.len() == count {
            break;
        }
        if rated.contains(&movie.id) || taken.contains(&movie.id) {
            continue;
        }
        taken.insert(movie.id);
        result.push(movie.clone());
    }

    result
}
