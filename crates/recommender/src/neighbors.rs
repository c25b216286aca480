//! Neighbour-based rating prediction.
//!
//! ## Algorithm
//! For every movie the target user has not rated:
//! 1. Collect other users with similarity > 0 who rated it
//! 2. Predict the similarity-weighted average of their scores
//! 3. Skip the movie if nobody qualifies
//!
//! Candidates come out in catalog order, then a stable sort by predicted
//! rating keeps that order among ties.

use crate::matrix::UserMovieMatrix;
use crate::outcome::Prediction;
use std::cmp::Ordering;
use tracing::debug;

/// Predict ratings for every unrated movie that has at least one neighbour.
///
/// `similarities` is the target's row of the similarity matrix.
pub fn predict(
    matrix: &UserMovieMatrix,
    similarities: &[f64],
    target_row: usize,
) -> Vec<Prediction> {
    let neighbors: Vec<(usize, f64)> = similarities
        .iter()
        .enumerate()
        .filter(|&(row, &sim)| row != target_row && sim > 0.0)
        .map(|(row, &sim)| (row, sim))
        .collect();
    debug!(
        "User {} has {} neighbours",
        matrix.user_at(target_row),
        neighbors.len()
    );

    let target = matrix.row(target_row);
    let mut predictions = Vec::new();

    for (col, &own) in target.iter().enumerate() {
        if own != 0.0 {
            continue;
        }

        let (mut weighted, mut weight, mut count) = (0.0, 0.0, 0usize);
        for &(row, sim) in &neighbors {
            let score = matrix.get(row, col);
            if score == 0.0 {
                continue;
            }
            weighted += sim * score;
            weight += sim;
            count += 1;
        }

        if count > 0 && weight > 0.0 {
            predictions.push(Prediction {
                movie_id: matrix.movie_at(col),
                predicted_rating: weighted / weight,
                neighbor_count: count,
            });
        }
    }

    predictions
}

/// Stable sort by predicted rating (highest first) and keep the top `limit`
pub fn rank(mut predictions: Vec<Prediction>, limit: usize) -> Vec<Prediction> {
    predictions.sort_by(|a, b| {
        b.predicted_rating
            .partial_cmp(&a.predicted_rating)
            .unwrap_or(Ordering::Equal)
    });
    predictions.truncate(limit);
    predictions
}
