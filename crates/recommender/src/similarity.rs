//! Cosine similarity between users' rating vectors.

use crate::config::SimilarityMode;
use crate::matrix::UserMovieMatrix;

/// Cosine of two equal-length vectors. 0 when either vector is all zeros.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Cosine restricted to positions where both vectors are non-zero.
pub fn masked_cosine(a: &[f64], b: &[f64]) -> f64 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b) {
        if x == 0.0 || y == 0.0 {
            continue;
        }
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Symmetric user × user similarity matrix, indexed by matrix row.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn compute(matrix: &UserMovieMatrix, mode: SimilarityMode) -> Self {
        let size = matrix.user_count();
        let measure: fn(&[f64], &[f64]) -> f64 = match mode {
            SimilarityMode::ZeroFilled => cosine,
            SimilarityMode::Masked => masked_cosine,
        };

        let mut values = vec![0.0; size * size];
        for i in 0..size {
            let row_i = matrix.row(i);
            values[i * size + i] = measure(row_i, row_i);
            for j in (i + 1)..size {
                let s = measure(row_i, matrix.row(j));
                values[i * size + j] = s;
                values[j * size + i] = s;
            }
        }

        Self { size, values }
    }

    /// Similarity of one user against every user (including themselves)
    pub fn row(&self, user_row: usize) -> &[f64] {
        &self.values[user_row * self.size..(user_row + 1) * self.size]
    }

    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.values[a * self.size + b]
    }

    pub fn size(&self) -> usize {
        self.size
    }
}
