//! Benchmarks for the recommendation engine
//!
//! Run with: cargo bench --package recommender
//!
//! Uses a synthetic population so no dataset is needed.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{DataIndex, Movie, Rating};
use recommender::{RecommendationEngine, SimilarityMatrix, SimilarityMode, UserMovieMatrix};
use std::sync::Arc;

const USERS: u32 = 300;
const MOVIES: u32 = 400;

fn build_synthetic_index() -> Arc<DataIndex> {
    let mut index = DataIndex::new();
    for id in 1..=MOVIES {
        index.insert_movie(Movie {
            id,
            title: format!("Movie {}", id),
            genre: "Drama".to_string(),
            release_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            description: String::new(),
            poster_url: String::new(),
        });
    }
    // Deterministic sparse ratings: each user rates roughly every 7th movie
    for user in 0..USERS {
        for movie in 1..=MOVIES {
            if (user * 31 + movie * 17) % 7 == 0 {
                let score = ((user + movie) % 5 + 1) as u8;
                index.insert_rating(Rating::new(format!("user{}", user), movie, score));
            }
        }
    }
    Arc::new(index)
}

fn bench_recommend(c: &mut Criterion) {
    let index = build_synthetic_index();
    let engine = RecommendationEngine::new(index.clone(), index);

    c.bench_function("recommend_zero_filled", |b| {
        b.iter(|| black_box(engine.recommend(black_box("user42"), black_box(10))))
    });

    let masked = engine.clone().with_similarity_mode(SimilarityMode::Masked);
    c.bench_function("recommend_masked", |b| {
        b.iter(|| black_box(masked.recommend(black_box("user42"), black_box(10))))
    });
}

fn bench_similarity_matrix(c: &mut Criterion) {
    let index = build_synthetic_index();
    let matrix = UserMovieMatrix::build(index.movies(), index.ratings()).unwrap();

    c.bench_function("similarity_matrix", |b| {
        b.iter(|| black_box(SimilarityMatrix::compute(&matrix, SimilarityMode::ZeroFilled)))
    });
}

criterion_group!(benches, bench_recommend, bench_similarity_matrix);
criterion_main!(benches);
