//! Integration tests for the recommendation engine.
//!
//! These run the engine end to end over an in-memory store and check the
//! guarantees callers rely on: bounded length, fallback behaviour, no
//! already-rated movies, and deterministic ordering.

use chrono::NaiveDate;
use data_loader::{DataIndex, Movie, MovieId, MovieRepository, Rating, RatingRepository};
use recommender::{RecommendationEngine, SimilarityMode};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

const A: MovieId = 1;
const B: MovieId = 2;
const C: MovieId = 3;
const D: MovieId = 4;
const E: MovieId = 5;

fn create_catalog(index: &mut DataIndex) {
    for (id, title, genre) in [
        (A, "Arrival", "Sci-Fi|Drama"),
        (B, "Brazil", "Sci-Fi|Comedy"),
        (C, "Casablanca", "Romance|Drama"),
        (D, "Dune", "Sci-Fi|Adventure"),
        (E, "Election", "Comedy"),
    ] {
        index.insert_movie(Movie {
            id,
            title: title.to_string(),
            genre: genre.to_string(),
            release_date: NaiveDate::from_ymd_opt(1990 + id as i32, 6, 1).unwrap(),
            description: format!("{} description", title),
            poster_url: String::new(),
        });
    }
    index.build_secondary_indices();
}

fn create_test_setup(ratings: &[(&str, MovieId, u8)]) -> Arc<DataIndex> {
    let mut index = DataIndex::new();
    create_catalog(&mut index);
    for &(user, movie, score) in ratings {
        index.insert_rating(Rating::new(user, movie, score));
    }
    index.compute_movie_stats();
    Arc::new(index)
}

fn engine_over(index: Arc<DataIndex>) -> RecommendationEngine {
    RecommendationEngine::new(index.clone(), index)
}

fn ids(movies: &[Movie]) -> Vec<MovieId> {
    movies.iter().map(|m| m.id).collect()
}

/// u1 and u2 agree on A and B; u2 also liked C. u3 only rated D.
fn similar_users_ratings() -> Vec<(&'static str, MovieId, u8)> {
    vec![
        ("u1", A, 5),
        ("u1", B, 5),
        ("u2", A, 5),
        ("u2", B, 5),
        ("u2", C, 4),
        ("u3", D, 5),
    ]
}

/// A denser population where several users overlap
fn mixed_ratings() -> Vec<(&'static str, MovieId, u8)> {
    vec![
        ("ann", A, 5),
        ("ann", B, 1),
        ("ben", A, 4),
        ("ben", C, 5),
        ("ben", E, 2),
        ("cat", B, 5),
        ("cat", D, 4),
        ("dan", A, 5),
        ("dan", D, 3),
        ("dan", E, 5),
        ("eve", C, 2),
    ]
}

#[test]
fn test_no_ratings_returns_catalog_prefix() {
    let engine = engine_over(create_test_setup(&[]));
    assert_eq!(ids(&engine.recommend("user1", 3)), vec![A, B, C]);
    assert_eq!(ids(&engine.recommend("someone-else", 3)), vec![A, B, C]);
}

#[test]
fn test_unrated_user_gets_catalog_prefix() {
    let engine = engine_over(create_test_setup(&mixed_ratings()));
    assert_eq!(ids(&engine.recommend("newcomer", 4)), vec![A, B, C, D]);
}

#[test]
fn test_similar_user_ranks_first() {
    let engine = engine_over(create_test_setup(&similar_users_ratings()));
    assert_eq!(ids(&engine.recommend("u1", 2)), vec![C, D]);
}

#[test]
fn test_similar_user_ranks_first_masked() {
    let engine = engine_over(create_test_setup(&similar_users_ratings()))
        .with_similarity_mode(SimilarityMode::Masked);
    assert_eq!(ids(&engine.recommend("u1", 2)), vec![C, D]);
}

#[test]
fn test_length_never_exceeds_count() {
    let engine = engine_over(create_test_setup(&mixed_ratings()));
    for user in ["ann", "ben", "cat", "dan", "eve", "ghost"] {
        for count in 1..=7 {
            let result = engine.recommend(user, count);
            assert!(
                result.len() <= count,
                "{} got {} movies for count {}",
                user,
                result.len(),
                count
            );
        }
    }
}

#[test]
fn test_rated_movies_excluded() {
    let index = create_test_setup(&mixed_ratings());
    let engine = engine_over(index.clone());

    for user in ["ann", "ben", "cat", "dan", "eve"] {
        let rated: HashSet<MovieId> = index
            .list_ratings_for_user(user)
            .unwrap()
            .iter()
            .map(|r| r.movie_id)
            .collect();
        let result = engine.recommend(user, 5);

        assert!(
            result.iter().all(|m| !rated.contains(&m.id)),
            "{} was recommended a movie they rated",
            user
        );
        // Everything unrated fits in 5, so padding fills the rest of the catalog
        assert_eq!(result.len(), 5 - rated.len());
    }
}

#[test]
fn test_no_duplicates_in_result() {
    let engine = engine_over(create_test_setup(&mixed_ratings()));
    let result = ids(&engine.recommend("dan", 5));
    let unique: HashSet<MovieId> = result.iter().copied().collect();
    assert_eq!(unique.len(), result.len());
}

#[test]
fn test_repeated_calls_identical() {
    let engine = engine_over(create_test_setup(&mixed_ratings()));
    for user in ["ann", "ben", "eve"] {
        let first = engine.recommend(user, 3);
        let second = engine.recommend(user, 3);
        assert_eq!(first, second);
    }
}

#[test]
fn test_same_data_same_order_across_engines() {
    let left = engine_over(create_test_setup(&mixed_ratings()));
    let right = engine_over(create_test_setup(&mixed_ratings()));
    assert_eq!(left.recommend_ids("ben", 5), right.recommend_ids("ben", 5));
}

#[test]
fn test_ties_keep_catalog_order() {
    // t shares A with both neighbours; B and E get identical predictions
    let engine = engine_over(create_test_setup(&[
        ("t", A, 4),
        ("x", A, 4),
        ("x", E, 5),
        ("y", A, 4),
        ("y", B, 5),
    ]));
    assert_eq!(engine.recommend_ids("t", 2), vec![B, E]);
}

#[test]
fn test_empty_catalog_gives_empty_result() {
    let index = Arc::new(DataIndex::new());
    let engine = engine_over(index);
    assert!(engine.recommend("u1", 5).is_empty());
}

#[test]
fn test_dangling_rating_falls_back_to_catalog() {
    let mut ratings = similar_users_ratings();
    ratings.push(("u2", 404, 5));
    let engine = engine_over(create_test_setup(&ratings));

    // Unlike the personalized path, the failure fallback is the plain prefix
    assert_eq!(engine.recommend_ids("u1", 3), vec![A, B, C]);
}

#[test]
fn test_new_rating_changes_recommendations() {
    let mut index = DataIndex::new();
    create_catalog(&mut index);
    for (user, movie, score) in similar_users_ratings() {
        index.insert_rating(Rating::new(user, movie, score));
    }
    let store = Arc::new(RwLock::new(index));
    let engine = RecommendationEngine::new(
        store.clone() as Arc<dyn MovieRepository>,
        store.clone() as Arc<dyn RatingRepository>,
    );

    assert_eq!(engine.recommend_ids("u1", 2), vec![C, D]);

    // u1 watches C; the next call must not offer it again
    store
        .write()
        .unwrap()
        .upsert_rating(Rating::new("u1", C, 3))
        .unwrap();
    let after = engine.recommend_ids("u1", 2);
    assert!(!after.contains(&C));
    assert_eq!(after, vec![D, E]);
}

#[test]
fn test_concurrent_calls_agree() {
    let engine = Arc::new(engine_over(create_test_setup(&mixed_ratings())));
    let expected = engine.recommend_ids("ben", 3);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || engine.recommend_ids("ben", 3))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
