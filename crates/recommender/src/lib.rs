//! # Recommender Crate
//!
//! User-based collaborative filtering with a popularity fallback.
//!
//! ## Components
//!
//! ### Similarity-weighted prediction
//! - **matrix**: dense user × movie rating matrix, 0 for unrated
//! - **similarity**: cosine similarity between users (zero-filled or masked)
//! - **neighbors**: predicted rating = similarity-weighted average of
//!   positively similar users' scores, ranked with a stable sort
//!
//! ### Popularity fallback
//! - **popularity**: first movies of the catalog, also used to pad short lists
//!
//! ### Engine
//! - **engine**: reads the repositories, runs the pass, shapes the result.
//!   Failures become `Outcome::Fallback` and never reach the caller.
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataIndex;
//! use recommender::RecommendationEngine;
//! use std::sync::Arc;
//!
//! let index = Arc::new(DataIndex::load_from_files("data/catalog".as_ref())?);
//! let engine = RecommendationEngine::new(index.clone(), index);
//!
//! for movie in engine.recommend("user_2abc", 5) {
//!     println!("{}", movie.title);
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod matrix;
pub mod neighbors;
pub mod outcome;
pub mod popularity;
pub mod similarity;

pub use config::{DEFAULT_COUNT, EngineConfig, SimilarityMode};
pub use engine::RecommendationEngine;
pub use error::RecommendError;
pub use matrix::UserMovieMatrix;
pub use outcome::{Outcome, Prediction};
pub use similarity::SimilarityMatrix;
