//! # Data Loader Crate
//!
//! Storage layer for the movie catalog, user ratings and watchlists.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, Rating, UserIdentity, DataIndex)
//! - **parser**: Parse `::`-delimited .dat files into Rust structs
//! - **index**: Build the in-memory store, its indices and statistics
//! - **store**: Rating upserts, catalog queries and watchlists
//! - **repository**: Read-only traits the recommender consumes
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{DataIndex, MovieRepository};
//! use std::path::Path;
//!
//! let index = DataIndex::load_from_files(Path::new("data/catalog"))?;
//!
//! let movie = index.get_movie(1).unwrap();
//! let ratings = index.get_user_ratings("user_2abc");
//! let catalog = index.list_all_movies()?;
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod store;
pub mod repository;

pub use error::{DataLoadError, Result};
pub use repository::{MovieRepository, RatingRepository};
pub use types::{
    // Type aliases
    UserId,
    MovieId,
    // Core types
    Movie,
    Rating,
    UserIdentity,
    WatchlistEntry,
    DataIndex,
    MovieStats,
    // Score bounds
    MIN_SCORE,
    MAX_SCORE,
};
