mod config;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use data_loader::{DataIndex, Movie, MovieId, UserId};
use recommender::{Outcome, RecommendationEngine, SimilarityMode};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info};

use config::Settings;

/// ReelRecs - Movie Recommendation Engine
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(about = "Movie recommendations from similar users' ratings", long_about = None)]
struct Cli {
    /// Directory holding movies.dat and ratings.dat (overrides RECS_DATA_DIR)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Similarity measure (overrides RECS_SIMILARITY_MODE)
    #[arg(long, value_enum)]
    similarity: Option<SimilarityArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SimilarityArg {
    ZeroFilled,
    Masked,
}

impl From<SimilarityArg> for SimilarityMode {
    fn from(arg: SimilarityArg) -> Self {
        match arg {
            SimilarityArg::ZeroFilled => SimilarityMode::ZeroFilled,
            SimilarityArg::Masked => SimilarityMode::Masked,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Get movie recommendations for a user
    Recommend {
        /// User ID to get recommendations for
        #[arg(long)]
        user_id: UserId,

        /// Number of recommendations to return (defaults to RECS_DEFAULT_COUNT)
        #[arg(long)]
        limit: Option<usize>,

        /// Show predicted ratings and whether the fallback was used
        #[arg(long)]
        explain: bool,

        /// Print the recommendations as JSON
        #[arg(long, conflicts_with = "explain")]
        json: bool,
    },

    /// Show a user's rating history
    User {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,
    },

    /// Search for movies by title or genre
    Search {
        /// Text to look for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Show a movie's statistics and every rating it received
    Movie {
        /// Movie ID to display
        #[arg(long)]
        movie_id: MovieId,
    },

    /// Show a user's watchlist, applying any changes first
    Watchlist {
        /// User ID owning the watchlist
        #[arg(long)]
        user_id: UserId,

        /// Movie IDs to add
        #[arg(long, value_delimiter = ',')]
        add: Vec<MovieId>,

        /// Movie IDs to remove
        #[arg(long, value_delimiter = ',')]
        remove: Vec<MovieId>,
    },

    /// List genres, or the movies in one genre
    Genres {
        /// Genre to list movies for
        #[arg(long)]
        genre: Option<String>,
    },

    /// Run concurrent recommendation requests and report latency
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::from_env()?;
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }
    if let Some(mode) = cli.similarity {
        settings.similarity_mode = mode.into();
    }
    debug!(?settings, "Resolved settings");

    println!("Loading dataset from {}...", settings.data_dir.display());
    let start = Instant::now();
    let mut data_index =
        DataIndex::load_from_files(&settings.data_dir).context("Failed to load dataset")?;
    println!("{} Loaded dataset in {:?}", "✓".green(), start.elapsed());

    if let Commands::Watchlist {
        user_id,
        add,
        remove,
    } = &cli.command
    {
        apply_watchlist_changes(&mut data_index, user_id, add, remove)?;
    }
    let data_index = Arc::new(data_index);

    let engine = RecommendationEngine::new(data_index.clone(), data_index.clone())
        .with_config(settings.engine_config())
        .context("Invalid engine configuration")?;

    match cli.command {
        Commands::Recommend {
            user_id,
            limit,
            explain,
            json,
        } => {
            let limit = limit.unwrap_or(settings.default_count);
            handle_recommend(&engine, &user_id, limit, explain, json)?
        }
        Commands::User { user_id } => handle_user(&data_index, &user_id)?,
        Commands::Search { title } => handle_search(&data_index, &title),
        Commands::Movie { movie_id } => handle_movie(&data_index, movie_id)?,
        Commands::Watchlist { user_id, .. } => handle_watchlist(&data_index, &user_id),
        Commands::Genres { genre } => handle_genres(&data_index, genre.as_deref()),
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(engine, &data_index, requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    engine: &RecommendationEngine,
    user_id: &str,
    limit: usize,
    explain: bool,
    json: bool,
) -> Result<()> {
    if limit == 0 {
        return Err(anyhow!("--limit must be positive"));
    }

    let recommendations = engine.recommend(user_id, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
        return Ok(());
    }

    let predicted: HashMap<MovieId, f64> = if explain {
        explain_outcome(&engine.compute(user_id, limit))
    } else {
        HashMap::new()
    };
    print_recommendations(&recommendations, &predicted);
    Ok(())
}

/// Print how the list was produced and return predicted ratings by movie
fn explain_outcome(outcome: &Outcome) -> HashMap<MovieId, f64> {
    match outcome {
        Outcome::Personalized { predictions, rated } => {
            println!(
                "{} {} personalized picks from similar users ({} movies already rated)",
                "•".cyan(),
                predictions.len(),
                rated.len()
            );
            predictions
                .iter()
                .map(|p| (p.movie_id, p.predicted_rating))
                .collect()
        }
        Outcome::Empty => {
            println!("{} No rating history, showing catalog picks", "•".cyan());
            HashMap::new()
        }
        Outcome::Fallback(e) => {
            println!("{} Personalization failed ({}), showing catalog picks", "•".yellow(), e);
            HashMap::new()
        }
    }
}

/// Handle the 'user' command
fn handle_user(data_index: &DataIndex, user_id: &str) -> Result<()> {
    let ratings = data_index.get_user_ratings(user_id);
    if ratings.is_empty() {
        return Err(anyhow!("User {} has no ratings", user_id));
    }

    println!("{}", format!("User ID: {}", user_id).bold().blue());

    let total: u32 = ratings.iter().map(|r| r.score as u32).sum();
    println!("{}Number of ratings: {}", "• ".cyan(), ratings.len());
    println!(
        "{}Average rating: {:.2}",
        "• ".cyan(),
        total as f32 / ratings.len() as f32
    );

    let mut top_rated = ratings.clone();
    top_rated.sort_by(|a, b| b.score.cmp(&a.score));
    println!("Top rated movies:");
    for rating in top_rated.iter().take(5) {
        if let Some(movie) = data_index.get_movie(rating.movie_id) {
            match &rating.review {
                Some(review) => println!("  - {} ({}/5): \"{}\"", movie.title, rating.score, review),
                None => println!("  - {} ({}/5)", movie.title, rating.score),
            }
        }
    }

    let mut genre_ratings: HashMap<&str, (u32, u32)> = HashMap::new();
    for rating in &ratings {
        if let Some(movie) = data_index.get_movie(rating.movie_id) {
            for genre in movie.genres() {
                let entry = genre_ratings.entry(genre).or_insert((0, 0));
                entry.0 += rating.score as u32;
                entry.1 += 1;
            }
        }
    }
    let mut genre_ratings: Vec<_> = genre_ratings.into_iter().collect();
    genre_ratings.sort_by(|a, b| a.0.cmp(b.0));
    println!("Genre preferences:");
    for (genre, (total, count)) in genre_ratings {
        println!(
            "  - {}: Average Rating: {:.2} ({} ratings)",
            genre,
            total as f32 / count as f32,
            count
        );
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(data_index: &DataIndex, title: &str) {
    let matches = data_index.search_movies(title);
    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  (no matches)");
        return;
    }
    for movie in matches.iter().take(20) {
        let (avg_rating, rating_count) = data_index
            .get_movie_stats(movie.id)
            .map(|s| (s.avg_rating, s.rating_count))
            .unwrap_or((0.0, 0));
        println!(
            "{}: {} ({}) [{}] avg {:.2} ({} ratings)",
            movie.id,
            movie.title,
            movie.release_date.format("%Y"),
            movie.genre,
            avg_rating,
            rating_count
        );
    }
}

/// Handle the 'movie' command
fn handle_movie(data_index: &DataIndex, movie_id: MovieId) -> Result<()> {
    let movie = data_index
        .get_movie(movie_id)
        .ok_or_else(|| anyhow!("Movie {} is not in the catalog", movie_id))?;

    println!(
        "{}",
        format!("{} ({})", movie.title, movie.release_date.format("%Y"))
            .bold()
            .blue()
    );
    println!("{}Genre: {}", "• ".cyan(), movie.genre);
    if !movie.description.is_empty() {
        println!("{}{}", "• ".cyan(), movie.description);
    }

    let ratings = data_index.get_movie_ratings(movie_id);
    match data_index.get_movie_stats(movie_id) {
        Some(stats) => println!(
            "{}Average rating: {:.2} ({} ratings)",
            "• ".cyan(),
            stats.avg_rating,
            stats.rating_count
        ),
        None => println!("{}No ratings yet", "• ".cyan()),
    }

    for rating in ratings {
        let when = rating.created_at.format("%Y-%m-%d");
        match &rating.review {
            Some(review) => println!(
                "  - {} ({}/5, {}): \"{}\"",
                rating.user_id, rating.score, when, review
            ),
            None => println!("  - {} ({}/5, {})", rating.user_id, rating.score, when),
        }
    }
    Ok(())
}

/// Add and remove watchlist entries before the store is shared
fn apply_watchlist_changes(
    data_index: &mut DataIndex,
    user_id: &str,
    add: &[MovieId],
    remove: &[MovieId],
) -> Result<()> {
    for &movie_id in add {
        if !data_index
            .add_to_watchlist(user_id, movie_id)
            .with_context(|| format!("Cannot add movie {} to the watchlist", movie_id))?
        {
            debug!("Movie {} already on the watchlist of {}", movie_id, user_id);
        }
    }
    for &movie_id in remove {
        if !data_index
            .remove_from_watchlist(user_id, movie_id)
            .with_context(|| format!("Cannot remove movie {} from the watchlist", movie_id))?
        {
            debug!("Movie {} was not on the watchlist of {}", movie_id, user_id);
        }
    }
    Ok(())
}

/// Handle the 'watchlist' command
fn handle_watchlist(data_index: &DataIndex, user_id: &str) {
    println!("{}", format!("Watchlist for {}:", user_id).bold().blue());
    let movies = data_index.watchlist(user_id);
    if movies.is_empty() {
        println!("  (empty)");
        return;
    }
    for movie in movies {
        println!("  {}: {} ({})", movie.id, movie.title, movie.release_date.format("%Y"));
    }
}

/// Handle the 'genres' command
fn handle_genres(data_index: &DataIndex, genre: Option<&str>) {
    match genre {
        None => {
            println!("{}", "Genres:".bold().blue());
            for name in data_index.genres() {
                println!("  - {}", name);
            }
        }
        Some(genre) => {
            println!("{}", format!("Movies in '{}':", genre).bold().blue());
            for movie in data_index.get_movies_by_genre(genre) {
                println!("  {}: {} ({})", movie.id, movie.title, movie.release_date.format("%Y"));
            }
        }
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    engine: RecommendationEngine,
    data_index: &DataIndex,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 {
        return Err(anyhow!("--requests must be positive"));
    }

    // Sample from users with ratings; if there are none every call hits the fallback
    let known: Vec<UserId> = data_index
        .ratings()
        .iter()
        .map(|r| r.user_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let user_ids: Vec<UserId> = (0..requests)
        .map(|i| {
            if known.is_empty() {
                format!("anonymous-{}", i)
            } else {
                known[rand::random_range(0..known.len())].clone()
            }
        })
        .collect();

    let engine = Arc::new(engine);
    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    info!("Running {} requests, {} at a time", requests, concurrent.max(1));

    let wall_clock = Instant::now();
    let mut handles = Vec::with_capacity(requests);
    for user_id in user_ids {
        let engine = Arc::clone(&engine);
        let permits = Arc::clone(&permits);
        handles.push(tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let timing = tokio::task::spawn_blocking(move || {
                let start = Instant::now();
                engine.recommend_default(&user_id);
                start.elapsed()
            })
            .await?;
            Ok::<_, anyhow::Error>(timing)
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall_clock.elapsed();

    timings.sort();
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Format and print recommendations
fn print_recommendations(recommendations: &[Movie], predicted: &HashMap<MovieId, f64>) {
    println!("{}", "Movie Recommendations:".bold().blue());
    if recommendations.is_empty() {
        println!("  (nothing to recommend)");
        return;
    }
    for (rank, movie) in recommendations.iter().enumerate() {
        println!(
            "{}. {} ({}) [{}]",
            (rank + 1).to_string().green(),
            movie.title,
            movie.release_date.format("%Y"),
            movie.genre
        );
        if let Some(score) = predicted.get(&movie.id) {
            println!("   Predicted rating: {:.2}", score);
        }
    }
}
