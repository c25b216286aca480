//! Parser for the catalog and ratings data files.
//!
//! Both files are UTF-8, one record per line, fields separated by `::`:
//! - movies.dat: id::title::genre::release_date::poster_url::description
//! - ratings.dat: user_id::movie_id::score::created_at[::review]
//!
//! `release_date` is `YYYY-MM-DD`; `created_at` is unix seconds. The last
//! field of each record may itself contain `::`.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use chrono::{DateTime, NaiveDate};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

const MOVIE_FIELDS: usize = 6;
const RATING_FIELDS: usize = 5;

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    Ok(content.lines().map(|s| s.to_string()).collect())
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Pull the next field or report which one is missing
fn next_field<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    file: &str,
    line: usize,
    field: &str,
) -> Result<&'a str> {
    parts.next().ok_or_else(|| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Missing {}", field),
    })
}

fn parse_number<T>(value: &str, file: &str, line: usize, field: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Invalid {}: {}", field, e),
    })
}

/// Parse the movies.dat file, preserving file order as catalog order
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    let file = file_label(path);
    let lines = read_lines(path)?;
    let mut movies = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let mut parts = line_trimmed.splitn(MOVIE_FIELDS, "::");
        let id = next_field(&mut parts, &file, line_no, "movieId")?;
        let title = next_field(&mut parts, &file, line_no, "title")?;
        let genre = next_field(&mut parts, &file, line_no, "genre")?;
        let release_date = next_field(&mut parts, &file, line_no, "release date")?;
        let poster_url = next_field(&mut parts, &file, line_no, "poster url")?;
        let description = next_field(&mut parts, &file, line_no, "description")?;

        movies.push(Movie {
            id: parse_number(id, &file, line_no, "movieId")?,
            title: title.trim().to_string(),
            genre: genre.trim().to_string(),
            release_date: parse_release_date(release_date).map_err(|reason| {
                DataLoadError::ParseError {
                    file: file.clone(),
                    line: line_no,
                    reason,
                }
            })?,
            description: description.trim().to_string(),
            poster_url: poster_url.trim().to_string(),
        });
    }

    Ok(movies)
}

/// Parse the ratings.dat file
///
/// Scores are parsed but not range-checked here; `DataIndex::validate`
/// reports out-of-range scores once the whole dataset is indexed.
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let file = file_label(path);
    let lines = read_lines(path)?;
    let mut ratings = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let mut parts = line_trimmed.splitn(RATING_FIELDS, "::");
        let user_id = next_field(&mut parts, &file, line_no, "userId")?.trim();
        let movie_id = next_field(&mut parts, &file, line_no, "movieId")?;
        let score = next_field(&mut parts, &file, line_no, "score")?;
        let created_at = next_field(&mut parts, &file, line_no, "timestamp")?;
        let review = parts
            .next()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        if user_id.is_empty() {
            return Err(DataLoadError::ParseError {
                file,
                line: line_no,
                reason: "Empty userId".to_string(),
            });
        }

        let seconds: i64 = parse_number(created_at, &file, line_no, "timestamp")?;
        let created_at =
            DateTime::from_timestamp(seconds, 0).ok_or_else(|| DataLoadError::ParseError {
                file: file.clone(),
                line: line_no,
                reason: format!("Timestamp out of range: {}", seconds),
            })?;

        ratings.push(Rating {
            user_id: user_id.to_string(),
            movie_id: parse_number(movie_id, &file, line_no, "movieId")?,
            score: parse_number(score, &file, line_no, "score")?,
            review,
            created_at,
        });
    }

    Ok(ratings)
}

/// Parse a `YYYY-MM-DD` release date
fn parse_release_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid release date '{}': {}", s.trim(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_scratch(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("parser-{}-{}", std::process::id(), name));
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_parse_release_date() {
        assert_eq!(
            parse_release_date("1999-03-31"),
            Ok(NaiveDate::from_ymd_opt(1999, 3, 31).unwrap())
        );
        assert!(parse_release_date("03/31/1999").is_err());
    }

    #[test]
    fn test_parse_movies() {
        let path = write_scratch(
            "movies.dat",
            "1::The Matrix::Action|Sci-Fi::1999-03-31::http://p/1.jpg::Neo wakes up.\n\
             \n\
             2::Memento::Mystery::2000-10-11::::Told backwards:: mostly\n",
        );

        let movies = parse_movies(&path).unwrap();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].title, "The Matrix");
        assert_eq!(movies[0].genres().collect::<Vec<_>>(), vec!["Action", "Sci-Fi"]);
        assert_eq!(movies[1].poster_url, "");
        assert_eq!(movies[1].description, "Told backwards:: mostly");

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_parse_movies_reports_line() {
        let path = write_scratch("bad-movies.dat", "1::Ok::Drama::2001-01-01::::x\nzz::Bad\n");

        match parse_movies(&path) {
            Err(DataLoadError::ParseError { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_parse_ratings() {
        let path = write_scratch(
            "ratings.dat",
            "user_2a::1::5::978300760\nuser_2b::1::3::978300761::Too long\n",
        );

        let ratings = parse_ratings(&path).unwrap();
        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[0].user_id, "user_2a");
        assert_eq!(ratings[0].review, None);
        assert_eq!(ratings[1].score, 3);
        assert_eq!(ratings[1].review.as_deref(), Some("Too long"));
        assert_eq!(ratings[1].created_at.timestamp(), 978300761);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_parse_ratings_rejects_bad_score() {
        let path = write_scratch("bad-ratings.dat", "u::1::five::978300760\n");
        assert!(matches!(
            parse_ratings(&path),
            Err(DataLoadError::ParseError { line: 1, .. })
        ));
        fs::remove_file(&path).ok();
    }
}
