//! Movie records and the bundled sample dataset

use serde::{Deserialize, Serialize};

use crate::duration::parse_duration_minutes;

/// One row of the `movies` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
    /// Single lowercase token, e.g. `action` or `sci-fi`
    pub genre: String,
    /// 0 to 10
    pub rating: f64,
    pub votes: i64,
    /// Free-form text such as `2h 15m`
    pub duration: String,
}

impl Movie {
    pub fn new(
        title: impl Into<String>,
        genre: impl Into<String>,
        rating: f64,
        votes: i64,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            genre: genre.into(),
            rating,
            votes,
            duration: duration.into(),
        }
    }

    /// Duration in minutes, `None` if the duration text is unparsable
    pub fn duration_minutes(&self) -> Option<u32> {
        parse_duration_minutes(&self.duration)
    }
}

const SAMPLE: &[(&str, &str, f64, i64, &str)] = &[
    ("The Last Adventure", "action", 8.2, 2450, "2h 15m"),
    ("Eternal Sunshine", "romance", 9.1, 3200, "1h 52m"),
    ("Midnight Express", "thriller", 7.8, 1890, "1h 48m"),
    ("Golden Hour", "drama", 8.5, 2100, "2h 05m"),
    ("The Silent Echo", "horror", 6.9, 980, "1h 37m"),
    ("Parallel Lives", "sci-fi", 7.5, 1500, "2h 22m"),
    ("Forgotten Dreams", "comedy", 8.0, 2300, "1h 45m"),
    ("The Lost City", "adventure", 7.2, 1750, "2h 10m"),
    ("Beyond the Stars", "sci-fi", 9.3, 2800, "2h 30m"),
    ("Winter's Tale", "drama", 6.8, 1200, "1h 58m"),
    ("The Dark Knight", "action", 9.0, 5000, "2h 32m"),
    ("Pulp Fiction", "crime", 8.9, 4800, "2h 34m"),
    ("The Godfather", "crime", 9.2, 4900, "2h 55m"),
    ("Inception", "sci-fi", 8.8, 3800, "2h 28m"),
    ("The Matrix", "sci-fi", 8.7, 4200, "2h 16m"),
    ("Interstellar", "sci-fi", 8.6, 3900, "2h 49m"),
    ("Fight Club", "drama", 8.8, 3600, "2h 19m"),
    ("Forrest Gump", "drama", 8.8, 3700, "2h 22m"),
    ("The Shawshank Redemption", "drama", 9.3, 4500, "2h 22m"),
    ("Star Wars", "sci-fi", 8.6, 4100, "2h 1m"),
];

/// The 20-movie dataset a fresh database is seeded with
pub fn sample_movies() -> Vec<Movie> {
    SAMPLE
        .iter()
        .map(|&(title, genre, rating, votes, duration)| {
            Movie::new(title, genre, rating, votes, duration)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_dataset() {
        let movies = sample_movies();
        assert_eq!(movies.len(), 20);
        assert!(movies.iter().all(|m| m.duration_minutes().is_some()));
        assert!(movies.iter().all(|m| m.genre == m.genre.to_lowercase()));
    }

    #[test]
    fn test_duration_minutes() {
        let movie = Movie::new("Inception", "sci-fi", 8.8, 3800, "2h 28m");
        assert_eq!(movie.duration_minutes(), Some(148));

        let broken = Movie::new("Broken", "drama", 5.0, 10, "unknown");
        assert_eq!(broken.duration_minutes(), None);
    }

    #[test]
    fn test_serialize() {
        let movie = Movie::new("Star Wars", "sci-fi", 8.6, 4100, "2h 1m");
        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(json["title"], "Star Wars");
        assert_eq!(json["votes"], 4100);
    }
}
