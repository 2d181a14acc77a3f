//! Widget-driven filtering for the standard dashboard mode

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::movie::Movie;

/// Sort options offered by the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Rating, high to low
    #[default]
    RatingDesc,
    /// Votes, high to low
    VotesDesc,
    /// Duration, long to short
    DurationDesc,
    /// Duration, short to long
    DurationAsc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rating_desc" | "rating" => Ok(SortOrder::RatingDesc),
            "votes_desc" | "votes" => Ok(SortOrder::VotesDesc),
            "duration_desc" => Ok(SortOrder::DurationDesc),
            "duration_asc" | "duration" => Ok(SortOrder::DurationAsc),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

/// Filter and sort settings for browsing the full table.
///
/// Unset bounds mean "whole range of the data". The rating range defaults to
/// the full 0 to 10 scale. All bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseFilter {
    /// `None` or `"All"` keeps every genre
    pub genre: Option<String>,
    pub min_rating: f64,
    pub max_rating: f64,
    pub min_votes: Option<i64>,
    pub max_votes: Option<i64>,
    pub min_duration: Option<u32>,
    pub max_duration: Option<u32>,
    pub sort: SortOrder,
    /// Case-insensitive title substring, applied after the other filters
    pub search: Option<String>,
}

impl Default for BrowseFilter {
    fn default() -> Self {
        Self {
            genre: None,
            min_rating: 0.0,
            max_rating: 10.0,
            min_votes: None,
            max_votes: None,
            min_duration: None,
            max_duration: None,
            sort: SortOrder::default(),
            search: None,
        }
    }
}

impl BrowseFilter {
    /// Filter and sort `movies`.
    ///
    /// Movies whose duration cannot be normalized are dropped first, since
    /// every browse view works on minutes.
    pub fn apply(&self, movies: &[Movie]) -> Vec<Movie> {
        let genre = self
            .genre
            .as_deref()
            .filter(|g| !g.eq_ignore_ascii_case("all"));
        let search = self.search.as_deref().map(str::to_lowercase);

        let mut selected: Vec<(Movie, u32)> = movies
            .iter()
            .filter_map(|m| m.duration_minutes().map(|minutes| (m, minutes)))
            .filter(|(m, _)| genre.map_or(true, |g| m.genre == g))
            .filter(|(m, _)| m.rating >= self.min_rating && m.rating <= self.max_rating)
            .filter(|(m, _)| self.min_votes.map_or(true, |min| m.votes >= min))
            .filter(|(m, _)| self.max_votes.map_or(true, |max| m.votes <= max))
            .filter(|(_, minutes)| self.min_duration.map_or(true, |min| *minutes >= min))
            .filter(|(_, minutes)| self.max_duration.map_or(true, |max| *minutes <= max))
            .filter(|(m, _)| {
                search
                    .as_deref()
                    .map_or(true, |term| m.title.to_lowercase().contains(term))
            })
            .map(|(m, minutes)| (m.clone(), minutes))
            .collect();

        selected.sort_by(|(a, a_min), (b, b_min)| self.compare(a, *a_min, b, *b_min));
        selected.into_iter().map(|(m, _)| m).collect()
    }

    fn compare(&self, a: &Movie, a_min: u32, b: &Movie, b_min: u32) -> Ordering {
        match self.sort {
            SortOrder::RatingDesc => b.rating.total_cmp(&a.rating),
            SortOrder::VotesDesc => b.votes.cmp(&a.votes),
            SortOrder::DurationDesc => b_min.cmp(&a_min),
            SortOrder::DurationAsc => a_min.cmp(&b_min),
        }
    }
}

/// Distinct genres in sorted order, for the genre selector
pub fn genres(movies: &[Movie]) -> Vec<String> {
    movies
        .iter()
        .map(|m| m.genre.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movie::sample_movies;

    fn titles(movies: &[Movie]) -> Vec<&str> {
        movies.iter().map(|m| m.title.as_str()).collect()
    }

    #[test]
    fn test_default_filter_keeps_everything() {
        let movies = sample_movies();
        let result = BrowseFilter::default().apply(&movies);
        assert_eq!(result.len(), movies.len());
        // Rating, high to low
        assert!(result.windows(2).all(|w| w[0].rating >= w[1].rating));
    }

    #[test]
    fn test_genre_filter() {
        let filter = BrowseFilter {
            genre: Some("crime".to_string()),
            ..Default::default()
        };
        let result = filter.apply(&sample_movies());
        assert_eq!(titles(&result), vec!["The Godfather", "Pulp Fiction"]);

        let all = BrowseFilter {
            genre: Some("All".to_string()),
            ..Default::default()
        };
        assert_eq!(all.apply(&sample_movies()).len(), 20);
    }

    #[test]
    fn test_ranges_are_inclusive() {
        let filter = BrowseFilter {
            min_rating: 9.0,
            max_rating: 9.2,
            ..Default::default()
        };
        let result = filter.apply(&sample_movies());
        assert_eq!(
            titles(&result),
            vec!["The Godfather", "Eternal Sunshine", "The Dark Knight"]
        );

        let filter = BrowseFilter {
            min_duration: Some(97),
            max_duration: Some(108),
            sort: SortOrder::DurationAsc,
            ..Default::default()
        };
        let result = filter.apply(&sample_movies());
        assert_eq!(
            titles(&result),
            vec!["The Silent Echo", "Forgotten Dreams", "Midnight Express"]
        );
    }

    #[test]
    fn test_votes_sort_and_bounds() {
        let filter = BrowseFilter {
            min_votes: Some(4500),
            sort: SortOrder::VotesDesc,
            ..Default::default()
        };
        let result = filter.apply(&sample_movies());
        assert_eq!(
            titles(&result),
            vec![
                "The Dark Knight",
                "The Godfather",
                "Pulp Fiction",
                "The Shawshank Redemption"
            ]
        );
    }

    #[test]
    fn test_unparsable_durations_are_dropped() {
        let mut movies = sample_movies();
        movies.push(Movie::new("Lost Reel", "drama", 9.9, 10, "unknown"));
        let result = BrowseFilter::default().apply(&movies);
        assert_eq!(result.len(), 20);
        assert!(result.iter().all(|m| m.title != "Lost Reel"));
    }

    #[test]
    fn test_title_search() {
        let filter = BrowseFilter {
            search: Some("THE".to_string()),
            sort: SortOrder::DurationDesc,
            ..Default::default()
        };
        let result = filter.apply(&sample_movies());
        assert_eq!(result.first().map(|m| m.title.as_str()), Some("The Godfather"));
        assert!(result.iter().all(|m| m.title.to_lowercase().contains("the")));
    }

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!("votes_desc".parse::<SortOrder>(), Ok(SortOrder::VotesDesc));
        assert_eq!("Duration_Asc".parse::<SortOrder>(), Ok(SortOrder::DurationAsc));
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_filter_deserializes_with_defaults() {
        let filter: BrowseFilter =
            serde_json::from_str(r#"{"genre": "drama", "sort": "duration_asc"}"#).unwrap();
        assert_eq!(filter.genre.as_deref(), Some("drama"));
        assert_eq!(filter.sort, SortOrder::DurationAsc);
        assert_eq!(filter.max_rating, 10.0);
    }

    #[test]
    fn test_genres() {
        let genres = genres(&sample_movies());
        assert_eq!(genres.first().map(String::as_str), Some("action"));
        assert_eq!(genres.len(), 9);
    }
}
