//! Ordered catalog of lexical query patterns
//!
//! Each rule pairs a regex over the lowercased sentence with a producer for
//! the SQL it stands for. Order is part of the contract: a sentence that
//! satisfies several rules gets the query of the earliest one.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid pattern for {intent}: {source}")]
    InvalidPattern {
        intent: Intent,
        #[source]
        source: regex::Error,
    },
}

/// What a sentence is asking for. One variant per catalog rule, plus the
/// fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    DurationAscending,
    DurationDescending,
    HighestRating,
    LowestRating,
    RatingAbove,
    RatingBetween,
    MostPopular,
    LeastPopular,
    VotesAbove,
    GenreList,
    GenreRatingAbove,
    TitleContains,
    TopByRating,
    TopByVotes,
    TopInGenre,
    AverageRatingByGenre,
    AverageDurationByGenre,
    CountInGenre,
    CountByGenre,
    AboveAverageRating,
    BelowAverageRating,
    BestInGenre,
    WorstInGenre,
    ShorterThan,
    LongerThan,
    /// Nothing matched; select everything
    Default,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::DurationAscending => "duration_ascending",
            Intent::DurationDescending => "duration_descending",
            Intent::HighestRating => "highest_rating",
            Intent::LowestRating => "lowest_rating",
            Intent::RatingAbove => "rating_above",
            Intent::RatingBetween => "rating_between",
            Intent::MostPopular => "most_popular",
            Intent::LeastPopular => "least_popular",
            Intent::VotesAbove => "votes_above",
            Intent::GenreList => "genre_list",
            Intent::GenreRatingAbove => "genre_rating_above",
            Intent::TitleContains => "title_contains",
            Intent::TopByRating => "top_by_rating",
            Intent::TopByVotes => "top_by_votes",
            Intent::TopInGenre => "top_in_genre",
            Intent::AverageRatingByGenre => "average_rating_by_genre",
            Intent::AverageDurationByGenre => "average_duration_by_genre",
            Intent::CountInGenre => "count_in_genre",
            Intent::CountByGenre => "count_by_genre",
            Intent::AboveAverageRating => "above_average_rating",
            Intent::BelowAverageRating => "below_average_rating",
            Intent::BestInGenre => "best_in_genre",
            Intent::WorstInGenre => "worst_in_genre",
            Intent::ShorterThan => "shorter_than",
            Intent::LongerThan => "longer_than",
            Intent::Default => "default",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a rule turns a match into SQL
#[derive(Clone, Copy)]
pub enum Producer {
    /// Fixed query text, returned verbatim
    Literal(&'static str),
    /// Query built from the capture groups of the match
    Derived(fn(&Captures<'_>) -> String),
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Producer::Literal(sql) => f.debug_tuple("Literal").field(sql).finish(),
            Producer::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// A single (matcher, producer) pair
#[derive(Debug, Clone)]
pub struct Rule {
    intent: Intent,
    matcher: Regex,
    producer: Producer,
}

impl Rule {
    pub fn new(intent: Intent, pattern: &str, producer: Producer) -> Result<Self, CatalogError> {
        let matcher = Regex::new(pattern)
            .map_err(|source| CatalogError::InvalidPattern { intent, source })?;
        Ok(Self {
            intent,
            matcher,
            producer,
        })
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn pattern(&self) -> &str {
        self.matcher.as_str()
    }

    /// Search `text` anywhere and build the query on a hit
    pub fn apply(&self, text: &str) -> Option<String> {
        let caps = self.matcher.captures(text)?;
        Some(match self.producer {
            Producer::Literal(sql) => sql.to_string(),
            Producer::Derived(build) => build(&caps),
        })
    }
}

/// Rules in priority order, highest first
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    rules: Vec<Rule>,
}

impl PatternCatalog {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The movie dashboard catalog, compiled once per process
    pub fn builtin() -> &'static PatternCatalog {
        &BUILTIN
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule, in priority order, whose matcher hits `text`
    pub fn first_match(&self, text: &str) -> Option<(Intent, String)> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(text).map(|sql| (rule.intent, sql)))
    }
}

/// Captured text of a group the pattern always sets
fn group<'t>(caps: &Captures<'t>, idx: usize) -> &'t str {
    caps.get(idx).map_or("", |m| m.as_str())
}

/// Captured numeric literal, passed through exactly as written.
///
/// The patterns only capture `[0-9]` runs (optionally with one dot), so a
/// capture that does not parse means the pattern itself is wrong.
fn number<'t>(caps: &Captures<'t>, idx: usize) -> &'t str {
    let text = group(caps, idx);
    assert!(
        text.parse::<f64>().is_ok(),
        "pattern captured non-numeric text {:?} in group {}",
        text,
        idx
    );
    text
}

static BUILTIN: LazyLock<PatternCatalog> = LazyLock::new(|| {
    use Producer::{Derived, Literal};

    let entries: [(Intent, &str, Producer); 25] = [
        // Duration
        (
            Intent::DurationAscending,
            r"duration.*(asc|ascending|shortest|short)",
            Literal("SELECT * FROM movies ORDER BY Duration_Minutes ASC"),
        ),
        (
            Intent::DurationDescending,
            r"duration.*(desc|descending|longest|long)",
            Literal("SELECT * FROM movies ORDER BY Duration_Minutes DESC"),
        ),
        // Rating
        (
            Intent::HighestRating,
            r"highest.*(rating|rated)",
            Literal("SELECT * FROM movies ORDER BY Rating DESC"),
        ),
        (
            Intent::LowestRating,
            r"lowest.*(rating|rated)",
            Literal("SELECT * FROM movies ORDER BY Rating ASC"),
        ),
        (
            Intent::RatingAbove,
            r"rating.*above ([0-9]+\.?[0-9]*)",
            Derived(|c| format!("SELECT * FROM movies WHERE Rating > {}", number(c, 1))),
        ),
        (
            Intent::RatingBetween,
            r"rating.*between ([0-9]+\.?[0-9]*) and ([0-9]+\.?[0-9]*)",
            Derived(|c| {
                format!(
                    "SELECT * FROM movies WHERE Rating BETWEEN {} AND {}",
                    number(c, 1),
                    number(c, 2)
                )
            }),
        ),
        // Votes
        (
            Intent::MostPopular,
            r"(most popular|highest vote|most votes)",
            Literal("SELECT * FROM movies ORDER BY Votes DESC"),
        ),
        (
            Intent::LeastPopular,
            r"(least popular|lowest vote|fewest votes)",
            Literal("SELECT * FROM movies ORDER BY Votes ASC"),
        ),
        (
            Intent::VotesAbove,
            r"votes?.*above ([0-9]+)",
            Derived(|c| format!("SELECT * FROM movies WHERE Votes > {}", number(c, 1))),
        ),
        // Genre
        (
            Intent::GenreList,
            r"(all|show|list) (\w+) movies",
            Derived(|c| format!("SELECT * FROM movies WHERE genre = '{}'", group(c, 2))),
        ),
        (
            Intent::GenreRatingAbove,
            r"(\w+) movies.*(rating|rated).*above ([0-9]+\.?[0-9]*)",
            Derived(|c| {
                format!(
                    "SELECT * FROM movies WHERE genre = '{}' AND Rating > {}",
                    group(c, 1),
                    number(c, 3)
                )
            }),
        ),
        // Title
        (
            Intent::TitleContains,
            r"title.*(contain|including|with) (.+)",
            Derived(|c| format!("SELECT * FROM movies WHERE Title ILIKE '%{}%'", group(c, 2))),
        ),
        // Top N
        (
            Intent::TopByRating,
            r"top ([0-9]+).*rating",
            Derived(|c| {
                format!("SELECT * FROM movies ORDER BY Rating DESC LIMIT {}", number(c, 1))
            }),
        ),
        (
            Intent::TopByVotes,
            r"top ([0-9]+).*votes",
            Derived(|c| {
                format!("SELECT * FROM movies ORDER BY Votes DESC LIMIT {}", number(c, 1))
            }),
        ),
        (
            Intent::TopInGenre,
            r"top ([0-9]+) (\w+) movies",
            Derived(|c| {
                format!(
                    "SELECT * FROM movies WHERE genre = '{}' ORDER BY Rating DESC LIMIT {}",
                    group(c, 2),
                    number(c, 1)
                )
            }),
        ),
        // Averages
        (
            Intent::AverageRatingByGenre,
            r"average.*rating.*genre",
            Literal("SELECT genre, AVG(Rating) as avg_rating FROM movies GROUP BY genre ORDER BY avg_rating DESC"),
        ),
        (
            Intent::AverageDurationByGenre,
            r"average.*duration.*genre",
            Literal("SELECT genre, AVG(Duration_Minutes) as avg_duration FROM movies GROUP BY genre ORDER BY avg_duration DESC"),
        ),
        // Counts
        (
            Intent::CountInGenre,
            r"(count|number of|how many).*\b(\w+) movies",
            Derived(|c| {
                format!(
                    "SELECT COUNT(*) as movie_count FROM movies WHERE genre = '{}'",
                    group(c, 2)
                )
            }),
        ),
        (
            Intent::CountByGenre,
            r"(count|number of|how many).*(genre|movies)",
            Literal("SELECT genre, COUNT(*) as movie_count FROM movies GROUP BY genre ORDER BY movie_count DESC"),
        ),
        // Relative to the overall average
        (
            Intent::AboveAverageRating,
            r"above.*(average|avg).*rating",
            Literal("SELECT * FROM movies WHERE Rating > (SELECT AVG(Rating) FROM movies)"),
        ),
        (
            Intent::BelowAverageRating,
            r"below.*(average|avg).*rating",
            Literal("SELECT * FROM movies WHERE Rating < (SELECT AVG(Rating) FROM movies)"),
        ),
        // Best / worst in a genre
        (
            Intent::BestInGenre,
            r"(best|highest).* (\w+)",
            Derived(|c| {
                format!(
                    "SELECT * FROM movies WHERE genre = '{}' ORDER BY Rating DESC LIMIT 1",
                    group(c, 2)
                )
            }),
        ),
        (
            Intent::WorstInGenre,
            r"(worst|lowest).* (\w+)",
            Derived(|c| {
                format!(
                    "SELECT * FROM movies WHERE genre = '{}' ORDER BY Rating ASC LIMIT 1",
                    group(c, 2)
                )
            }),
        ),
        // Runtime
        (
            Intent::ShorterThan,
            r"(shorter|less) than ([0-9]+).*minutes",
            Derived(|c| {
                format!("SELECT * FROM movies WHERE Duration_Minutes < {}", number(c, 2))
            }),
        ),
        (
            Intent::LongerThan,
            r"(longer|more) than ([0-9]+).*minutes",
            Derived(|c| {
                format!("SELECT * FROM movies WHERE Duration_Minutes > {}", number(c, 2))
            }),
        ),
    ];

    let rules = entries
        .into_iter()
        .map(|(intent, pattern, producer)| {
            Rule::new(intent, pattern, producer).expect("Invalid regex")
        })
        .collect();

    PatternCatalog::new(rules)
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_order() {
        let intents: Vec<Intent> = PatternCatalog::builtin()
            .rules()
            .iter()
            .map(Rule::intent)
            .collect();

        assert_eq!(intents.len(), 25);
        assert_eq!(intents[0], Intent::DurationAscending);
        assert_eq!(intents[2], Intent::HighestRating);
        assert_eq!(intents[9], Intent::GenreList);
        assert_eq!(intents[12], Intent::TopByRating);
        assert_eq!(intents[17], Intent::CountInGenre);
        assert_eq!(intents[18], Intent::CountByGenre);
        assert_eq!(intents[24], Intent::LongerThan);
        assert!(!intents.contains(&Intent::Default));
    }

    #[test]
    fn test_intents_are_unique() {
        let catalog = PatternCatalog::builtin();
        let unique: HashSet<Intent> = catalog.rules().iter().map(Rule::intent).collect();
        assert_eq!(unique.len(), catalog.len());
    }

    #[test]
    fn test_literal_rule() {
        let rule = Rule::new(
            Intent::MostPopular,
            r"most popular",
            Producer::Literal("SELECT 1"),
        )
        .unwrap();
        assert_eq!(rule.apply("the most popular one").as_deref(), Some("SELECT 1"));
        assert_eq!(rule.apply("least popular"), None);
    }

    #[test]
    fn test_derived_rule() {
        let rule = Rule::new(
            Intent::VotesAbove,
            r"above ([0-9]+)",
            Producer::Derived(|c| format!("n={}", number(c, 1))),
        )
        .unwrap();
        assert_eq!(rule.apply("votes above 300").as_deref(), Some("n=300"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Rule::new(Intent::Default, r"(unclosed", Producer::Literal("")).unwrap_err();
        assert!(err.to_string().starts_with("Invalid pattern for default"));
    }

    #[test]
    #[should_panic(expected = "non-numeric")]
    fn test_numeric_capture_contract() {
        let rule = Rule::new(
            Intent::RatingAbove,
            r"above (\w+)",
            Producer::Derived(|c| number(c, 1).to_string()),
        )
        .unwrap();
        rule.apply("above eight");
    }

    #[test]
    fn test_intent_serializes_as_name() {
        for rule in PatternCatalog::builtin().rules() {
            let json = serde_json::to_value(rule.intent()).unwrap();
            assert_eq!(json, rule.intent().name());
        }
    }
}
