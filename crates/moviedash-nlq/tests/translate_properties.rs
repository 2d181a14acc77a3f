//! Property tests for the translator: determinism, rule priority and literal
//! pass-through

use moviedash_nlq::{translate, Intent, PatternCatalog, Translator, DEFAULT_QUERY};
use proptest::prelude::*;
use regex::Regex;

const FRAGMENTS: &[&str] = &[
    "show",
    "all",
    "action",
    "drama",
    "movies",
    "duration",
    "shortest",
    "longest",
    "highest",
    "lowest",
    "rated",
    "rating",
    "above 7",
    "between 6 and 8",
    "most popular",
    "fewest votes",
    "votes",
    "title with",
    "top 3",
    "average",
    "genre",
    "count",
    "how many",
    "best",
    "worst",
    "shorter than 120",
    "longer than 90",
    "minutes",
    "xyzzy",
];

fn sentence() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..8).prop_map(|words| words.join(" "))
}

/// Index of the first rule whose pattern matches, found independently of the
/// translator
fn first_matching_rule(text: &str) -> Option<Intent> {
    let lowered = text.to_lowercase();
    PatternCatalog::builtin()
        .rules()
        .iter()
        .find(|rule| Regex::new(rule.pattern()).unwrap().is_match(&lowered))
        .map(|rule| rule.intent())
}

proptest! {
    #[test]
    fn deterministic(text in ".{0,80}") {
        let translator = Translator::new();
        prop_assert_eq!(translator.translate(&text), translator.translate(&text));
    }

    #[test]
    fn lowest_numbered_rule_wins(text in sentence()) {
        let expected = first_matching_rule(&text).unwrap_or(Intent::Default);
        prop_assert_eq!(translate(&text).intent, expected);
    }

    #[test]
    fn case_does_not_matter(text in sentence()) {
        prop_assert_eq!(translate(&text.to_uppercase()), translate(&text));
    }

    #[test]
    fn rating_threshold_is_passed_through(n in "[0-9]{1,4}(\\.[0-9]{1,2})?") {
        let t = translate(&format!("rating above {}", n));
        prop_assert_eq!(t.intent, Intent::RatingAbove);
        prop_assert_eq!(t.sql, format!("SELECT * FROM movies WHERE Rating > {}", n));
    }

    #[test]
    fn genre_word_is_captured(genre in "[a-z]{3,10}") {
        let t = translate(&format!("show {} movies", genre));
        prop_assert_eq!(t.intent, Intent::GenreList);
        prop_assert_eq!(t.sql, format!("SELECT * FROM movies WHERE genre = '{}'", genre));
    }

    #[test]
    fn top_n_limit_is_passed_through(n in 1u32..10_000) {
        let t = translate(&format!("top {} by votes", n));
        prop_assert_eq!(t.intent, Intent::TopByVotes);
        prop_assert_eq!(t.sql, format!("SELECT * FROM movies ORDER BY Votes DESC LIMIT {}", n));
    }
}

#[test]
fn unmatched_text_falls_back_to_select_all() {
    for text in ["xyzzy nonsense text", "", "   ", "hello there"] {
        let t = translate(text);
        assert_eq!(t.intent, Intent::Default, "{:?}", text);
        assert_eq!(t.sql, DEFAULT_QUERY);
    }
}

#[test]
fn custom_catalog_respects_declared_order() {
    use moviedash_nlq::{Producer, Rule};

    let catalog = PatternCatalog::new(vec![
        Rule::new(Intent::MostPopular, r"popular", Producer::Literal("first")).unwrap(),
        Rule::new(Intent::LeastPopular, r"least popular", Producer::Literal("second")).unwrap(),
    ]);
    let translator = Translator::with_catalog(&catalog);

    let t = translator.translate("least popular");
    assert_eq!(t.intent, Intent::MostPopular);
    assert_eq!(t.sql, "first");

    assert!(translator.translate("unrelated").is_default());
}

#[test]
fn dashboard_examples() {
    let cases = [
        ("Show all action movies", Intent::GenreList),
        ("Give me the top 5 highest rated movies", Intent::HighestRating),
        ("Show movies with rating above 8", Intent::RatingAbove),
        ("List all horror movies with rating above 7", Intent::RatingAbove),
        ("What is the average rating by genre?", Intent::AverageRatingByGenre),
        ("Show movies sorted by duration in ascending order", Intent::DurationAscending),
        ("Show the longest sci-fi movie", Intent::Default),
        ("Count the number of movies by genre", Intent::CountInGenre),
    ];

    for (text, intent) in cases {
        assert_eq!(translate(text).intent, intent, "{}", text);
    }
}
