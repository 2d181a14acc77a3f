//! moviedash data model
//!
//! Movie records, the duration normalizer and the browse filters used by the
//! standard dashboard mode. Everything here is plain data plus pure
//! functions over it; no I/O.

mod browse;
mod duration;
mod movie;

pub use browse::{genres, BrowseFilter, SortOrder};
pub use duration::parse_duration_minutes;
pub use movie::{sample_movies, Movie};

/// Name of the single table every query targets
pub const MOVIES_TABLE: &str = "movies";

/// Column holding the raw duration text ("2h 15m")
pub const DURATION_COLUMN: &str = "Duration";

/// Derived column holding the normalized duration in minutes
pub const DURATION_MINUTES_COLUMN: &str = "Duration_Minutes";
