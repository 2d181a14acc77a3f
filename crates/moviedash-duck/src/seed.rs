//! Sample dataset seeding

use duckdb::{params, Connection};
use moviedash_model::sample_movies;

const CREATE_MOVIES: &str = "CREATE TABLE movies (
    Title VARCHAR,
    genre VARCHAR,
    Rating DOUBLE,
    Votes BIGINT,
    Duration VARCHAR,
    Duration_Minutes INTEGER
)";

/// Create the `movies` table and fill it with the sample dataset.
///
/// `Duration_Minutes` is normalized here so the duration queries can sort and
/// filter on it; unparsable durations are stored as NULL.
pub fn seed_sample_movies(conn: &Connection) -> duckdb::Result<usize> {
    conn.execute_batch(CREATE_MOVIES)?;

    let mut stmt = conn.prepare("INSERT INTO movies VALUES (?, ?, ?, ?, ?, ?)")?;
    let mut inserted = 0;
    for movie in sample_movies() {
        let minutes = movie.duration_minutes().map(i64::from);
        inserted += stmt.execute(params![
            movie.title,
            movie.genre,
            movie.rating,
            movie.votes,
            movie.duration,
            minutes
        ])?;
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed() -> duckdb::Result<()> {
        let conn = Connection::open_in_memory()?;
        assert_eq!(seed_sample_movies(&conn)?, 20);

        let total: i64 = conn.query_row(
            "SELECT CAST(SUM(Duration_Minutes) AS BIGINT) FROM movies WHERE genre = 'crime'",
            [],
            |row| row.get(0),
        )?;
        // 2h 34m + 2h 55m
        assert_eq!(total, 154 + 175);

        // A second seed collides with the existing table
        assert!(seed_sample_movies(&conn).is_err());
        Ok(())
    }
}
