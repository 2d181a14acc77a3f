//! DuckDB executor for generated and hand-written movie queries

use chrono::{DateTime, NaiveDate, NaiveTime};
use duckdb::{
    types::{TimeUnit, ValueRef},
    Connection,
};
use moviedash_model::{Movie, MOVIES_TABLE};
use std::path::Path;
use thiserror::Error;

mod result;
mod seed;

pub use result::{QueryResult, ResultSummary};
pub use seed::seed_sample_movies;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    #[error("Budget exceeded: {0}")]
    BudgetExceeded(String),

    #[error("The '{0}' table does not exist in the database")]
    MissingTable(String),
}

/// Resource limits for a single query
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionBudget {
    pub max_memory_mb: Option<u64>,
    pub max_rows: Option<u64>,
}

pub struct DuckExecutor {
    conn: Connection,
}

impl DuckExecutor {
    /// Open (or create) a database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExecutionError> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self, ExecutionError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn has_movies_table(&self) -> Result<bool, ExecutionError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
            [MOVIES_TABLE],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Make sure the `movies` table exists, seeding the sample dataset when
    /// allowed. Returns whether the table was created.
    pub fn ensure_movies_table(&self, seed: bool) -> Result<bool, ExecutionError> {
        if self.has_movies_table()? {
            return Ok(false);
        }
        if !seed {
            return Err(ExecutionError::MissingTable(MOVIES_TABLE.to_string()));
        }

        tracing::info!("Creating sample movie table since it doesn't exist");
        let inserted = seed_sample_movies(&self.conn)?;
        tracing::info!(rows = inserted, "Sample movie table created");
        Ok(true)
    }

    /// Execute query text and collect the full result
    pub fn query(
        &self,
        sql: &str,
        budget: Option<ExecutionBudget>,
    ) -> Result<QueryResult, ExecutionError> {
        if !self.has_movies_table()? {
            return Err(ExecutionError::MissingTable(MOVIES_TABLE.to_string()));
        }

        if let Some(ref budget) = budget {
            self.apply_budget(budget)?;
        }

        tracing::debug!(sql = %sql, "Executing query");

        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;

        let columns: Vec<String> = rows
            .as_ref()
            .map(|stmt| stmt.column_names())
            .unwrap_or_default();

        let mut result_rows = Vec::new();
        while let Some(row) = rows.next()? {
            let mut json_row = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                json_row.push(value_to_json(row.get_ref(i)?));
            }
            result_rows.push(json_row);

            // Check row budget
            if let Some(max_rows) = budget.and_then(|b| b.max_rows) {
                if result_rows.len() as u64 > max_rows {
                    return Err(ExecutionError::BudgetExceeded(format!(
                        "Max rows ({}) exceeded",
                        max_rows
                    )));
                }
            }
        }

        let row_count = result_rows.len();
        tracing::info!(rows = row_count, "Query executed");

        Ok(QueryResult {
            columns,
            rows: result_rows,
            row_count,
        })
    }

    /// Read every movie record, for the browse mode
    pub fn load_movies(&self) -> Result<Vec<Movie>, ExecutionError> {
        if !self.has_movies_table()? {
            return Err(ExecutionError::MissingTable(MOVIES_TABLE.to_string()));
        }

        let mut stmt = self
            .conn
            .prepare("SELECT Title, genre, Rating, Votes, Duration FROM movies")?;
        let movies = stmt
            .query_map([], |row| {
                Ok(Movie {
                    title: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    genre: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    rating: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                    votes: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
                    duration: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                })
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;

        tracing::debug!(movies = movies.len(), "Loaded movie records");
        Ok(movies)
    }

    fn apply_budget(&self, budget: &ExecutionBudget) -> Result<(), ExecutionError> {
        if let Some(max_memory_mb) = budget.max_memory_mb {
            let pragma = format!("PRAGMA memory_limit='{}MB'", max_memory_mb);
            self.conn.execute_batch(&pragma)?;
        }
        Ok(())
    }
}

/// Days from 0001-01-01 to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

fn value_to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(i) => serde_json::Value::from(i),
        ValueRef::SmallInt(i) => serde_json::Value::from(i),
        ValueRef::Int(i) => serde_json::Value::from(i),
        ValueRef::BigInt(i) => serde_json::Value::from(i),
        ValueRef::HugeInt(i) => i64::try_from(i)
            .map(serde_json::Value::from)
            .unwrap_or_else(|_| serde_json::Value::String(i.to_string())),
        ValueRef::UTinyInt(i) => serde_json::Value::from(i),
        ValueRef::USmallInt(i) => serde_json::Value::from(i),
        ValueRef::UInt(i) => serde_json::Value::from(i),
        ValueRef::UBigInt(i) => serde_json::Value::from(i),
        ValueRef::Float(f) => serde_json::json!(f),
        ValueRef::Double(f) => serde_json::json!(f),
        ValueRef::Text(s) => serde_json::Value::String(String::from_utf8_lossy(s).to_string()),
        ValueRef::Blob(b) => serde_json::Value::String(format!("<blob {} bytes>", b.len())),
        ValueRef::Decimal(d) => d
            .to_string()
            .parse::<f64>()
            .map(|f| serde_json::json!(f))
            .unwrap_or_else(|_| serde_json::Value::String(d.to_string())),
        ValueRef::Date32(days) => NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
            .map(|d| serde_json::Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Timestamp(unit, value) => DateTime::from_timestamp_micros(to_micros(unit, value))
            .map(|ts| {
                serde_json::Value::String(ts.naive_utc().format("%Y-%m-%d %H:%M:%S%.f").to_string())
            })
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Time64(unit, value) => {
            let micros = to_micros(unit, value);
            let secs = u32::try_from(micros.div_euclid(1_000_000)).ok();
            let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
            secs.and_then(|secs| NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos))
                .map(|t| serde_json::Value::String(t.format("%H:%M:%S%.f").to_string()))
                .unwrap_or(serde_json::Value::Null)
        }
        _ => serde_json::Value::String("<unsupported>".to_string()),
    }
}
