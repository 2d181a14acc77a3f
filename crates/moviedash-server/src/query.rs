//! The three dashboard modes, executed against DuckDB
//!
//! Each call opens its own connection: DuckDB connections are not shared
//! across requests.

use std::path::{Component, Path, PathBuf};

use moviedash_duck::{DuckExecutor, ExecutionBudget, ExecutionError, QueryResult, ResultSummary};
use moviedash_model::{genres, BrowseFilter, Movie};
use moviedash_nlq::{Intent, Translator};
use serde::Serialize;
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("Failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database '{0}' must be a relative path inside the data directory")]
    InvalidDatabase(String),

    #[error("Query task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Natural language mode output
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub question: String,
    pub intent: Intent,
    pub sql: String,
    pub summary: ResultSummary,
    pub results: serde_json::Value,
}

/// Custom SQL mode output
#[derive(Debug, Serialize)]
pub struct SqlResponse {
    pub sql: String,
    pub summary: ResultSummary,
    pub results: serde_json::Value,
}

/// One movie in browse mode, with its normalized duration
#[derive(Debug, Serialize)]
pub struct BrowseRow {
    #[serde(flatten)]
    pub movie: Movie,
    pub duration_minutes: Option<u32>,
}

/// Standard dashboard mode output
#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    /// Options for the genre selector, from every movie with a usable duration
    pub genres: Vec<String>,
    pub summary: ResultSummary,
    pub movies: Vec<BrowseRow>,
}

/// Runs dashboard requests against the configured database
#[derive(Debug, Clone)]
pub struct Dashboard {
    database: String,
    seed_sample: bool,
    budget: ExecutionBudget,
}

impl Dashboard {
    pub fn new(database: impl Into<String>, seed_sample: bool, budget: ExecutionBudget) -> Self {
        Self {
            database: database.into(),
            seed_sample,
            budget,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.database.path.clone(),
            config.database.seed_sample,
            config.execution.budget(),
        )
    }

    pub fn default_database(&self) -> &str {
        &self.database
    }

    /// Where a request's database lives. Overrides are file names resolved
    /// against the configured database's directory and may not leave it.
    fn resolve_database(&self, database: Option<&str>) -> Result<PathBuf, QueryError> {
        let Some(name) = database else {
            return Ok(PathBuf::from(&self.database));
        };

        let relative = Path::new(name);
        let contained = relative.components().next().is_some()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !contained {
            return Err(QueryError::InvalidDatabase(name.to_string()));
        }

        let data_dir = Path::new(&self.database).parent().unwrap_or(Path::new(""));
        Ok(data_dir.join(relative))
    }

    fn open(&self, database: Option<&str>) -> Result<DuckExecutor, QueryError> {
        let path = self.resolve_database(database)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let executor = DuckExecutor::open(&path)?;
        executor.ensure_movies_table(self.seed_sample)?;
        Ok(executor)
    }

    fn run(&self, executor: &DuckExecutor, sql: &str) -> Result<QueryResult, QueryError> {
        let mut result = executor.query(sql, Some(self.budget))?;
        result.post_process();
        Ok(result)
    }

    /// Run DuckDB work on the blocking pool
    async fn blocking<T, F>(&self, database: Option<&str>, work: F) -> Result<T, QueryError>
    where
        T: Send + 'static,
        F: FnOnce(&Dashboard, Option<&str>) -> Result<T, QueryError> + Send + 'static,
    {
        let dashboard = self.clone();
        let database = database.map(String::from);
        tokio::task::spawn_blocking(move || work(&dashboard, database.as_deref())).await?
    }

    /// Translate a sentence and run the generated query
    pub async fn ask(
        &self,
        question: &str,
        database: Option<&str>,
    ) -> Result<AskResponse, QueryError> {
        let question = question.to_string();
        self.blocking(database, move |dashboard, database| {
            dashboard.ask_blocking(question, database)
        })
        .await
    }

    fn ask_blocking(&self, question: String, database: Option<&str>) -> Result<AskResponse, QueryError> {
        let translation = Translator::new().translate(&question);
        tracing::info!(
            intent = %translation.intent,
            sql = %translation.sql,
            "Generated SQL from natural language"
        );

        let executor = self.open(database)?;
        let result = self.run(&executor, &translation.sql)?;

        Ok(AskResponse {
            question,
            intent: translation.intent,
            sql: translation.sql,
            summary: result.summary(),
            results: result.to_json(),
        })
    }

    /// Run query text exactly as the user wrote it
    pub async fn run_sql(&self, sql: &str, database: Option<&str>) -> Result<SqlResponse, QueryError> {
        let sql = sql.to_string();
        self.blocking(database, move |dashboard, database| {
            let executor = dashboard.open(database)?;
            let result = dashboard.run(&executor, &sql)?;

            Ok(SqlResponse {
                summary: result.summary(),
                results: result.to_json(),
                sql,
            })
        })
        .await
    }

    /// Filter and sort the whole table with widget settings
    pub async fn browse(
        &self,
        filter: &BrowseFilter,
        database: Option<&str>,
    ) -> Result<BrowseResponse, QueryError> {
        let filter = filter.clone();
        self.blocking(database, move |dashboard, database| {
            dashboard.browse_blocking(&filter, database)
        })
        .await
    }

    fn browse_blocking(
        &self,
        filter: &BrowseFilter,
        database: Option<&str>,
    ) -> Result<BrowseResponse, QueryError> {
        let executor = self.open(database)?;
        let movies = executor.load_movies()?;
        let timed: Vec<Movie> = movies
            .into_iter()
            .filter(|m| m.duration_minutes().is_some())
            .collect();
        let selected = filter.apply(&timed);

        tracing::info!(
            total = timed.len(),
            selected = selected.len(),
            "Applied browse filters"
        );

        Ok(BrowseResponse {
            genres: genres(&timed),
            summary: browse_summary(&selected),
            movies: selected
                .into_iter()
                .map(|movie| BrowseRow {
                    duration_minutes: movie.duration_minutes(),
                    movie,
                })
                .collect(),
        })
    }
}

fn browse_summary(movies: &[Movie]) -> ResultSummary {
    let average_rating = if movies.is_empty() {
        None
    } else {
        Some(movies.iter().map(|m| m.rating).sum::<f64>() / movies.len() as f64)
    };

    ResultSummary {
        total: movies.len(),
        average_rating,
        genres: Some(genres(movies).len()),
    }
}
