//! Structured logging for the moviedash server
//!
//! - Human-readable console logging for development
//! - JSON logging for production
//! - Daily rolling log files
//! - Per-request ids on tool calls

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "moviedash-server.log";

/// Log format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format for development
    Pretty,
    /// JSON format for production (structured logging)
    Json,
    /// Compact format for testing
    Compact,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    File,
    Both,
}

impl LogOutput {
    pub fn from_env() -> Self {
        match std::env::var("LOG_OUTPUT").as_deref() {
            Ok("file") => LogOutput::File,
            Ok("both") => LogOutput::Both,
            _ => LogOutput::Stdout,
        }
    }
}

fn log_dir() -> String {
    std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string())
}

fn file_appender() -> RollingFileAppender {
    let dir = log_dir();
    std::fs::create_dir_all(&dir).ok();
    RollingFileAppender::new(Rotation::DAILY, &dir, LOG_FILE_PREFIX)
}

fn env_filter() -> EnvFilter {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Keep the chatty transport crates quiet
    for directive in ["hyper=warn", "tokio=warn", "runtime=warn", "tower=warn", "h2=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

/// Initialize the logging system
///
/// Environment variables:
/// - `RUST_LOG`: Log level (e.g., "debug", "info", "moviedash_server=debug")
/// - `LOG_FORMAT`: Output format ("pretty", "json", "compact")
/// - `LOG_OUTPUT`: Where to write logs ("stdout", "file", "both")
/// - `LOG_DIR`: Directory for log files (default: "./logs")
///
/// ```bash
/// # Development
/// RUST_LOG=debug LOG_FORMAT=pretty cargo run
///
/// # Production: JSON to file
/// RUST_LOG=info LOG_FORMAT=json LOG_OUTPUT=file LOG_DIR=/var/log/moviedash cargo run
/// ```
pub fn init() {
    let format = LogFormat::from_env();
    let output = LogOutput::from_env();
    let env_filter = env_filter();

    match (output, format) {
        (LogOutput::Stdout, LogFormat::Pretty) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_thread_ids(true).with_target(true))
                .init();
        }
        (LogOutput::Stdout, LogFormat::Json) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_current_span(true))
                .init();
        }
        (LogOutput::Stdout, LogFormat::Compact) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact())
                .init();
        }
        (LogOutput::File, _) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(file_appender()).with_ansi(false))
                .init();
        }
        (LogOutput::Both, format) => {
            let stdout_layer = match format {
                LogFormat::Pretty => fmt::layer()
                    .pretty()
                    .with_thread_ids(true)
                    .with_target(true)
                    .boxed(),
                LogFormat::Json => fmt::layer().json().with_current_span(true).boxed(),
                LogFormat::Compact => fmt::layer().compact().boxed(),
            };

            let file_layer = fmt::layer()
                .with_writer(file_appender())
                .with_ansi(false)
                .boxed();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(file_layer)
                .init();
        }
    }

    tracing::info!(format = ?format, output = ?output, "Logging system initialized");
    if matches!(output, LogOutput::File | LogOutput::Both) {
        tracing::debug!("  LOG_DIR: {}", log_dir());
    }
}

/// Structured event with an `event` name and arbitrary debug-formatted fields
///
/// ```ignore
/// log_event!(
///     level: tracing::Level::INFO,
///     event: "query_executed",
///     request_id: id,
///     rows: 20
/// );
/// ```
#[macro_export]
macro_rules! log_event {
    (level: $level:expr, event: $event:expr $(, $key:ident: $value:expr)* $(,)?) => {
        tracing::event!(
            $level,
            event = $event
            $(, $key = ?$value)*
        );
    };
}
