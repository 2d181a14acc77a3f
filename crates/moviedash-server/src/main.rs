//! Movies dashboard MCP server
//!
//! Answers plain English questions about a movies table by translating them
//! to SQL with a fixed pattern catalog, and serves custom SQL and filtered
//! browsing over the same DuckDB database.

use rust_mcp_sdk::mcp_server::{hyper_server, HyperServerOptions};
use tracing::info;

mod config;
mod logging;
mod mcp;
mod query;

use config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config_path =
        std::env::var("MOVIEDASH_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let config = Config::load_or_default(&config_path)?;

    config.apply_logging_env();
    logging::init();

    info!(config = %config_path, database = %config.database.path, "Configuration loaded");

    let handler = mcp::MovieDashHandler::new(query::Dashboard::from_config(&config));
    let server_info = mcp::MovieDashHandler::server_info();

    let host = config.server.host.clone();
    let port = config.server.port;

    info!("Starting moviedash MCP server on {}:{}", host, port);
    info!("Protocol: MCP with SSE (Server-Sent Events) support");

    let server = hyper_server::create_server(
        server_info,
        handler,
        HyperServerOptions {
            host,
            port,
            sse_support: true,
            ..Default::default()
        },
    );

    server.start().await?;

    Ok(())
}
