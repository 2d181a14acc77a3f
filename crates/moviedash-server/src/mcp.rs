//! MCP (Model Context Protocol) server implementation

use async_trait::async_trait;
use moviedash_model::BrowseFilter;
use moviedash_nlq::Translator;
use rust_mcp_schema::{
    schema_utils::CallToolError, CallToolRequest, CallToolResult, ContentBlock, Implementation,
    InitializeResult, ListToolsRequest, ListToolsResult, RpcError, ServerCapabilities,
    ServerCapabilitiesTools, TextContent, Tool, ToolInputSchema, LATEST_PROTOCOL_VERSION,
};
use rust_mcp_sdk::{mcp_server::ServerHandler, McpServer};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, Level};
use uuid::Uuid;

use crate::query::Dashboard;

/// Movies dashboard MCP handler
pub struct MovieDashHandler {
    dashboard: Dashboard,
}

impl MovieDashHandler {
    pub fn new(dashboard: Dashboard) -> Self {
        Self { dashboard }
    }

    /// Create server initialization details
    pub fn server_info() -> InitializeResult {
        InitializeResult {
            protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ServerCapabilitiesTools {
                    list_changed: None,
                }),
                ..Default::default()
            },
            server_info: Implementation {
                name: "moviedash-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Movies Dashboard".to_string()),
            },
            instructions: Some(
                "Movies dashboard over a DuckDB 'movies' table. \
                 Use 'ask' for plain English questions, 'sql' for custom queries \
                 and 'browse' for filtered listings."
                    .to_string(),
            ),
            meta: None,
        }
    }

    fn prop(kind: &str, description: &str) -> Map<String, Value> {
        let mut prop = Map::new();
        prop.insert("type".to_string(), Value::String(kind.to_string()));
        prop.insert(
            "description".to_string(),
            Value::String(description.to_string()),
        );
        prop
    }

    fn database_prop(&self) -> Map<String, Value> {
        let description = format!(
            "DuckDB file name inside the directory of '{}' (defaults to that file); \
             seeded with sample movies when empty",
            self.dashboard.default_database()
        );
        Self::prop("string", &description)
    }

    fn tool(name: &str, description: &str, required: &[&str], properties: HashMap<String, Map<String, Value>>) -> Tool {
        Tool {
            name: name.to_string(),
            description: Some(description.to_string()),
            input_schema: ToolInputSchema::new(
                required.iter().map(|r| r.to_string()).collect(),
                Some(properties),
            ),
            title: None,
            annotations: None,
            meta: None,
            output_schema: None,
        }
    }

    /// Define available MCP tools
    fn tools(&self) -> Vec<Tool> {
        let mut tools = Vec::new();

        // Natural language
        {
            let mut properties = HashMap::new();
            properties.insert(
                "question".to_string(),
                Self::prop("string", "Question about the movies, e.g. 'top 5 by votes'"),
            );
            properties.insert("database".to_string(), self.database_prop());

            tools.push(Self::tool(
                "ask",
                "Translate an English question into SQL with the pattern catalog and run it. \
                 Returns the matched intent, the SQL, summary metrics and the rows.",
                &["question"],
                properties,
            ));
        }

        // Custom SQL
        {
            let mut properties = HashMap::new();
            properties.insert(
                "sql".to_string(),
                Self::prop("string", "SQL to run verbatim against the movies database"),
            );
            properties.insert("database".to_string(), self.database_prop());

            tools.push(Self::tool(
                "sql",
                "Run a SQL query as written. Rows gain a Duration_Minutes column \
                 when the result has a Duration column.",
                &["sql"],
                properties,
            ));
        }

        // Browse
        {
            let mut properties = HashMap::new();
            properties.insert(
                "genre".to_string(),
                Self::prop("string", "Genre to keep, or 'All'"),
            );
            properties.insert(
                "min_rating".to_string(),
                Self::prop("number", "Inclusive lower rating bound (default 0)"),
            );
            properties.insert(
                "max_rating".to_string(),
                Self::prop("number", "Inclusive upper rating bound (default 10)"),
            );
            properties.insert(
                "min_votes".to_string(),
                Self::prop("integer", "Inclusive lower vote bound"),
            );
            properties.insert(
                "max_votes".to_string(),
                Self::prop("integer", "Inclusive upper vote bound"),
            );
            properties.insert(
                "min_duration".to_string(),
                Self::prop("integer", "Inclusive lower duration bound in minutes"),
            );
            properties.insert(
                "max_duration".to_string(),
                Self::prop("integer", "Inclusive upper duration bound in minutes"),
            );

            let mut sort = Self::prop("string", "Sort order");
            sort.insert(
                "enum".to_string(),
                serde_json::json!(["rating_desc", "votes_desc", "duration_desc", "duration_asc"]),
            );
            properties.insert("sort".to_string(), sort);
            properties.insert(
                "search".to_string(),
                Self::prop("string", "Case-insensitive title substring"),
            );
            properties.insert("database".to_string(), self.database_prop());

            tools.push(Self::tool(
                "browse",
                "List movies filtered by genre, rating, votes and duration, then sorted.",
                &[],
                properties,
            ));
        }

        // Translate only
        {
            let mut properties = HashMap::new();
            properties.insert(
                "question".to_string(),
                Self::prop("string", "Question to translate"),
            );

            tools.push(Self::tool(
                "translate",
                "Show the intent and SQL a question maps to without running it.",
                &["question"],
                properties,
            ));
        }

        tools
    }
}

#[async_trait]
impl ServerHandler for MovieDashHandler {
    async fn handle_list_tools_request(
        &self,
        _request: ListToolsRequest,
        _runtime: Arc<dyn McpServer>,
    ) -> std::result::Result<ListToolsResult, RpcError> {
        info!("Listing available tools");

        Ok(ListToolsResult {
            tools: self.tools(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn handle_call_tool_request(
        &self,
        request: CallToolRequest,
        _runtime: Arc<dyn McpServer>,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let request_id = Uuid::new_v4();
        crate::log_event!(
            level: Level::INFO,
            event: "tool_called",
            request_id: request_id,
            tool: request.params.name,
        );

        let arguments = request.params.arguments.map(Value::Object);

        let result = match request.params.name.as_str() {
            "ask" => self.handle_ask_tool(arguments).await,
            "sql" => self.handle_sql_tool(arguments).await,
            "browse" => self.handle_browse_tool(arguments).await,
            "translate" => self.handle_translate_tool(arguments),
            _ => return Err(CallToolError::unknown_tool(request.params.name.clone())),
        };

        if let Err(e) = &result {
            error!(%request_id, tool = %request.params.name, "Tool failed: {}", e);
        }
        result
    }
}

fn required_str<'a>(args: &'a Option<Value>, key: &str) -> Result<&'a str, CallToolError> {
    args.as_ref()
        .and_then(|a| a.get(key))
        .and_then(Value::as_str)
        .ok_or_else(|| CallToolError::from_message(format!("Missing required argument: {key}")))
}

fn database_arg(args: &Option<Value>) -> Option<&str> {
    args.as_ref()
        .and_then(|a| a.get("database"))
        .and_then(Value::as_str)
}

fn text_result<T: Serialize>(value: &T) -> Result<CallToolResult, CallToolError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        CallToolError::from_message(format!("Failed to serialize response: {}", e))
    })?;

    Ok(CallToolResult {
        content: vec![ContentBlock::TextContent(TextContent::new(text, None, None))],
        is_error: None,
        meta: None,
        structured_content: None,
    })
}

impl MovieDashHandler {
    async fn handle_ask_tool(
        &self,
        arguments: Option<Value>,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let question = required_str(&arguments, "question")?;

        let response = self
            .dashboard
            .ask(question, database_arg(&arguments))
            .await
            .map_err(|e| CallToolError::from_message(format!("Failed to execute query: {}", e)))?;

        info!(
            intent = %response.intent,
            rows = response.summary.total,
            "Answered question"
        );
        text_result(&response)
    }

    async fn handle_sql_tool(
        &self,
        arguments: Option<Value>,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let sql = required_str(&arguments, "sql")?;

        let response = self
            .dashboard
            .run_sql(sql, database_arg(&arguments))
            .await
            .map_err(|e| CallToolError::from_message(format!("Failed to execute query: {}", e)))?;

        info!(rows = response.summary.total, "Ran custom SQL");
        text_result(&response)
    }

    async fn handle_browse_tool(
        &self,
        arguments: Option<Value>,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let database = database_arg(&arguments).map(String::from);

        let filter: BrowseFilter = match arguments {
            Some(args) => serde_json::from_value(args).map_err(|e| {
                CallToolError::from_message(format!("Invalid browse filter: {}", e))
            })?,
            None => BrowseFilter::default(),
        };

        let response = self
            .dashboard
            .browse(&filter, database.as_deref())
            .await
            .map_err(|e| CallToolError::from_message(format!("Failed to browse movies: {}", e)))?;

        text_result(&response)
    }

    fn handle_translate_tool(
        &self,
        arguments: Option<Value>,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let question = required_str(&arguments, "question")?;
        text_result(&Translator::new().translate(question))
    }
}
