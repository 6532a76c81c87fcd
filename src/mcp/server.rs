use crate::app::App;
use crate::errors::{ErrorCode, McpError, ToolError};
use crate::mcp::catalog::{tool_by_name, tool_definitions};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::services::executor::unknown_tool_error;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

const PROTOCOL_VERSION: &str = "2025-06-18";
const SERVER_NAME: &str = "sicap-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct McpServer {
    app: Arc<App>,
}

impl McpServer {
    pub fn new() -> Result<Self, ToolError> {
        let app = App::initialize()?;
        Ok(Self { app: Arc::new(app) })
    }

    pub fn with_app(app: App) -> Self {
        Self { app: Arc::new(app) }
    }

    fn handle_initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {"tools": {"list": true, "call": true}},
            "serverInfo": {"name": SERVER_NAME, "version": SERVER_VERSION},
        })
    }

    fn handle_tools_list(&self) -> Value {
        json!({ "tools": tool_definitions() })
    }

    /// Runs the tool and wraps the outcome in a `tools/call` result.
    /// Invocation failures stay in-band; only routing problems (missing
    /// or unknown tool name) become protocol errors.
    async fn handle_tools_call(&self, name: &str, args: Value) -> Result<Value, McpError> {
        if tool_by_name(name).is_none() {
            return Err(McpError::new(
                ErrorCode::InvalidParams,
                unknown_tool_error(name).to_string(),
            ));
        }
        let result = self.app.executor.call(name, args).await;
        let text = serde_json::to_string(&result.to_value()).unwrap_or_else(|_| "{}".to_string());
        let mut payload = Map::new();
        payload.insert(
            "content".to_string(),
            json!([{ "type": "text", "text": text }]),
        );
        if result.is_failure() {
            payload.insert("isError".to_string(), json!(true));
        }
        Ok(Value::Object(payload))
    }

    pub async fn dispatch(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        match request.method.as_str() {
            "notifications/initialized" => request
                .id
                .map(|id| JsonRpcResponse::success(id, json!({}))),
            _ if request.method.starts_with("notifications/") && request.id.is_none() => None,
            "initialize" => request
                .id
                .map(|id| JsonRpcResponse::success(id, self.handle_initialize())),
            "tools/list" => request
                .id
                .map(|id| JsonRpcResponse::success(id, self.handle_tools_list())),
            "tools/call" => match request.id {
                Some(id) => {
                    let params = request.params.as_object().cloned().unwrap_or_default();
                    let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
                    if name.is_empty() {
                        Some(JsonRpcResponse::failure(
                            id,
                            ErrorCode::InvalidParams.as_i32(),
                            "Missing tool name".to_string(),
                        ))
                    } else {
                        let args = params.get("arguments").cloned().unwrap_or(Value::Null);
                        Some(match self.handle_tools_call(name, args).await {
                            Ok(result) => JsonRpcResponse::success(id, result),
                            Err(err) => {
                                JsonRpcResponse::failure(id, err.code.as_i32(), err.message)
                            }
                        })
                    }
                }
                None => None,
            },
            _ => request.id.map(|id| {
                JsonRpcResponse::failure(
                    id,
                    ErrorCode::MethodNotFound.as_i32(),
                    "Method not found".to_string(),
                )
            }),
        }
    }

    /// Handles one stdin line and renders the response line, if any.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        let parsed: Value = match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(_) => {
                return Some(render(&JsonRpcResponse::failure(
                    Value::Null,
                    ErrorCode::ParseError.as_i32(),
                    "Parse error".to_string(),
                )));
            }
        };

        let request: JsonRpcRequest = match serde_json::from_value(parsed) {
            Ok(request) => request,
            Err(_) => {
                return Some(render(&JsonRpcResponse::failure(
                    Value::Null,
                    ErrorCode::InvalidRequest.as_i32(),
                    "Invalid request".to_string(),
                )));
            }
        };

        let response = self.dispatch(request).await?;
        Some(render(&response))
    }

    pub async fn run_stdio(&self) -> Result<(), ToolError> {
        let stdin = tokio::io::stdin();
        let stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin).lines();
        let mut writer = BufWriter::new(stdout);

        while let Some(line) = reader
            .next_line()
            .await
            .map_err(|err| ToolError::internal(err.to_string()))?
        {
            if let Some(payload) = self.handle_line(&line).await {
                writer.write_all(payload.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        Ok(())
    }
}

fn render(response: &JsonRpcResponse) -> String {
    serde_json::to_string(response).unwrap_or_default()
}

pub async fn run_stdio() -> Result<(), ToolError> {
    let server = McpServer::new()?;
    server.run_stdio().await
}
