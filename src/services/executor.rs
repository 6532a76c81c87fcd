use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::ToolError;
use crate::mcp::catalog;
use crate::services::logger::Logger;
use crate::utils::suggest::suggest;

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, args: Value) -> Result<Value, ToolError>;
}

/// Outcome of one tool invocation, reported in-band in both arms: a
/// success carries the upstream payload verbatim, a failure carries a
/// message and the HTTP status when one arrived.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Success(Value),
    Failure {
        message: String,
        status_code: Option<u16>,
    },
}

impl ToolResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, ToolResult::Failure { .. })
    }

    /// Wire form: the upstream payload unchanged on success, an object
    /// with `error` and, only when known, `status_code` on failure.
    pub fn to_value(&self) -> Value {
        match self {
            ToolResult::Success(payload) => payload.clone(),
            ToolResult::Failure {
                message,
                status_code,
            } => {
                let mut body = Map::new();
                body.insert("error".to_string(), json!(message));
                if let Some(status) = status_code {
                    body.insert("status_code".to_string(), json!(status));
                }
                Value::Object(body)
            }
        }
    }
}

impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        ToolResult::Failure {
            status_code: err.status_code(),
            message: err.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolExecutor {
    pub fn new(logger: Logger, handlers: HashMap<String, Arc<dyn ToolHandler>>) -> Self {
        Self {
            logger: logger.child("executor"),
            handlers: Arc::new(handlers),
        }
    }

    pub fn has_handler(&self, tool: &str) -> bool {
        self.handlers.contains_key(tool)
    }

    /// Runs one invocation end to end. Every error is folded into a
    /// `Failure` result; nothing propagates to the transport as a fault.
    pub async fn call(&self, tool: &str, args: Value) -> ToolResult {
        let started_at = chrono::Utc::now().timestamp_millis();
        let trace_id = uuid::Uuid::new_v4().to_string();
        self.logger
            .debug(tool, Some(&json!({"trace_id": trace_id})));
        match self.invoke(tool, args).await {
            Ok(payload) => {
                self.logger.info(
                    tool,
                    Some(&json!({
                        "trace_id": trace_id,
                        "status": "ok",
                        "duration_ms": chrono::Utc::now().timestamp_millis() - started_at,
                    })),
                );
                ToolResult::Success(payload)
            }
            Err(err) => {
                self.logger.warn(
                    tool,
                    Some(&json!({
                        "trace_id": trace_id,
                        "status": "error",
                        "error": err.to_string(),
                        "status_code": err.status_code(),
                        "duration_ms": chrono::Utc::now().timestamp_millis() - started_at,
                    })),
                );
                ToolResult::from(err)
            }
        }
    }

    async fn invoke(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let Some(spec) = catalog::tool_by_name(tool) else {
            return Err(unknown_tool_error(tool));
        };
        let args = if args.is_null() {
            Value::Object(Map::new())
        } else {
            args
        };
        catalog::validate_tool_args(spec, &args)?;
        let mut fields = match args {
            Value::Object(map) => map,
            // validation guarantees an object
            _ => Map::new(),
        };
        catalog::apply_defaults(spec, &mut fields);
        let handler = self
            .handlers
            .get(tool)
            .ok_or_else(|| unknown_tool_error(tool))?;
        handler.handle(Value::Object(fields)).await
    }
}

pub fn unknown_tool_error(tool: &str) -> ToolError {
    let suggestions = suggest(tool, &catalog::tool_names(), 3);
    if suggestions.is_empty() {
        ToolError::invalid_argument(format!("Unknown tool: {}", tool))
    } else {
        ToolError::invalid_argument(format!(
            "Unknown tool: {}. Did you mean: {}",
            tool,
            suggestions.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_wire_form_is_the_payload_itself() {
        let payload = json!({"ok": true, "items": [1, 2, 3]});
        let result = ToolResult::Success(payload.clone());
        assert_eq!(result.to_value(), payload);
    }

    #[test]
    fn failure_with_status_serializes_both_fields() {
        let result = ToolResult::from(ToolError::upstream_http(404, "GET /x returned HTTP 404"));
        assert_eq!(
            result.to_value(),
            json!({"error": "GET /x returned HTTP 404", "status_code": 404})
        );
    }

    #[test]
    fn failure_without_status_omits_the_key() {
        let result = ToolResult::from(ToolError::transport("HTTP request timed out"));
        let value = result.to_value();
        assert_eq!(value, json!({"error": "HTTP request timed out"}));
        assert!(value.get("status_code").is_none());
    }

    #[test]
    fn unknown_tool_error_suggests_close_names() {
        let message = unknown_tool_error("serch_contracts").to_string();
        assert!(message.contains("Unknown tool: serch_contracts"));
        assert!(message.contains("search_contracts"));
    }
}
