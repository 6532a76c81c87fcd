use crate::errors::ToolError;
use crate::mcp::catalog::tool_catalog;
use crate::services::executor::{ToolExecutor, ToolHandler};
use crate::services::logger::Logger;
use crate::services::sicap::SicapClient;
use crate::services::tools::{
    GetContractDetails, GetOrganizations, GetStatistics, SearchContracts,
};
use std::collections::HashMap;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub executor: Arc<ToolExecutor>,
}

impl App {
    pub fn initialize() -> Result<Self, ToolError> {
        Self::with_client(SicapClient::from_env()?)
    }

    /// Wires every catalog tool to a handler around the given client.
    pub fn with_client(client: SicapClient) -> Result<Self, ToolError> {
        let logger = Logger::new("sicap-mcp");
        let base_url = client.base_url().to_string();

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        handlers.insert(
            "search_contracts".to_string(),
            Arc::new(SearchContracts::new(client.clone())),
        );
        handlers.insert(
            "get_contract_details".to_string(),
            Arc::new(GetContractDetails::new(client.clone())),
        );
        handlers.insert(
            "get_organizations".to_string(),
            Arc::new(GetOrganizations::new(client.clone())),
        );
        handlers.insert(
            "get_statistics".to_string(),
            Arc::new(GetStatistics::new(client)),
        );

        let executor = ToolExecutor::new(logger.clone(), handlers);
        Self::validate_tool_wiring(&executor)?;
        logger.info(
            "initialized",
            Some(&serde_json::json!({
                "tools": tool_catalog().len(),
                "base_url": base_url,
            })),
        );
        Ok(Self {
            logger,
            executor: Arc::new(executor),
        })
    }

    fn validate_tool_wiring(executor: &ToolExecutor) -> Result<(), ToolError> {
        let mut missing = Vec::new();
        for tool in tool_catalog() {
            if !executor.has_handler(tool.name) {
                missing.push(tool.name);
            }
        }
        if missing.is_empty() {
            return Ok(());
        }
        Err(ToolError::internal(format!(
            "tool wiring is incomplete, no handler for: {}",
            missing.join(", ")
        )))
    }
}
