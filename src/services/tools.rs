//! The four registry tools. Each handler turns validated arguments
//! into one `ApiRequest` and hands it to the shared client.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ToolError;
use crate::services::executor::ToolHandler;
use crate::services::sicap::{ApiRequest, SicapClient};

pub struct SearchContracts {
    client: SicapClient,
}

impl SearchContracts {
    pub fn new(client: SicapClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ToolHandler for SearchContracts {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        let request = search_contracts_request(&args)?;
        self.client.execute(&request).await
    }
}

pub struct GetContractDetails {
    client: SicapClient,
}

impl GetContractDetails {
    pub fn new(client: SicapClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ToolHandler for GetContractDetails {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        let request = get_contract_details_request(&args)?;
        self.client.execute(&request).await
    }
}

pub struct GetOrganizations {
    client: SicapClient,
}

impl GetOrganizations {
    pub fn new(client: SicapClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ToolHandler for GetOrganizations {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        let request = get_organizations_request(&args);
        self.client.execute(&request).await
    }
}

pub struct GetStatistics {
    client: SicapClient,
}

impl GetStatistics {
    pub fn new(client: SicapClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ToolHandler for GetStatistics {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        let request = get_statistics_request(&args);
        self.client.execute(&request).await
    }
}

/// The upstream search endpoint takes the term under `q`, not `query`.
fn search_contracts_request(args: &Value) -> Result<ApiRequest, ToolError> {
    let query = require_string(args, "query")?;
    let mut request = ApiRequest::get("/contracts/search");
    request.push_query("q", query);
    push_pagination(&mut request, args);
    Ok(request)
}

fn get_contract_details_request(args: &Value) -> Result<ApiRequest, ToolError> {
    let contract_id = require_string(args, "contract_id")?;
    Ok(ApiRequest::get(format!("/contracts/{}", contract_id)))
}

fn get_organizations_request(args: &Value) -> ApiRequest {
    let mut request = ApiRequest::get("/organizations");
    push_pagination(&mut request, args);
    if let Some(name) = non_empty_string(args, "name") {
        request.push_query("name", name);
    }
    request
}

fn get_statistics_request(args: &Value) -> ApiRequest {
    let mut request = ApiRequest::get("/statistics");
    if let Some(period) = non_empty_string(args, "period") {
        request.push_query("period", period);
    }
    request
}

fn require_string<'a>(args: &'a Value, field: &str) -> Result<&'a str, ToolError> {
    args.get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::invalid_argument(format!("missing required field '{}'", field)))
}

/// Absent and empty optional strings are both left out of the query.
fn non_empty_string<'a>(args: &'a Value, field: &str) -> Option<&'a str> {
    args.get(field).and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}

fn push_pagination(request: &mut ApiRequest, args: &Value) {
    if let Some(limit) = args.get("limit") {
        request.push_query("limit", render_query_value(limit));
    }
    if let Some(offset) = args.get("offset") {
        request.push_query("offset", render_query_value(offset));
    }
}

fn render_query_value(value: &Value) -> String {
    value
        .as_str()
        .map(|s| s.to_string())
        .unwrap_or_else(|| value.to_string())
}
