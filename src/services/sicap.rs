use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::constants::network;
use crate::errors::ToolError;

/// One GET against the SICAP API: a path relative to the base URL, the
/// query pairs to append in order, and the round-trip deadline.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub timeout: Duration,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            timeout: Duration::from_millis(network::TIMEOUT_API_REQUEST_MS),
        }
    }

    pub fn push_query(&mut self, key: &str, value: impl Into<String>) {
        self.query.push((key.to_string(), value.into()));
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for the SICAP registry API.
///
/// Cloning shares the underlying connection pool; the client holds no
/// per-invocation state.
#[derive(Debug, Clone)]
pub struct SicapClient {
    client: reqwest::Client,
    base_url: String,
}

impl SicapClient {
    pub fn new(base_url: &str) -> Result<Self, ToolError> {
        let parsed = Url::parse(base_url)
            .map_err(|_| ToolError::internal(format!("invalid SICAP API base URL: {base_url}")))?;
        if !scheme_allowed(parsed.scheme()) {
            return Err(ToolError::internal(
                "only http/https base URLs are supported",
            ));
        }
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|err| ToolError::internal(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_env() -> Result<Self, ToolError> {
        let base = std::env::var(network::API_BASE_URL_ENV)
            .unwrap_or_else(|_| network::API_BASE_URL.to_string());
        Self::new(&base)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Executes the request and normalizes every outcome: the decoded
    /// JSON body on 2xx, an error carrying the status on any other
    /// response, a transport error when no response arrived at all.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Value, ToolError> {
        let url = self.request_url(request)?;
        let response = self
            .client
            .get(url)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let mut message = format!("GET {} returned HTTP {}", request.path, status.as_u16());
            let preview = error_body_preview(response).await;
            if !preview.is_empty() {
                message.push_str(": ");
                message.push_str(&preview);
            }
            return Err(ToolError::upstream_http(status.as_u16(), message));
        }
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&bytes).map_err(|err| {
            ToolError::decode(format!(
                "GET {} returned a body that is not valid JSON: {}",
                request.path, err
            ))
        })
    }

    fn request_url(&self, request: &ApiRequest) -> Result<Url, ToolError> {
        let raw = format!("{}{}", self.base_url, request.path);
        let mut url = Url::parse(&raw)
            .map_err(|_| ToolError::invalid_argument(format!("invalid request URL: {raw}")))?;
        for (key, value) in &request.query {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url)
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ToolError {
    if err.is_timeout() {
        return ToolError::transport("HTTP request timed out");
    }
    ToolError::transport(err.to_string())
}

async fn error_body_preview(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    truncate_preview(body.trim(), network::ERROR_BODY_PREVIEW_BYTES)
}

fn truncate_preview(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

fn scheme_allowed(scheme: &str) -> bool {
    matches!(scheme, "http" | "https")
}
