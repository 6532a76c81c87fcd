pub mod network {
    pub const API_BASE_URL: &str = "https://api.sicap.ai/v1";
    pub const API_BASE_URL_ENV: &str = "SICAP_API_BASE_URL";
    pub const TIMEOUT_API_REQUEST_MS: u64 = 30_000;
    pub const ERROR_BODY_PREVIEW_BYTES: usize = 2_048;
}

pub mod pagination {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const DEFAULT_OFFSET: i64 = 0;
}
