use thiserror::Error;

/// Error raised while serving a single tool invocation.
///
/// Every variant except `Internal` is converted into an in-band failure
/// payload at the invocation boundary and never surfaces as a protocol
/// fault. `Internal` is reserved for bootstrap and stdio problems that
/// happen outside any invocation.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    /// Arguments rejected before any network activity.
    #[error("{0}")]
    InvalidArgument(String),
    /// Upstream answered with a non-success HTTP status.
    #[error("{message}")]
    UpstreamHttp { status: u16, message: String },
    /// The request never produced an HTTP response (timeout, DNS,
    /// refused connection, TLS failure).
    #[error("{0}")]
    Transport(String),
    /// Upstream answered with a success status but the body was not
    /// valid JSON.
    #[error("{0}")]
    Decode(String),
    /// Fault outside any tool invocation.
    #[error("{0}")]
    Internal(String),
}

impl ToolError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ToolError::InvalidArgument(message.into())
    }

    pub fn upstream_http(status: u16, message: impl Into<String>) -> Self {
        ToolError::UpstreamHttp {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        ToolError::Transport(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        ToolError::Decode(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ToolError::Internal(message.into())
    }

    /// HTTP status carried by the error. Present only when an upstream
    /// response actually arrived.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ToolError::UpstreamHttp { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::Internal(err.to_string())
    }
}
