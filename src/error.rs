//! Error types for clangd-ext

use thiserror::Error;

use crate::features::FeatureKind;
use crate::infra::protocol::error_codes;

pub type ExtensionResult<T> = std::result::Result<T, ExtensionError>;

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("{0}")]
    Lsp(#[from] LspError),

    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("reload failed in state {state}: {message}")]
    Reload { state: &'static str, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures of the request/response boundary with the language server.
///
/// Cancellation is deliberately part of this enum: the pipeline layer
/// swallows it, everything else is forwarded verbatim to the caller.
#[derive(Debug, Error)]
pub enum LspError {
    #[error("Server not connected")]
    NotConnected,

    #[error("Request cancelled")]
    RequestCancelled,

    #[error("Server error [{code}]: {message}")]
    ServerError { code: i32, message: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl LspError {
    pub fn error_code(&self) -> i32 {
        match self {
            Self::ServerError { code, .. } => *code,
            Self::NotConnected => error_codes::SERVER_NOT_INITIALIZED,
            Self::RequestCancelled => error_codes::REQUEST_CANCELLED,
            _ => error_codes::INTERNAL_ERROR,
        }
    }

    /// True for a locally-cancelled request or the server's own
    /// RequestCancelled reply. Both are swallowed at the pipeline boundary.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::RequestCancelled)
            || matches!(self, Self::ServerError { code, .. } if *code == error_codes::REQUEST_CANCELLED)
    }
}

impl From<crate::infra::protocol::ResponseError> for LspError {
    fn from(err: crate::infra::protocol::ResponseError) -> Self {
        LspError::ServerError {
            code: err.code,
            message: err.message,
        }
    }
}

/// Wire-format violations in a server payload. Never silently corrected.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("scope index {index} out of range (table has {table_len} entries)")]
    ScopeIndexOutOfRange { index: u16, table_len: usize },

    #[error("scope table entry {index} is empty")]
    EmptyScopeGroup { index: u16 },

    #[error("invalid base64 token payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// A single feature's `dispose()` failed. Logged and isolated by the gate
/// so that sibling disposals still run.
#[derive(Debug, Error)]
#[error("teardown of {feature:?} failed: {message}")]
pub struct TeardownError {
    pub feature: FeatureKind,
    pub message: String,
}

impl TeardownError {
    pub fn new(feature: FeatureKind, message: impl Into<String>) -> Self {
        Self {
            feature,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_error() {
        let err = LspError::RequestCancelled;
        assert!(err.is_cancelled());
        assert_eq!(err.error_code(), -32800);

        let server_cancelled = LspError::ServerError {
            code: -32800,
            message: "cancelled".to_string(),
        };
        assert!(server_cancelled.is_cancelled());
    }

    #[test]
    fn test_server_error_not_cancelled() {
        let err = LspError::ServerError {
            code: -32603,
            message: "internal error".to_string(),
        };
        assert!(!err.is_cancelled());
        assert_eq!(err.error_code(), -32603);
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::ScopeIndexOutOfRange {
            index: 7,
            table_len: 3,
        };
        assert!(err.to_string().contains("7"));
        assert!(err.to_string().contains("3 entries"));
    }
}
