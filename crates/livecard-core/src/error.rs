//! Error taxonomy surfaced by the facade and the bridge.

use crate::kind::FieldError;

/// Errors returned by every activity operation.
///
/// Callers are expected to show the `Display` message; [`ActivityError::code`]
/// exists only for the wire protocol.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActivityError {
    #[error("live activities are not supported on this host")]
    Unsupported,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown activity kind {0:?}")]
    UnknownKind(String),

    #[error("invalid attributes for {kind}: {source}")]
    InvalidAttributes { kind: String, source: FieldError },

    #[error("invalid content for {kind}: {source}")]
    InvalidContent { kind: String, source: FieldError },

    #[error("no live activity with id {0:?}")]
    NotFound(String),

    #[error("host failed to {operation} activity: {message}")]
    HostOperationFailed { operation: String, message: String },
}

impl ActivityError {
    /// Stable snake_case tag for the error variant.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unsupported => "unsupported",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::UnknownKind(_) => "unknown_kind",
            Self::InvalidAttributes { .. } => "invalid_attributes",
            Self::InvalidContent { .. } => "invalid_content",
            Self::NotFound(_) => "not_found",
            Self::HostOperationFailed { .. } => "host_operation_failed",
        }
    }

    /// Wrap a host adapter failure, keeping its full context chain.
    pub(crate) fn host(operation: &str, err: &anyhow::Error) -> Self {
        Self::HostOperationFailed {
            operation: operation.to_string(),
            message: format!("{err:#}"),
        }
    }

    /// Name of the offending field for attribute/content errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidAttributes { source, .. } | Self::InvalidContent { source, .. } => {
                source.field()
            }
            _ => None,
        }
    }
}
