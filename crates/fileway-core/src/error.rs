//! Error types module
//!
//! All failures surfaced by the service are unified under the `AppError`
//! enum. Store- and transport-level errors (`MetaError`, `BlobError`) live
//! in their own crates and convert into `AppError` at the boundary.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented.
/// This trait allows errors to self-describe their HTTP response characteristics.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "NOT_FOUND")
    fn error_code(&self) -> &'static str;

    /// Client-facing message
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The record's current state does not admit the requested operation,
    /// e.g. a transfer against a terminal or already-transferring record.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The blob store rejected the write. Status and body are forwarded
    /// to the caller verbatim.
    #[error("Blob store rejected upload with status {status}")]
    Upstream { status: u16, body: String },

    #[error("Metadata store error: {0}")]
    Meta(String),

    #[error("Blob store error: {0}")]
    Blob(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::BadRequest(_) => 400,
            AppError::Conflict(_) => 409,
            // The blob store's own status is forwarded unchanged.
            AppError::Upstream { status, .. } => *status,
            AppError::Meta(_)
            | AppError::Blob(_)
            | AppError::Internal(_)
            | AppError::InternalWithSource { .. } => 500,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Upstream { .. } => "UPSTREAM_FAILURE",
            AppError::Meta(_) => "METADATA_ERROR",
            AppError::Blob(_) => "BLOB_STORE_ERROR",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "INTERNAL_ERROR",
        }
    }

    fn client_message(&self) -> String {
        match self {
            // Upstream failures forward the remote body unchanged.
            AppError::Upstream { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::NotFound(_) | AppError::BadRequest(_) | AppError::Conflict(_) => {
                LogLevel::Debug
            }
            AppError::Upstream { .. } => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}
