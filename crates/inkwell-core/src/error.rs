//! Error types module
//!
//! All failures are unified under the `AppError` enum: configuration problems
//! (fatal at startup), session-store and record-store failures, validation
//! failures, content-transfer failures, chat-platform failures, and internal
//! errors. Each variant knows how it should be presented over HTTP and what
//! the user-facing message is, so handlers never leak internals.

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

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session store error: {0}")]
    SessionStore(String),

    #[error("Record store error: {0}")]
    RecordStore(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Content transfer error: {0}")]
    Transfer(String),

    #[error("Chat platform error: {0}")]
    Chat(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON parsing error: {}", err))
    }
}

impl AppError {
    /// Wrap a session-store backend failure, preserving the cause text.
    pub fn session_store(err: impl std::fmt::Display) -> Self {
        AppError::SessionStore(err.to_string())
    }

    /// Wrap a record-store backend failure, preserving the cause text.
    pub fn record_store(err: impl std::fmt::Display) -> Self {
        AppError::RecordStore(err.to_string())
    }

    /// HTTP status code this error should map to when surfaced over HTTP.
    pub fn http_status_code(&self) -> u16 {
        match self {
            AppError::Config(_) => 500,
            AppError::SessionStore(_) => 500,
            AppError::RecordStore(_) => 500,
            AppError::Validation(_) => 400,
            AppError::Transfer(_) => 502,
            AppError::Chat(_) => 502,
            AppError::NotFound(_) => 404,
            AppError::Unauthorized(_) => 401,
            AppError::Internal(_) | AppError::InternalWithSource { .. } => 500,
        }
    }

    /// Machine-readable error code (e.g. "SESSION_STORE_ERROR").
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIGURATION_ERROR",
            AppError::SessionStore(_) => "SESSION_STORE_ERROR",
            AppError::RecordStore(_) => "RECORD_STORE_ERROR",
            AppError::Validation(_) => "INVALID_INPUT",
            AppError::Transfer(_) => "TRANSFER_ERROR",
            AppError::Chat(_) => "CHAT_PLATFORM_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "INTERNAL_ERROR",
        }
    }

    /// Whether the internal message is safe to show to a client.
    pub fn is_sensitive(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::SessionStore(_)
                | AppError::RecordStore(_)
                | AppError::Internal(_)
                | AppError::InternalWithSource { .. }
        )
    }

    /// Log level for this error.
    pub fn log_level(&self) -> LogLevel {
        match self {
            AppError::Validation(_) | AppError::NotFound(_) | AppError::Unauthorized(_) => {
                LogLevel::Debug
            }
            AppError::Transfer(_) | AppError::Chat(_) => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }

    /// Client-facing message (may differ from the internal error message).
    pub fn client_message(&self) -> String {
        if self.is_sensitive() {
            match self {
                AppError::SessionStore(_) => "Failed to access session storage".to_string(),
                AppError::RecordStore(_) => "Failed to access record storage".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        }
    }
}
