use crate::extractor::ParseFailure;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// No usable credential, missing endpoint or unknown provider.
    Configuration(String),
    /// Bad request error (invalid input).
    BadRequest(String),
    /// Network failure talking to a provider.
    ExternalApiError(String),
    /// Provider answered with a non-success HTTP status.
    Upstream {
        /// Provider that answered.
        provider: String,
        /// Upstream HTTP status code.
        status: u16,
        /// Upstream response body.
        body: String,
    },
    /// Provider did not answer within the allowed time.
    GatewayTimeout(String),
    /// A chat provider answered without a parseable JSON object.
    ParseFailure(ParseFailure),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// Maps a `reqwest` failure, turning client timeouts into `GatewayTimeout`.
    pub fn from_transport(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::GatewayTimeout(format!("{} API timeout", provider))
        } else {
            AppError::ExternalApiError(format!("{} request failed: {}", provider, err))
        }
    }

    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Configuration(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ExternalApiError(_) | AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::ParseFailure(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::WithContext { source, .. } => source.status_code(),
        }
    }
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Configuration(msg) => write!(f, "{}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::Upstream {
                provider,
                status,
                body,
            } => write!(f, "{} API error (status {}): {}", provider, status, body),
            AppError::GatewayTimeout(msg) => write!(f, "{}", msg),
            AppError::ParseFailure(failure) => {
                write!(f, "Failed to parse provider response: {}", failure)
            }
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Client-class errors are logged at warn, upstream and server errors at error.
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("{} -> {}", status, message);
        } else {
            tracing::warn!("{} -> {}", status, message);
        }

        // `detail` mirrors `error` for older clients that read only `detail`.
        let body = Json(json!({
            "error": message,
            "detail": message,
        }));

        (status, body).into_response()
    }
}

impl From<ParseFailure> for AppError {
    fn from(failure: ParseFailure) -> Self {
        AppError::ParseFailure(failure)
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}
