//! Error types for the DataForSEO client.
//!
//! # Design
//! `ApiError` covers everything that can go wrong during one request/response
//! cycle. The orchestrator never surfaces it as a panic or a partial result:
//! it is rendered into an error `Outcome`. `ConfigError` is separate because
//! it is fatal and reported before any network activity.

use thiserror::Error;

/// Errors produced while building, sending, or interpreting a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection-level failure reported by the transport.
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-2xx HTTP status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body was not the JSON the envelope requires.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The envelope's own `status_code` is not a success code.
    #[error("API Error: {message} (Code: {code})")]
    Status { message: String, code: f64 },

    /// The first task's `status_code` is not a success code.
    #[error("Task Error: {message} (Code: {code})")]
    TaskStatus { message: String, code: f64 },

    #[error("No tasks in response")]
    NoTasks,

    /// `tasks_error` reported failed tasks.
    #[error("Tasks Error: {0} tasks failed")]
    TasksFailed(f64),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    /// Numeric status code carried by the error, when there is one.
    pub fn status_code(&self) -> Option<f64> {
        match self {
            ApiError::HttpError { status, .. } => Some(f64::from(*status)),
            ApiError::Status { code, .. } | ApiError::TaskStatus { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Fatal configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DATAFORSEO_USERNAME and DATAFORSEO_PASSWORD must be set")]
    MissingCredentials,
}
