//! Request options and the uniform outcome returned to callers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::HttpMethod;
use crate::projection::FieldSpec;

/// Which envelope the API is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// `.ai` endpoints: flat status envelope, payload alongside.
    Condensed,
    /// Plain endpoints: `tasks` array, payload in `tasks[0].result`.
    Full,
}

/// Everything needed for one request/response cycle.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub endpoint: String,
    pub method: HttpMethod,
    pub body: Option<Value>,
    pub full_response: bool,
    /// Set when full mode was requested explicitly for this call.
    pub force_full: bool,
    /// Wrap a mapping body in a one-element array.
    pub wrap_array: bool,
    /// Normalize the body's `filters` before sending.
    pub simple_filter: bool,
    /// Projection applied to a successful result.
    pub fields: Option<FieldSpec>,
}

impl RequestOptions {
    pub fn post(endpoint: &str, body: Option<Value>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            method: HttpMethod::Post,
            body,
            full_response: false,
            force_full: false,
            wrap_array: true,
            simple_filter: false,
            fields: None,
        }
    }

    pub fn get(endpoint: &str) -> Self {
        Self {
            method: HttpMethod::Get,
            ..Self::post(endpoint, None)
        }
    }

    pub fn mode(&self) -> ResponseMode {
        if self.full_response || self.force_full {
            ResponseMode::Full
        } else {
            ResponseMode::Condensed
        }
    }
}

/// Result of one cycle as printed by the CLI:
/// `{"status":"ok","result":...}` or `{"status":"error","message":...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Ok { result: Value },
    Error { message: String },
}

impl Outcome {
    pub fn error(message: impl Into<String>) -> Self {
        Outcome::Error {
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok { .. })
    }

    pub fn result(&self) -> Option<&Value> {
        match self {
            Outcome::Ok { result } => Some(result),
            Outcome::Error { .. } => None,
        }
    }
}
