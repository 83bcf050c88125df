//! Request building, response parsing, and the single-call orchestrator.
//!
//! # Design
//! `SeoClient` holds only the base URL and the precomputed auth header.
//! `build_request` produces an `HttpRequest`, `parse_response` validates the
//! envelope and extracts the payload, and `execute` runs both around a
//! caller-supplied `Transport`, folding every failure into an `Outcome`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::ApiError;
use crate::filter::normalize_body_filters;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::{Outcome, RequestOptions, ResponseMode};
use crate::validate::{validate_condensed, validate_full};

pub const DEFAULT_BASE_URL: &str = "https://api.dataforseo.com";

/// Appended to endpoints to request the condensed envelope.
pub const CONDENSED_SUFFIX: &str = ".ai";

/// `Basic` authorization value for `username:password`. Credentials are
/// encoded verbatim, colons included.
pub fn build_auth_header(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// Synchronous, stateless client for the DataForSEO API.
#[derive(Debug, Clone)]
pub struct SeoClient {
    base_url: String,
    auth_header: String,
}

impl SeoClient {
    pub fn new(base_url: &str, username: &str, password: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header: build_auth_header(username, password),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(DEFAULT_BASE_URL, &config.username, &config.password)
    }

    pub fn build_url(&self, endpoint: &str, full_response: bool, force_full: bool) -> String {
        let mut url = format!("{}{endpoint}", self.base_url);
        if !full_response && !force_full {
            url.push_str(CONDENSED_SUFFIX);
        }
        url
    }

    pub fn build_request(&self, options: &RequestOptions) -> Result<HttpRequest, ApiError> {
        let body = match (options.method, &options.body) {
            (HttpMethod::Post, Some(body)) => {
                let mut payload = body.clone();
                if options.simple_filter {
                    normalize_body_filters(&mut payload);
                }
                if options.wrap_array && payload.is_object() {
                    payload = Value::Array(vec![payload]);
                }
                let encoded = serde_json::to_string(&payload)
                    .map_err(|e| ApiError::SerializationError(e.to_string()))?;
                Some(encoded)
            }
            _ => None,
        };

        Ok(HttpRequest {
            method: options.method,
            url: self.build_url(&options.endpoint, options.full_response, options.force_full),
            headers: vec![
                ("authorization".to_string(), self.auth_header.clone()),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body,
        })
    }

    /// Check the HTTP status, decode the body, validate the envelope for
    /// `mode`, and return the payload: the whole envelope in condensed mode,
    /// `tasks[0].result` in full mode.
    pub fn parse_response(&self, response: HttpResponse, mode: ResponseMode) -> Result<Value, ApiError> {
        if !(200..300).contains(&response.status) {
            return Err(ApiError::HttpError {
                status: response.status,
                body: response.body,
            });
        }
        let mut envelope: Value = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        match mode {
            ResponseMode::Condensed => {
                validate_condensed(&envelope)?;
                Ok(envelope)
            }
            ResponseMode::Full => {
                validate_full(&envelope)?;
                envelope
                    .get_mut("tasks")
                    .and_then(|tasks| tasks.get_mut(0))
                    .and_then(|task| task.get_mut("result"))
                    .map(Value::take)
                    .ok_or_else(|| ApiError::MalformedResponse("first task has no result".to_string()))
            }
        }
    }

    /// Run one request/response cycle and apply `options.fields` to the
    /// result. Never fails: errors become `Outcome::Error`.
    pub fn execute<T>(&self, transport: &T, options: &RequestOptions) -> Outcome
    where
        T: Transport + ?Sized,
    {
        match self.round_trip(transport, options) {
            Ok(result) => {
                let result = match &options.fields {
                    Some(fields) => fields.apply(&result),
                    None => result,
                };
                Outcome::Ok { result }
            }
            Err(err) => {
                debug!(%err, "request failed");
                Outcome::error(err.to_string())
            }
        }
    }

    fn round_trip<T>(&self, transport: &T, options: &RequestOptions) -> Result<Value, ApiError>
    where
        T: Transport + ?Sized,
    {
        let request = self.build_request(options)?;
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        if let Some(body) = &request.body {
            debug!(%body, "request body");
        }
        let response = transport.send(&request)?;
        debug!(status = response.status, "received response");
        self.parse_response(response, options.mode())
    }
}
