//! Synchronous client core for the DataForSEO API.
//!
//! # Overview
//! Builds `HttpRequest` values, validates DataForSEO response envelopes, and
//! post-processes results with dot-notation field projection. The network
//! round-trip is delegated to a `Transport` supplied by the host, so
//! everything here is deterministic and testable.
//!
//! # Design
//! - `SeoClient` is stateless: base URL plus a precomputed auth header.
//! - `SeoClient::execute` is the single request/response cycle and always
//!   returns an `Outcome`; failures never escape as panics.
//! - `projection` and `filter` operate on `serde_json::Value` and never fail.
//! - Configuration is an explicit value (`Config`, `FieldConfig`); nothing is
//!   cached globally.

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod http;
pub mod projection;
pub mod types;
pub mod validate;

pub use client::{build_auth_header, SeoClient, CONDENSED_SUFFIX, DEFAULT_BASE_URL};
pub use config::{parse_flag, Config, FieldConfig};
pub use error::{ApiError, ConfigError};
pub use filter::{normalize, normalize_body_filters};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use projection::{project, FieldPath, FieldSpec, Segment};
pub use types::{Outcome, RequestOptions, ResponseMode};
pub use validate::{validate_condensed, validate_full};
