//! Stand-in for the DataForSEO API.
//!
//! Serves `GET`/`POST /v3/{*path}`. Paths ending in `.ai` get the condensed
//! envelope, everything else the full `tasks` envelope. A `fail` path segment
//! yields an application-level error status and `malformed` yields a non-JSON
//! body. Posted bodies are echoed back as `request` (condensed) or the task's
//! `data` (full).

use axum::{
    extract::Path,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

pub const USERNAME: &str = "test";
pub const PASSWORD: &str = "secret";

pub fn app() -> Router {
    Router::new().route("/v3/{*path}", get(handle).post(handle))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Items returned by every successful call.
pub fn sample_items() -> Value {
    json!([
        {"url": "a.com", "rank": 1, "backlinks": 100},
        {"url": "b.com", "rank": 2, "backlinks": 200}
    ])
}

fn authorized(headers: &HeaderMap) -> bool {
    let expected = format!("Basic {}", STANDARD.encode(format!("{USERNAME}:{PASSWORD}")));
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected)
}

async fn handle(Path(path): Path<String>, headers: HeaderMap, body: String) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }

    let (path, condensed) = match path.strip_suffix(".ai") {
        Some(stripped) => (stripped, true),
        None => (path.as_str(), false),
    };
    let segments: Vec<&str> = path.split('/').collect();
    if segments.contains(&"malformed") {
        return (StatusCode::OK, "<html>bad gateway</html>").into_response();
    }

    let request = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    let failing = segments.contains(&"fail");

    let envelope = if condensed {
        condensed_envelope(failing, request)
    } else {
        full_envelope(&segments, failing, request)
    };
    Json(envelope).into_response()
}

fn condensed_envelope(failing: bool, request: Value) -> Value {
    if failing {
        return json!({"status_code": 40000, "status_message": "Bad Request."});
    }
    json!({
        "status_code": 20000,
        "status_message": "Ok.",
        "items_count": 2,
        "items": sample_items(),
        "request": request
    })
}

fn full_envelope(segments: &[&str], failing: bool, request: Value) -> Value {
    let mut path = vec!["v3"];
    path.extend_from_slice(segments);

    let task = if failing {
        json!({
            "id": Uuid::new_v4(),
            "status_code": 40501,
            "status_message": "Invalid Field: 'target'.",
            "path": path,
            "data": request,
            "result": null
        })
    } else {
        json!({
            "id": Uuid::new_v4(),
            "status_code": 20000,
            "status_message": "Ok.",
            "path": path,
            "data": request,
            "result": [{"total_count": 2, "items": sample_items()}]
        })
    };

    let tasks_error = u8::from(failing);
    json!({
        "version": "0.1.20240801",
        "status_code": 20000,
        "status_message": "Ok.",
        "tasks_count": 1,
        "tasks_error": tasks_error,
        "tasks": [task]
    })
}
