//! Envelope validation for condensed (`.ai`) and full responses.
//!
//! DataForSEO status codes are five digits (`20000` is success). A code is
//! accepted only when `code / 100` is exactly `200.0` under real division, so
//! `20100` is rejected even though it sits in the 2xx class.

use serde_json::Value;

use crate::error::ApiError;

const UNKNOWN_ERROR: &str = "Unknown error";

fn status_code(envelope: &Value) -> f64 {
    envelope.get("status_code").and_then(Value::as_f64).unwrap_or(0.0)
}

fn status_message(envelope: &Value) -> String {
    envelope
        .get("status_message")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_ERROR)
        .to_string()
}

fn is_success(code: f64) -> bool {
    code / 100.0 == 200.0
}

/// Validate a condensed response envelope.
pub fn validate_condensed(response: &Value) -> Result<(), ApiError> {
    let code = status_code(response);
    if !is_success(code) {
        return Err(ApiError::Status {
            message: status_message(response),
            code,
        });
    }
    Ok(())
}

/// Validate a full response envelope: outer status, non-empty `tasks`, first
/// task status, then `tasks_error`. Stops at the first failing check.
pub fn validate_full(response: &Value) -> Result<(), ApiError> {
    validate_condensed(response)?;

    let task = response
        .get("tasks")
        .and_then(Value::as_array)
        .and_then(|tasks| tasks.first())
        .ok_or(ApiError::NoTasks)?;

    let task_code = status_code(task);
    if !is_success(task_code) {
        return Err(ApiError::TaskStatus {
            message: status_message(task),
            code: task_code,
        });
    }

    let failed = response.get("tasks_error").and_then(Value::as_f64).unwrap_or(0.0);
    if failed != 0.0 {
        return Err(ApiError::TasksFailed(failed));
    }
    Ok(())
}
