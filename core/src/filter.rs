//! Structural normalization of filter expressions.
//!
//! Filters arrive as nested arrays such as
//! `[["rank", "<", 10], "and", ["url", "like", "%blog%"]]`. Callers sometimes
//! wrap a triple once too often (`[[["rank", "<", 10]]]`); `normalize` removes
//! that redundant level. Operators and field names are never inspected.

use serde_json::Value;

/// Replace every element that is a one-element array holding an array with
/// the normalized inner array. Non-arrays, including `null`, pass through.
pub fn normalize(expr: Value) -> Value {
    match expr {
        Value::Array(elements) => Value::Array(elements.into_iter().map(unwrap_single).collect()),
        other => other,
    }
}

fn unwrap_single(element: Value) -> Value {
    match element {
        Value::Array(inner) if matches!(inner.as_slice(), [Value::Array(_)]) => {
            inner.into_iter().next().map(normalize).unwrap_or_default()
        }
        other => other,
    }
}

/// Normalize the `filters` entry of a request body. Handles both a bare task
/// object and an array of task objects.
pub fn normalize_body_filters(body: &mut Value) {
    match body {
        Value::Object(task) => normalize_task_filters(task),
        Value::Array(tasks) => {
            for task in tasks.iter_mut() {
                if let Value::Object(task) = task {
                    normalize_task_filters(task);
                }
            }
        }
        _ => {}
    }
}

fn normalize_task_filters(task: &mut serde_json::Map<String, Value>) {
    if let Some(filters) = task.get_mut("filters") {
        *filters = normalize(filters.take());
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn null_passes_through() {
        assert_eq!(normalize(Value::Null), Value::Null);
    }

    #[test]
    fn empty_passes_through() {
        assert_eq!(normalize(json!([])), json!([]));
    }

    #[test]
    fn scalar_passes_through() {
        assert_eq!(normalize(json!("rank")), json!("rank"));
    }

    #[test]
    fn flat_filter_unchanged() {
        let filters = json!(["field", "op", "val"]);
        assert_eq!(normalize(filters.clone()), filters);
    }

    #[test]
    fn singly_nested_triple_unchanged() {
        let filters = json!([["field", "op", "val"]]);
        assert_eq!(normalize(filters.clone()), filters);
    }

    #[test]
    fn compound_filters_unchanged() {
        let and = json!([["f1", "=", "v1"], "and", ["f2", "=", "v2"]]);
        let or = json!([["f1", "=", "v1"], "or", ["f2", "=", "v2"]]);
        assert_eq!(normalize(and.clone()), and);
        assert_eq!(normalize(or.clone()), or);
    }

    #[test]
    fn doubly_nested_triple_unwrapped_once() {
        assert_eq!(normalize(json!([[["f", "=", "v"]]])), json!([["f", "=", "v"]]));
    }

    #[test]
    fn mixed_nesting_partially_unwrapped() {
        let filters = json!([[["f1", "=", "v1"]], "and", ["f2", "=", "v2"]]);
        assert_eq!(
            normalize(filters),
            json!([["f1", "=", "v1"], "and", ["f2", "=", "v2"]])
        );
    }

    #[test]
    fn unwrap_recurses_into_member() {
        // The member's own elements are normalized too.
        let filters = json!([[[[["a", "=", 1]], "or", ["b", "=", 2]]]]);
        assert_eq!(normalize(filters), json!([[["a", "=", 1], "or", ["b", "=", 2]]]));
    }

    #[test]
    fn single_scalar_member_untouched() {
        let filters = json!([["only"], "and", ["x", ">", 1]]);
        assert_eq!(normalize(filters.clone()), filters);
    }

    #[test]
    fn body_filters_normalized_in_wrapped_tasks() {
        let mut body = json!([
            {"target": "example.com", "filters": [[["rank", "<", 10]]]},
            {"target": "other.com"}
        ]);
        normalize_body_filters(&mut body);
        assert_eq!(body[0]["filters"], json!([["rank", "<", 10]]));
        assert!(body[1].get("filters").is_none());
    }

    #[test]
    fn body_filters_normalized_in_bare_task() {
        let mut body = json!({"filters": [[["rank", "<", 10]]], "limit": 5});
        normalize_body_filters(&mut body);
        assert_eq!(body, json!({"filters": [["rank", "<", 10]], "limit": 5}));
    }
}
