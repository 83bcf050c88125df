//! Dot-notation field projection over JSON trees.
//!
//! A field specification such as `"items.*.url,items.*.rank,total_count"`
//! selects branches of a response; `project` builds a new tree holding only
//! those branches. `*` fans out over every key or index at its level and
//! `name[0]` is shorthand for `name.0`.
//!
//! Projection never fails. Missing keys, type mismatches and `null`
//! intermediates leave the corresponding output branch out (or as an empty
//! container).

use serde_json::{Map, Value};

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `*`: every key of a mapping or every index of a sequence.
    Wildcard,
    /// A literal mapping key. Bracket indices are stored as their digits
    /// and `[*]` parses as `Wildcard`.
    Key(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw == "*" {
            Segment::Wildcard
        } else {
            Segment::Key(raw.to_string())
        }
    }
}

/// A parsed dot path. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Parse a single trimmed, non-empty field string.
    fn parse(field: &str) -> Self {
        let mut segments = Vec::new();
        for part in field.split('.') {
            match part.split_once('[') {
                Some((base, index)) => {
                    segments.push(Segment::parse(base));
                    segments.push(Segment::parse(index.trim_end_matches(']')));
                }
                None => segments.push(Segment::parse(part)),
            }
        }
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// A list of field paths, usually parsed from a comma-separated string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
    paths: Vec<FieldPath>,
}

impl FieldSpec {
    /// Split on commas, trim, and drop empty entries.
    pub fn parse(spec: &str) -> Self {
        Self::from_paths(spec.split(','))
    }

    /// Build from individual path strings (as stored in a field configuration).
    pub fn from_paths<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = fields
            .into_iter()
            .filter_map(|field| {
                let field = field.as_ref().trim();
                (!field.is_empty()).then(|| FieldPath::parse(field))
            })
            .collect();
        Self { paths }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[FieldPath] {
        &self.paths
    }

    /// Project `data` onto the selected paths. `null` stays `null` and an
    /// empty spec returns `data` unchanged.
    pub fn apply(&self, data: &Value) -> Value {
        if data.is_null() || self.is_empty() {
            return data.clone();
        }
        let mut result = Map::new();
        for path in &self.paths {
            extract(data, &mut result, path.segments());
        }
        Value::Object(result)
    }
}

/// Convenience wrapper: parse `spec` and apply it to `data`.
pub fn project(data: &Value, spec: &str) -> Value {
    FieldSpec::parse(spec).apply(data)
}

fn extract(source: &Value, target: &mut Map<String, Value>, path: &[Segment]) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        match (head, source) {
            (Segment::Wildcard, Value::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    target.insert(index.to_string(), item.clone());
                }
            }
            (Segment::Wildcard, Value::Object(entries)) => {
                for (key, value) in entries {
                    target.insert(key.clone(), value.clone());
                }
            }
            (Segment::Key(key), Value::Object(entries)) => {
                if let Some(value) = entries.get(key) {
                    target.insert(key.clone(), value.clone());
                }
            }
            _ => {}
        }
        return;
    }

    match head {
        Segment::Wildcard => match source {
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    if let Some(slot) = child_object(target, &index.to_string()) {
                        extract(item, slot, rest);
                    }
                }
            }
            Value::Object(entries) => {
                for (key, value) in entries {
                    if let Some(slot) = child_object(target, key) {
                        extract(value, slot, rest);
                    }
                }
            }
            _ => {}
        },
        Segment::Key(key) => {
            let Some(value) = source.as_object().and_then(|entries| entries.get(key)) else {
                return;
            };
            match value {
                Value::Array(items) => extract_items(items, target, key, rest),
                Value::Object(_) => {
                    if let Some(slot) = child_object(target, key) {
                        extract(value, slot, rest);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Descend into an array found under `key`. A leading `*` in `rest` is
/// consumed here; with nothing left after it each item is copied whole.
fn extract_items(items: &[Value], target: &mut Map<String, Value>, key: &str, rest: &[Segment]) {
    let Some(out) = child_array(target, key) else {
        return;
    };
    let remaining = match rest.split_first() {
        Some((Segment::Wildcard, tail)) => tail,
        _ => rest,
    };

    for (index, item) in items.iter().enumerate() {
        while out.len() <= index {
            out.push(Value::Object(Map::new()));
        }
        if remaining.is_empty() {
            out[index] = item.clone();
            continue;
        }
        // A non-wildcard step still walks items positionally, so items that
        // lack the key keep an empty placeholder.
        if !out[index].is_object() {
            out[index] = Value::Object(Map::new());
        }
        if let Value::Object(slot) = &mut out[index] {
            extract(item, slot, remaining);
        }
    }
}

/// Get `target[key]` as a mapping, inserting or replacing as needed.
fn child_object<'a>(target: &'a mut Map<String, Value>, key: &str) -> Option<&'a mut Map<String, Value>> {
    let slot = target
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut()
}

/// Get `target[key]` as a sequence, inserting or replacing as needed.
fn child_array<'a>(target: &'a mut Map<String, Value>, key: &str) -> Option<&'a mut Vec<Value>> {
    let slot = target.entry(key).or_insert_with(|| Value::Array(Vec::new()));
    if !slot.is_array() {
        *slot = Value::Array(Vec::new());
    }
    slot.as_array_mut()
}
