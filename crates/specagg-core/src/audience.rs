//! Audience filtering based on the `x-public` and `x-audience` markers

use crate::types::vendor;
use serde_json::Value as JsonValue;

/// Outcome of evaluating an operation against one audience
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inclusion {
    Included,
    /// `x-public` is absent or not exactly `true`
    NotPublic,
    /// Public, but the requested audience is not among the declared ones
    AudienceMismatch { audiences: Vec<String> },
}

impl Inclusion {
    pub fn is_included(&self) -> bool {
        matches!(self, Inclusion::Included)
    }
}

/// Flatten an `x-audience` value into trimmed audience names.
///
/// Accepts a string, a comma-joined string, a sequence of either, or a mix.
/// Anything else yields no audiences.
pub fn normalize_audiences(value: Option<&JsonValue>) -> Vec<String> {
    let mut audiences = Vec::new();
    match value {
        Some(JsonValue::String(s)) => push_split(s, &mut audiences),
        Some(JsonValue::Array(items)) => {
            for item in items {
                if let JsonValue::String(s) = item {
                    push_split(s, &mut audiences);
                }
            }
        }
        _ => {}
    }
    audiences
}

fn push_split(raw: &str, out: &mut Vec<String>) {
    out.extend(
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    );
}

/// Evaluate whether `operation` is published for `audience`
pub fn evaluate(operation: &JsonValue, audience: &str) -> Inclusion {
    let is_public = operation
        .get(vendor::PUBLIC)
        .and_then(JsonValue::as_bool)
        .unwrap_or(false);
    if !is_public {
        return Inclusion::NotPublic;
    }

    let audiences = normalize_audiences(operation.get(vendor::AUDIENCE));
    if audiences.iter().any(|a| a == audience) {
        Inclusion::Included
    } else {
        Inclusion::AudienceMismatch { audiences }
    }
}

/// `true` iff the operation is public and targets `audience`
pub fn include(operation: &JsonValue, audience: &str) -> bool {
    evaluate(operation, audience).is_included()
}
