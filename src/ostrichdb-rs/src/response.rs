//! Interpretation of raw response text.
//!
//! The server answers most calls with plain text. Listing and health
//! endpoints may answer with JSON instead; these helpers try the structured
//! form first and fall back to the plain-text form.

use serde::Deserialize;

/// Result of the `/health` endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum HealthCheck {
    Json(serde_json::Value),
    Text(String),
}

impl HealthCheck {
    pub fn parse(body: &str) -> Self {
        match serde_json::from_str(body) {
            Ok(value) => HealthCheck::Json(value),
            Err(_) => HealthCheck::Text(body.to_string()),
        }
    }

    /// `status` field of a JSON answer, or the trimmed text answer
    pub fn status(&self) -> Option<&str> {
        match self {
            HealthCheck::Json(value) => value.get("status").and_then(|s| s.as_str()),
            HealthCheck::Text(text) => Some(text.trim()),
        }
    }
}

#[derive(Deserialize)]
struct NamedEntry {
    name: String,
}

/// Non-blank lines in response order
pub(crate) fn split_lines(body: &str) -> Vec<String> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Names from a `{"<field>": [{"name": ...}, ...]}` body, otherwise the
/// non-blank lines of the body.
pub(crate) fn parse_name_list(body: &str, field: &str) -> Vec<String> {
    if body.trim().is_empty() {
        return Vec::new();
    }

    let names = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|mut value| value.get_mut(field).map(serde_json::Value::take))
        .and_then(|entries| serde_json::from_value::<Vec<NamedEntry>>(entries).ok());

    match names {
        Some(entries) => entries.into_iter().map(|e| e.name).collect(),
        None => split_lines(body),
    }
}
