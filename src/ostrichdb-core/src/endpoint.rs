//! Endpoint paths for the OstrichDB REST API.
//!
//! Every identifier is percent-encoded with the same character set as
//! JavaScript's `encodeURIComponent`, so a name can never introduce a path
//! separator or query delimiter. Identifiers that URL parsing would treat as
//! path structure on their own (empty, `.` and `..`) are rejected.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

use crate::models::{RecordId, SearchOptions};

/// Characters left untouched: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const API_PREFIX: &str = "/api/v1";
pub const HEALTH: &str = "/health";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// `.` and `..` are dot-segments even when percent-encoded, and an empty
    /// segment collapses onto the parent listing
    #[error("invalid identifier {0:?}: cannot be used as a path segment")]
    InvalidIdentifier(String),
}

pub type EndpointResult = Result<String, EndpointError>;

pub fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, COMPONENT).to_string()
}

/// Encode one identifier as a path segment
pub fn segment(identifier: &str) -> EndpointResult {
    match identifier {
        "" | "." | ".." => Err(EndpointError::InvalidIdentifier(identifier.to_string())),
        _ => Ok(encode(identifier)),
    }
}

pub fn projects() -> String {
    format!("{API_PREFIX}/projects")
}

pub fn project(project: &str) -> EndpointResult {
    Ok(format!("{}/{}", projects(), segment(project)?))
}

pub fn collections(project_name: &str) -> EndpointResult {
    Ok(format!("{}/collections", project(project_name)?))
}

pub fn collection(project: &str, collection: &str) -> EndpointResult {
    Ok(format!("{}/{}", collections(project)?, segment(collection)?))
}

pub fn clusters(project: &str, collection_name: &str) -> EndpointResult {
    Ok(format!("{}/clusters", collection(project, collection_name)?))
}

pub fn cluster(project: &str, collection: &str, cluster: &str) -> EndpointResult {
    Ok(format!("{}/{}", clusters(project, collection)?, segment(cluster)?))
}

pub fn records(project: &str, collection: &str, cluster_name: &str) -> EndpointResult {
    Ok(format!("{}/records", cluster(project, collection, cluster_name)?))
}

pub fn record(project: &str, collection: &str, cluster: &str, record: &RecordId) -> EndpointResult {
    Ok(format!(
        "{}/{}",
        records(project, collection, cluster)?,
        segment(&record.to_string())?
    ))
}

/// Record creation carries the type tag (upper-cased) and value as query
/// parameters rather than a body.
pub fn create_record(
    project: &str,
    collection: &str,
    cluster: &str,
    name: &str,
    record_type: &str,
    value: &str,
) -> EndpointResult {
    let query = form_encode(&[("type", record_type.to_uppercase().as_str()), ("value", value)]);
    Ok(format!(
        "{}/{}?{}",
        records(project, collection, cluster)?,
        segment(name)?,
        query
    ))
}

/// Record listing narrowed by a search filter. Without any present filter
/// field this is identical to [`records`].
pub fn search_records(
    project: &str,
    collection: &str,
    cluster: &str,
    options: &SearchOptions,
) -> EndpointResult {
    let base = records(project, collection, cluster)?;
    let query = options.to_query_string();
    if query.is_empty() {
        Ok(base)
    } else {
        Ok(format!("{base}?{query}"))
    }
}

fn form_encode(pairs: &[(&str, &str)]) -> String {
    // Encoding a slice of string pairs cannot fail
    serde_urlencoded::to_string(pairs).unwrap_or_default()
}
