//! OstrichDB Client Library
//!
//! HTTP client for the OstrichDB REST API, plus a fluent builder chain
//! (project → collection → cluster → record) over the same calls.
//!
//! ```rust,no_run
//! use ostrichdb_rs::{Client, ClientConfig};
//!
//! # async fn run() -> ostrichdb_rs::Result<()> {
//! let client = Client::with_config(ClientConfig::default().with_token("my-jwt"))?;
//!
//! let cluster = client.project("shop").collection("users").cluster("active");
//! cluster.create().await?;
//! cluster.record("alice", "STRING", "admin").create().await?;
//!
//! let raw = client.get_record("shop", "users", "active", "alice").await?;
//! assert_eq!(raw, "alice :STRING: admin");
//! # Ok(())
//! # }
//! ```

mod builders;
mod client;
mod response;

use std::time::Duration;

pub use builders::{ClusterBuilder, CollectionBuilder, ProjectBuilder, RecordBuilder};
pub use client::Client;
pub use ostrichdb_core::endpoint::EndpointError;
pub use ostrichdb_core::{
    ClientConfig, Record, RecordId, RecordType, SearchOptions, SortField, SortOrder,
};
pub use response::HealthCheck;

/// Every failed operation surfaces as a `ClientError`.
///
/// Remote rejections carry the status code and raw body; transport
/// failures (including timeouts) carry neither. `status_text` is the
/// canonical reason phrase for the status code, not the phrase the server
/// sent, so non-standard codes read `Unknown`.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP {status}: {status_text}{}", body_suffix(.body))]
    Server {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("Request failed: timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rejected locally before any request was sent
    #[error(transparent)]
    InvalidIdentifier(#[from] EndpointError),
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" - {body}")
    }
}

impl ClientError {
    /// HTTP status of a remote rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body of a remote rejection
    pub fn body(&self) -> Option<&str> {
        match self {
            ClientError::Server { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout(_))
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
