//! OstrichDB Core Library
//!
//! Shared, I/O-free building blocks used by the client and the test server:
//! - Client configuration
//! - Record model and type vocabulary
//! - Search filter
//! - Endpoint construction with percent-encoded identifiers

pub mod config;
pub mod endpoint;
pub mod models;

// Re-export commonly used types
pub use config::ClientConfig;
pub use models::*;
