use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for a single client instance.
///
/// Every field has a serde default, so a config file only needs to list
/// what it overrides.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent as `Authorization: Bearer <token>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Hard per-request bound in milliseconds; `0` means the default
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8042".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ClientConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        tracing::debug!(path, base_url = %config.base_url, "Loaded client config");
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn timeout(&self) -> Duration {
        match self.timeout_ms {
            0 => Duration::from_millis(default_timeout_ms()),
            ms => Duration::from_millis(ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8042");
        assert_eq!(config.token, None);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"token":"abc"}"#).unwrap();
        assert_eq!(config.base_url, "http://localhost:8042");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.timeout_ms, 30_000);
    }

    #[test]
    fn test_builder_helpers() {
        let config = ClientConfig::default()
            .with_base_url("https://db.example.com")
            .with_token("t0k3n")
            .with_timeout(Duration::from_millis(1500));
        assert_eq!(config.base_url, "https://db.example.com");
        assert_eq!(config.token.as_deref(), Some("t0k3n"));
        assert_eq!(config.timeout_ms, 1500);
    }

    #[test]
    fn test_zero_timeout_falls_back_to_default() {
        let config: ClientConfig = serde_json::from_str(r#"{"timeout_ms":0}"#).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(30));

        let config = ClientConfig::default().with_timeout(Duration::ZERO);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_huge_timeout_saturates() {
        let config = ClientConfig::default().with_timeout(Duration::MAX);
        assert_eq!(config.timeout_ms, u64::MAX);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"base_url":"http://10.0.0.5:8042","timeout_ms":5000}}"#
        )
        .unwrap();

        let config = ClientConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.base_url, "http://10.0.0.5:8042");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(config.token.is_none());
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(ClientConfig::load("/nonexistent/ostrichdb.json").is_err());
    }
}
