use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TestServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    /// When set, every API request must carry `Authorization: Bearer <token>`
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Directory for rotated JSON log files; console only when unset
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8042
}

fn default_workers() -> usize {
    2
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            token: None,
            workers: default_workers(),
            log_dir: None,
        }
    }
}

impl TestServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: TestServerConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
