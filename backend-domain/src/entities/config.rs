// Runtime configuration shared with the application layer

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub admin_token: Option<String>,
    pub cors_origins: Vec<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub asset_folder: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            admin_token: None,
            cors_origins: Vec::new(),
            max_body_bytes: 10 * 1024 * 1024,
            request_timeout_seconds: 30,
            asset_folder: "items".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}
