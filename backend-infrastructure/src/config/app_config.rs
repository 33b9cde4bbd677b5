use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{normalize_optional_text, RuntimeConfig, StoreBackend, StoreConfig};

use crate::config::validation::{validate_bind_addr, validate_http_url, validate_positive};
use crate::services::{CloudinarySettings, FirebaseSettings, GeocoderSettings};

pub const CONFIG_PATH_ENV: &str = "TRADEPOST_CONFIG";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub admin_token: Option<String>,
    pub cors_origins: Vec<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub firebase_project_id: Option<String>,
    pub firebase_api_key: Option<String>,
    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_api_key: Option<String>,
    pub cloudinary_api_secret: Option<String>,
    pub asset_folder: String,
    pub geocoder_url: String,
    pub geocoder_user_agent: String,
    pub geocode_timeout_seconds: u64,
    pub log_dir: Option<String>,
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            bind_addr: runtime.bind_addr,
            admin_token: None,
            cors_origins: Vec::new(),
            max_body_bytes: runtime.max_body_bytes,
            request_timeout_seconds: runtime.request_timeout_seconds,
            store: StoreBackend::Memory,
            database_url: None,
            database_max_connections: 5,
            firebase_project_id: None,
            firebase_api_key: None,
            cloudinary_cloud_name: None,
            cloudinary_api_key: None,
            cloudinary_api_secret: None,
            asset_folder: runtime.asset_folder,
            geocoder_url: "https://nominatim.openstreetmap.org/search".to_string(),
            geocoder_user_agent: "tradepost-backend".to_string(),
            geocode_timeout_seconds: 10,
            log_dir: None,
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Reads the TOML file (`path`, else `TRADEPOST_CONFIG`, else
    /// `./config.toml`), then applies `TRADEPOST_*` overrides.
    pub async fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = path
            .or_else(|| env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("./config.toml"));
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path).await?;
            toml::from_str::<AppConfig>(&content)
                .map_err(|err| anyhow!("invalid config {}: {}", path.display(), err))?
        } else {
            warn!("{} not found, using defaults", path.display());
            AppConfig::default()
        };
        config.apply_overrides(|key| env::var(key).ok());
        config.resolve_paths(path.parent());
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.admin_token = normalize_optional_text(self.admin_token.take());
        self.database_url = normalize_optional_text(self.database_url.take());
        self.firebase_project_id = normalize_optional_text(self.firebase_project_id.take());
        self.firebase_api_key = normalize_optional_text(self.firebase_api_key.take());
        self.cloudinary_cloud_name = normalize_optional_text(self.cloudinary_cloud_name.take());
        self.cloudinary_api_key = normalize_optional_text(self.cloudinary_api_key.take());
        self.cloudinary_api_secret = normalize_optional_text(self.cloudinary_api_secret.take());
        self.log_dir = normalize_optional_text(self.log_dir.take());
        self.cors_origins = normalize_list(std::mem::take(&mut self.cors_origins));
        let folder = self.asset_folder.trim().trim_matches('/').to_string();
        self.asset_folder = if folder.is_empty() {
            RuntimeConfig::default().asset_folder
        } else {
            folder
        };
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        if let Some(dir) = &self.log_dir {
            self.log_dir = Some(resolve_path(base, dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_bind_addr(&self.bind_addr)?;
        validate_positive("max_body_bytes", self.max_body_bytes)?;
        validate_positive("request_timeout_seconds", self.request_timeout_seconds)?;
        validate_positive("geocode_timeout_seconds", self.geocode_timeout_seconds)?;
        validate_http_url("geocoder_url", &self.geocoder_url)?;
        if self.store == StoreBackend::Postgres && self.database_url.is_none() {
            return Err(anyhow!("store = \"postgres\" requires database_url"));
        }
        if self.database_max_connections == 0 {
            return Err(anyhow!("database_max_connections must be greater than 0"));
        }
        if self.admin_token.is_none() {
            warn!("admin_token not set, admin endpoints are open");
        }
        if self.firebase_project_id.is_none() {
            warn!("firebase_project_id not set, bearer tokens will be rejected");
        }
        if self.cloudinary_cloud_name.is_none() {
            warn!("cloudinary credentials not set, image uploads will fail");
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            admin_token: self.admin_token.clone(),
            cors_origins: self.cors_origins.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            asset_folder: self.asset_folder.clone(),
        }
    }

    pub fn to_store_config(&self) -> StoreConfig {
        StoreConfig {
            backend: self.store,
            database_url: self.database_url.clone(),
            max_connections: self.database_max_connections,
        }
    }

    pub fn to_firebase_settings(&self) -> FirebaseSettings {
        FirebaseSettings {
            project_id: self.firebase_project_id.clone(),
            api_key: self.firebase_api_key.clone(),
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn to_cloudinary_settings(&self) -> CloudinarySettings {
        CloudinarySettings {
            cloud_name: self.cloudinary_cloud_name.clone(),
            api_key: self.cloudinary_api_key.clone(),
            api_secret: self.cloudinary_api_secret.clone(),
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn to_geocoder_settings(&self) -> GeocoderSettings {
        GeocoderSettings {
            url: self.geocoder_url.clone(),
            user_agent: self.geocoder_user_agent.clone(),
            timeout_seconds: self.geocode_timeout_seconds,
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("TRADEPOST_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = lookup("TRADEPOST_ADMIN_TOKEN") {
            self.admin_token = Some(value);
        }
        if let Some(value) = lookup("TRADEPOST_CORS_ORIGINS") {
            self.cors_origins = parse_env_list(&value);
        }
        if let Some(value) = lookup("TRADEPOST_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Some(value) = lookup("TRADEPOST_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Some(value) = lookup("TRADEPOST_STORE") {
            match value.trim().to_lowercase().as_str() {
                "memory" => self.store = StoreBackend::Memory,
                "postgres" => self.store = StoreBackend::Postgres,
                other => warn!("ignoring unknown TRADEPOST_STORE '{}'", other),
            }
        }
        if let Some(value) = lookup("TRADEPOST_DATABASE_URL") {
            self.database_url = Some(value);
        }
        if let Some(value) = lookup("TRADEPOST_DATABASE_MAX_CONNECTIONS") {
            self.database_max_connections =
                value.parse().unwrap_or(self.database_max_connections);
        }
        if let Some(value) = lookup("TRADEPOST_FIREBASE_PROJECT_ID") {
            self.firebase_project_id = Some(value);
        }
        if let Some(value) = lookup("TRADEPOST_FIREBASE_API_KEY") {
            self.firebase_api_key = Some(value);
        }
        if let Some(value) = lookup("TRADEPOST_CLOUDINARY_CLOUD_NAME") {
            self.cloudinary_cloud_name = Some(value);
        }
        if let Some(value) = lookup("TRADEPOST_CLOUDINARY_API_KEY") {
            self.cloudinary_api_key = Some(value);
        }
        if let Some(value) = lookup("TRADEPOST_CLOUDINARY_API_SECRET") {
            self.cloudinary_api_secret = Some(value);
        }
        if let Some(value) = lookup("TRADEPOST_ASSET_FOLDER") {
            self.asset_folder = value;
        }
        if let Some(value) = lookup("TRADEPOST_GEOCODER_URL") {
            self.geocoder_url = value;
        }
        if let Some(value) = lookup("TRADEPOST_GEOCODER_USER_AGENT") {
            self.geocoder_user_agent = value;
        }
        if let Some(value) = lookup("TRADEPOST_GEOCODE_TIMEOUT_SECONDS") {
            self.geocode_timeout_seconds = value.parse().unwrap_or(self.geocode_timeout_seconds);
        }
        if let Some(value) = lookup("TRADEPOST_LOG_DIR") {
            self.log_dir = Some(value);
        }
        if let Some(value) = lookup("TRADEPOST_LOG_JSON") {
            self.log_json = value.parse().unwrap_or(self.log_json);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

fn parse_env_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn normalize_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = values
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            bind_addr = "0.0.0.0:9000"
            store = "postgres"
            database_url = "postgres://localhost/tradepost"
            "#,
        )
        .expect("parse");
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.store, StoreBackend::Postgres);
        assert_eq!(config.geocode_timeout_seconds, 10);
        assert_eq!(config.asset_folder, "items");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        let env = HashMap::from([
            ("TRADEPOST_ADMIN_TOKEN", "secret"),
            ("TRADEPOST_CORS_ORIGINS", "https://a.example, ,https://b.example"),
            ("TRADEPOST_GEOCODE_TIMEOUT_SECONDS", "not-a-number"),
            ("TRADEPOST_STORE", "POSTGRES"),
        ]);
        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|value| value.to_string()));
        config.normalize();
        assert_eq!(config.admin_token.as_deref(), Some("secret"));
        assert_eq!(config.cors_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(config.geocode_timeout_seconds, 10);
        assert_eq!(config.store, StoreBackend::Postgres);
    }

    #[test]
    fn blank_strings_normalize_to_none() {
        let mut config = AppConfig {
            admin_token: Some("  ".to_string()),
            firebase_project_id: Some("".to_string()),
            asset_folder: "/".to_string(),
            ..AppConfig::default()
        };
        config.normalize();
        assert!(config.admin_token.is_none());
        assert!(config.firebase_project_id.is_none());
        assert_eq!(config.asset_folder, "items");
    }

    #[test]
    fn postgres_without_url_is_rejected() {
        let config = AppConfig {
            store: StoreBackend::Postgres,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
