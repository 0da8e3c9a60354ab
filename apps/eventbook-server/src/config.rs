//! Layered configuration: defaults -> YAML file -> `EVENTBOOK__*` env ->
//! CLI overrides.

use std::path::{Path, PathBuf};

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON image path; `None` runs fully in memory.
    pub path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from("eventbook.json")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub secret: String,
    pub token_ttl_minutes: i64,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            secret: "insecure-development-secret".to_owned(),
            token_ttl_minutes: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub enabled: bool,
    pub base_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.open-meteo.com".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridable via
    /// `RUST_LOG`.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub auth: AuthSection,
    pub weather: WeatherConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load the layered configuration. A missing file is fine - defaults
    /// and environment still apply.
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = config_path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed("EVENTBOOK__").split("__"))
            .extract()
            .context("invalid configuration")
    }

    pub fn to_pretty_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("configuration serialization failed")
    }
}

#[cfg(test)]
mod tests {
    use super::AppConfig;
    use std::io::Write;

    #[test]
    fn defaults_without_file() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(config.weather.enabled);
        assert!(config.store.path.is_some());
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  port: 9099\nweather:\n  enabled: false"
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9099);
        assert!(!config.weather.enabled);
        // Untouched sections keep their defaults.
        assert_eq!(config.server.host, "127.0.0.1");
    }
}
