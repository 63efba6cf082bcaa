//! Application configuration file support.
//!
//! Configuration is read from a TOML file (`demand.toml`) and then
//! overridden by environment variables. Every field has a default, so an
//! empty file is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::artifacts::ArtifactPaths;
use crate::models::SupportedWindow;
use crate::registry::{MlflowConfig, RegistryType};
use crate::services::DEFAULT_NEIGHBORHOOD_REGIONS;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "DEMAND_CONFIG";

const CONFIG_FILE_NAME: &str = "demand.toml";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("No {0} found in standard locations")]
    NotFound(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where the server takes its regressor from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSource {
    /// `models/model.json` under the artifact root.
    #[default]
    Local,
    /// `models:/<model_name>/<stage>` through the configured registry.
    Registry,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub artifacts: ArtifactSettings,
    #[serde(default)]
    pub registry: RegistrySettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSettings {
    /// Project root containing `models/` and `data/`.
    #[serde(default = "default_artifact_root")]
    pub root: PathBuf,
    #[serde(default)]
    pub model_source: ModelSource,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            root: default_artifact_root(),
            model_source: ModelSource::default(),
        }
    }
}

impl ArtifactSettings {
    pub fn paths(&self) -> ArtifactPaths {
        ArtifactPaths::under(&self.root)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySettings {
    #[serde(rename = "type", default = "default_registry_type")]
    pub registry_type: String,
    #[serde(default)]
    pub tracking_uri: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Stage the server loads from in `registry` model-source mode.
    #[serde(default = "default_stage")]
    pub stage: String,
    /// Local directory `runs:/` URIs resolve under.
    #[serde(default = "default_mlruns_root")]
    pub artifact_root: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Run-information record checked after promotion.
    #[serde(default = "default_run_info_path")]
    pub run_info_path: PathBuf,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            registry_type: default_registry_type(),
            tracking_uri: String::new(),
            model_name: default_model_name(),
            stage: default_stage(),
            artifact_root: default_mlruns_root(),
            timeout_secs: default_timeout_secs(),
            run_info_path: default_run_info_path(),
        }
    }
}

impl RegistrySettings {
    pub fn registry_type(&self) -> Result<RegistryType, ConfigError> {
        RegistryType::from_str(&self.registry_type).map_err(ConfigError::Invalid)
    }

    /// MLflow client settings, `None` without a tracking URI.
    pub fn mlflow_config(&self) -> Option<MlflowConfig> {
        if self.tracking_uri.trim().is_empty() {
            return None;
        }
        Some(
            MlflowConfig::new(self.tracking_uri.clone())
                .with_timeout(Duration::from_secs(self.timeout_secs)),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSettings {
    #[serde(default = "default_window_start")]
    pub window_start: String,
    #[serde(default = "default_window_end")]
    pub window_end: String,
    #[serde(default = "default_neighborhood_regions")]
    pub neighborhood_regions: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            window_start: default_window_start(),
            window_end: default_window_end(),
            neighborhood_regions: default_neighborhood_regions(),
        }
    }
}

impl DashboardSettings {
    pub fn window(&self) -> Result<SupportedWindow, ConfigError> {
        let parse = |raw: &str| {
            chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|e| ConfigError::Invalid(format!("bad window date '{}': {}", raw, e)))
        };
        SupportedWindow::new(parse(&self.window_start)?, parse(&self.window_end)?)
            .ok_or_else(|| ConfigError::Invalid("window_start is after window_end".to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_artifact_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_registry_type() -> String {
    "local".to_string()
}

fn default_model_name() -> String {
    "uber_demand_prediction_model".to_string()
}

fn default_stage() -> String {
    "Production".to_string()
}

fn default_mlruns_root() -> PathBuf {
    PathBuf::from("mlruns")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_run_info_path() -> PathBuf {
    PathBuf::from(crate::registry::RUN_INFORMATION_FILE)
}

fn default_window_start() -> String {
    "2016-03-01".to_string()
}

fn default_window_end() -> String {
    "2016-03-31".to_string()
}

fn default_neighborhood_regions() -> usize {
    DEFAULT_NEIGHBORHOOD_REGIONS
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from the default location.
    ///
    /// Uses `DEMAND_CONFIG` when set, otherwise searches for `demand.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(path);
        }

        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("backend").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound(CONFIG_FILE_NAME))
    }

    /// Default-location file if present, defaults otherwise; then the
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::from_default_location() {
            Ok(config) => config,
            Err(ConfigError::NotFound(_)) => {
                tracing::info!("No {} found, using defaults", CONFIG_FILE_NAME);
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `HOST`, `PORT`, `REGISTRY_TYPE` and `MLFLOW_TRACKING_URI`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT '{}' is not a port number", port)))?;
        }
        if let Some(uri) = lookup("MLFLOW_TRACKING_URI") {
            self.registry.tracking_uri = uri;
            if lookup("REGISTRY_TYPE").is_none() {
                self.registry.registry_type = "mlflow".to_string();
            }
        }
        if let Some(kind) = lookup("REGISTRY_TYPE") {
            self.registry.registry_type = kind;
        }
        Ok(())
    }

    /// Check every field that is parsed lazily.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.registry.registry_type()?;
        self.registry
            .stage
            .parse::<crate::registry::Stage>()
            .map_err(ConfigError::Invalid)?;
        self.dashboard.window()?;
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.registry.model_name, "uber_demand_prediction_model");
        assert_eq!(config.dashboard.neighborhood_regions, 9);
        assert_eq!(config.artifacts.model_source, ModelSource::Local);
        assert_eq!(config.dashboard.window().unwrap(), SupportedWindow::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[artifacts]
root = "/srv/demand"
model_source = "registry"

[registry]
type = "mlflow"
tracking_uri = "http://mlflow:5000"
stage = "Staging"
timeout_secs = 5

[dashboard]
window_start = "2016-03-10"
window_end = "2016-03-20"
neighborhood_regions = 5

[server]
port = 3000
"#;
        let config = AppConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.registry.registry_type().unwrap(), RegistryType::Mlflow);
        assert_eq!(config.artifacts.model_source, ModelSource::Registry);
        assert_eq!(
            config.artifacts.paths().scaler,
            PathBuf::from("/srv/demand/models/scaler.json")
        );
        let mlflow = config.registry.mlflow_config().unwrap();
        assert_eq!(mlflow.timeout, Duration::from_secs(5));
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_inverted_window_rejected() {
        let toml = r#"
[dashboard]
window_start = "2016-03-31"
window_end = "2016-03-01"
"#;
        let config = AppConfig::from_toml_str(toml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [("PORT", "9000"), ("MLFLOW_TRACKING_URI", "http://m:5000")]
            .into_iter()
            .collect();
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.registry.registry_type, "mlflow");
        assert!(config.registry.mlflow_config().is_some());
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|key| (key == "PORT").then(|| "http".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(CONFIG_FILE_NAME);
        let config = AppConfig::from_file(&path).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.registry.registry_type().unwrap(), RegistryType::Local);
        assert!(config.registry.mlflow_config().is_none());
    }

    #[test]
    fn test_from_file_missing() {
        let err = AppConfig::from_file("/nonexistent/demand.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
