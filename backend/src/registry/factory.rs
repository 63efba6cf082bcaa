//! Registry factory for dependency injection.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::error::{RegistryError, RegistryResult};
use super::local::LocalRegistry;
#[cfg(feature = "mlflow-registry")]
use super::mlflow::MlflowRegistry;
use super::repository::ModelRegistry;

/// Registry backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryType {
    /// MLflow tracking server over REST
    Mlflow,
    /// In-memory registry
    Local,
}

impl FromStr for RegistryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mlflow" => Ok(Self::Mlflow),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown registry type: {}", s)),
        }
    }
}

/// MLflow client settings.
#[derive(Debug, Clone)]
pub struct MlflowConfig {
    /// Tracking server base URL, e.g. `http://localhost:5000`.
    pub tracking_uri: String,
    pub timeout: Duration,
}

impl MlflowConfig {
    pub fn new(tracking_uri: impl Into<String>) -> Self {
        Self {
            tracking_uri: tracking_uri.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Creates registry instances from runtime configuration.
pub struct RegistryFactory;

impl RegistryFactory {
    pub fn create(
        registry_type: RegistryType,
        mlflow_config: Option<&MlflowConfig>,
    ) -> RegistryResult<Arc<dyn ModelRegistry>> {
        match registry_type {
            RegistryType::Mlflow => {
                #[cfg(feature = "mlflow-registry")]
                {
                    let config = mlflow_config.ok_or_else(|| {
                        RegistryError::configuration("MLflow registry requires a tracking URI")
                    })?;
                    Ok(Arc::new(MlflowRegistry::new(config.clone())?))
                }
                #[cfg(not(feature = "mlflow-registry"))]
                {
                    let _ = mlflow_config;
                    Err(RegistryError::configuration(
                        "MLflow registry feature not enabled",
                    ))
                }
            }
            RegistryType::Local => Ok(Self::create_local()),
        }
    }

    pub fn create_local() -> Arc<dyn ModelRegistry> {
        Arc::new(LocalRegistry::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_type_from_str() {
        assert_eq!("MLflow".parse::<RegistryType>().unwrap(), RegistryType::Mlflow);
        assert_eq!("local".parse::<RegistryType>().unwrap(), RegistryType::Local);
        assert!("postgres".parse::<RegistryType>().is_err());
        assert!("".parse::<RegistryType>().is_err());
    }

    #[test]
    fn test_mlflow_requires_config() {
        assert!(RegistryFactory::create(RegistryType::Mlflow, None).is_err());
    }

    #[tokio::test]
    async fn test_create_local_is_healthy() {
        let registry = RegistryFactory::create(RegistryType::Local, None).unwrap();
        assert!(registry.health_check().await.unwrap());
    }
}
