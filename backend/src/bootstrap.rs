//! Startup wiring shared by the server and the promotion command.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;

use crate::artifacts::{ArtifactContext, ArtifactStore};
use crate::config::{AppConfig, ModelSource};
use crate::registry::{LifecycleManager, RegistryFactory, Stage};

/// Registry backend and lifecycle manager described by `config`.
pub fn lifecycle_from_config(config: &AppConfig) -> anyhow::Result<LifecycleManager> {
    let registry_type = config.registry.registry_type()?;
    let mlflow = config.registry.mlflow_config();
    let registry = RegistryFactory::create(registry_type, mlflow.as_ref())
        .with_context(|| format!("Failed to create {:?} registry", registry_type))?;
    tracing::info!(registry = ?registry_type, "Model registry initialized");
    Ok(LifecycleManager::new(
        registry,
        config.registry.artifact_root.clone(),
    ))
}

/// Load every artifact, taking the regressor from disk or from the
/// registry according to `artifacts.model_source`.
pub async fn load_artifacts(
    config: &AppConfig,
    lifecycle: &LifecycleManager,
) -> anyhow::Result<Arc<ArtifactContext>> {
    let store = ArtifactStore::new(config.artifacts.paths());
    let context = match config.artifacts.model_source {
        ModelSource::Local => store.load().context("Failed to load artifacts")?,
        ModelSource::Registry => {
            let stage = Stage::from_str(&config.registry.stage).map_err(anyhow::Error::msg)?;
            let uri = format!("models:/{}/{}", config.registry.model_name, stage);
            let regressor = lifecycle
                .load_model(&uri)
                .await
                .with_context(|| format!("Failed to load model {}", uri))?;
            tracing::info!(%uri, "Loaded regressor from registry");
            store
                .load_with_regressor(regressor)
                .context("Failed to load artifacts")?
        }
    };
    Ok(Arc::new(context))
}
