//! Stage lookups, promotion and model URI resolution on top of a registry.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::{ErrorContext, RegistryError, RegistryResult};
use super::models::{ModelVersion, Stage};
use super::repository::ModelRegistry;
use crate::artifacts::{
    local_path_for_uri, uri_scheme, ArtifactError, ArtifactStore, LinearRegressor, MODEL_FILE_NAME,
};

/// Where a resolved model lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelLocation {
    /// Directory or `model.json` on the local filesystem.
    Local(PathBuf),
    /// Artifact location only the registry backend can read, e.g.
    /// `mlflow-artifacts:/0/<run>/artifacts/model` or `s3://...`.
    Remote(String),
}

/// Model lifecycle operations shared by the server, the promotion command
/// and the registry health check.
#[derive(Clone)]
pub struct LifecycleManager {
    registry: Arc<dyn ModelRegistry>,
    artifact_root: PathBuf,
}

impl LifecycleManager {
    /// `artifact_root` is the local directory `runs:/` URIs resolve under.
    pub fn new(registry: Arc<dyn ModelRegistry>, artifact_root: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            artifact_root: artifact_root.into(),
        }
    }

    pub fn registry(&self) -> &Arc<dyn ModelRegistry> {
        &self.registry
    }

    pub fn artifact_root(&self) -> &Path {
        &self.artifact_root
    }

    /// Highest version of `name` currently in `stage`.
    pub async fn latest_in_stage(&self, name: &str, stage: Stage) -> RegistryResult<ModelVersion> {
        let versions = match self.registry.get_latest_versions(name, &[stage]).await {
            Ok(versions) => versions,
            Err(RegistryError::NotFound { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };
        versions
            .into_iter()
            .filter(|v| v.current_stage == stage)
            .max_by_key(|v| v.version)
            .ok_or_else(|| RegistryError::no_version_in_stage(name, stage))
    }

    /// Move `version` to `target`, archiving whatever held `target` when
    /// `archive_existing` is set.
    pub async fn promote(
        &self,
        name: &str,
        version: u64,
        target: Stage,
        archive_existing: bool,
    ) -> RegistryResult<ModelVersion> {
        let current = self.registry.get_model_version(name, version).await?;
        if !current.current_stage.can_transition_to(target) {
            return Err(RegistryError::invalid_transition(
                current.current_stage,
                target,
                ErrorContext::new("promote")
                    .with_model(name)
                    .with_version(version),
            ));
        }
        let promoted = self
            .registry
            .transition_model_version_stage(name, version, target, archive_existing)
            .await?;
        tracing::info!(
            model = name,
            version = promoted.version,
            stage = %promoted.current_stage,
            "Promoted model version"
        );
        Ok(promoted)
    }

    /// Promote the newest `from` version to `to`, archiving the previous holder.
    pub async fn promote_latest(&self, name: &str, from: Stage, to: Stage) -> RegistryResult<ModelVersion> {
        let candidate = self.latest_in_stage(name, from).await?;
        self.promote(name, candidate.version, to, true).await
    }

    /// Local filesystem location of a model URI.
    ///
    /// Supports `models:/<name>/<stage|version>`, `runs:/<run_id>/<path>`,
    /// `file://` URIs and plain paths. Models stored remotely are
    /// `UnsupportedUri` here; [`load_model`](Self::load_model) fetches them.
    pub async fn resolve_model_uri(&self, uri: &str) -> RegistryResult<PathBuf> {
        match self.locate_model(uri).await? {
            ModelLocation::Local(path) => Ok(path),
            ModelLocation::Remote(location) => {
                Err(RegistryError::Artifact(ArtifactError::UnsupportedUri(location)))
            }
        }
    }

    /// Resolve `uri` through the registry to a local path or a remote
    /// artifact location.
    pub async fn locate_model(&self, uri: &str) -> RegistryResult<ModelLocation> {
        if let Some(rest) = uri.strip_prefix("models:/") {
            let (name, selector) = rest.trim_matches('/').rsplit_once('/').ok_or_else(|| {
                RegistryError::Artifact(ArtifactError::UnsupportedUri(uri.to_string()))
            })?;
            let version = match selector.parse::<u64>() {
                Ok(version) => version,
                Err(_) => {
                    let stage = selector.parse::<Stage>().map_err(|_| {
                        RegistryError::Artifact(ArtifactError::UnsupportedUri(uri.to_string()))
                    })?;
                    self.latest_in_stage(name, stage).await?.version
                }
            };
            let download = self
                .registry
                .get_model_version_download_uri(name, version)
                .await?;
            if download.starts_with("models:/") {
                return Err(RegistryError::Artifact(ArtifactError::UnsupportedUri(download)));
            }
            tracing::debug!(uri, download = %download, "Resolved registered model");
            return self.locate_artifact(&download);
        }
        self.locate_artifact(uri)
    }

    fn locate_artifact(&self, uri: &str) -> RegistryResult<ModelLocation> {
        if let Some(rest) = uri.strip_prefix("runs:/") {
            let (run_id, path) = rest.trim_start_matches('/').split_once('/').ok_or_else(|| {
                RegistryError::Artifact(ArtifactError::UnsupportedUri(uri.to_string()))
            })?;
            if run_id.is_empty() {
                return Err(RegistryError::Artifact(ArtifactError::UnsupportedUri(
                    uri.to_string(),
                )));
            }
            let path = self.artifact_root.join(run_id).join("artifacts").join(path);
            return Ok(ModelLocation::Local(path));
        }
        match uri_scheme(uri) {
            Some("file") | None => Ok(ModelLocation::Local(local_path_for_uri(uri)?)),
            Some(_) => Ok(ModelLocation::Remote(uri.to_string())),
        }
    }

    /// Resolve `uri` and deserialize the regressor it points at.
    pub async fn load_model(&self, uri: &str) -> RegistryResult<LinearRegressor> {
        match self.locate_model(uri).await? {
            ModelLocation::Local(path) => Ok(ArtifactStore::load_regressor(&path)?),
            ModelLocation::Remote(location) => {
                let bytes = self
                    .registry
                    .download_artifact(&location, MODEL_FILE_NAME)
                    .await?;
                tracing::debug!(location = %location, bytes = bytes.len(), "Downloaded model");
                Ok(ArtifactStore::regressor_from_slice(&bytes, &location)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::LocalRegistry;

    const MODEL: &str = "uber_demand_prediction_model";

    fn manager() -> (LocalRegistry, LifecycleManager) {
        let registry = LocalRegistry::new();
        let manager = LifecycleManager::new(Arc::new(registry.clone()), "/srv/mlruns");
        (registry, manager)
    }

    #[tokio::test]
    async fn test_latest_in_stage_empty() {
        let (_, manager) = manager();
        let err = manager.latest_in_stage(MODEL, Stage::Staging).await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::NoVersionInStage { stage: Stage::Staging, .. }
        ));
    }

    #[tokio::test]
    async fn test_promote_latest_staging() {
        let (registry, manager) = manager();
        registry.insert_version(ModelVersion::new(MODEL, 1).with_stage(Stage::Production));
        registry.insert_version(ModelVersion::new(MODEL, 2).with_stage(Stage::Staging));

        let promoted = manager
            .promote_latest(MODEL, Stage::Staging, Stage::Production)
            .await
            .unwrap();
        assert_eq!(promoted.version, 2);
        assert_eq!(promoted.current_stage, Stage::Production);
        assert_eq!(
            manager.latest_in_stage(MODEL, Stage::Archived).await.unwrap().version,
            1
        );
    }

    #[tokio::test]
    async fn test_promote_rejects_skipping_staging() {
        let (registry, manager) = manager();
        registry.insert_version(ModelVersion::new(MODEL, 1));
        let err = manager
            .promote(MODEL, 1, Stage::Production, true)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_resolve_runs_uri() {
        let (_, manager) = manager();
        let path = manager.resolve_model_uri("runs:/abc123/model").await.unwrap();
        assert_eq!(path, PathBuf::from("/srv/mlruns/abc123/artifacts/model"));
        assert!(manager.resolve_model_uri("runs:/abc123").await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_models_uri_by_stage_and_version() {
        let (registry, manager) = manager();
        registry.insert_version(
            ModelVersion::new(MODEL, 3)
                .with_stage(Stage::Production)
                .with_source("runs:/r3/model"),
        );
        registry.insert_version(ModelVersion::new(MODEL, 4).with_source("file:///models/v4"));

        let by_stage = manager
            .resolve_model_uri(&format!("models:/{}/Production", MODEL))
            .await
            .unwrap();
        assert_eq!(by_stage, PathBuf::from("/srv/mlruns/r3/artifacts/model"));

        let by_version = manager
            .resolve_model_uri(&format!("models:/{}/4", MODEL))
            .await
            .unwrap();
        assert_eq!(by_version, PathBuf::from("/models/v4"));

        assert!(manager
            .resolve_model_uri(&format!("models:/{}/Staging", MODEL))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_remote_source_without_download_support() {
        let (registry, manager) = manager();
        registry.insert_version(
            ModelVersion::new(MODEL, 1)
                .with_stage(Stage::Production)
                .with_source("mlflow-artifacts:/0/abc123/artifacts/model"),
        );
        let uri = format!("models:/{}/Production", MODEL);

        assert_eq!(
            manager.locate_model(&uri).await.unwrap(),
            ModelLocation::Remote("mlflow-artifacts:/0/abc123/artifacts/model".to_string())
        );
        assert!(matches!(
            manager.resolve_model_uri(&uri).await,
            Err(RegistryError::Artifact(ArtifactError::UnsupportedUri(_)))
        ));
        // The in-memory registry stores no artifacts, so loading is refused
        // instead of reading a relative path on disk.
        assert!(matches!(
            manager.load_model(&uri).await,
            Err(RegistryError::Artifact(ArtifactError::UnsupportedUri(_)))
        ));
    }
}
