//! Model registry trait.
//!
//! The trait covers the subset of the MLflow model registry the service
//! needs: looking up versions, moving them between stages and resolving
//! where their artifacts live.

use async_trait::async_trait;

use super::error::{RegistryError, RegistryResult};
use super::models::{ModelVersion, Stage};
use crate::artifacts::ArtifactError;

/// Registry of versioned models.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to be shared across handlers.
#[async_trait]
pub trait ModelRegistry: Send + Sync {
    /// Whether the registry is reachable.
    async fn health_check(&self) -> RegistryResult<bool>;

    /// Newest version in each of `stages` (all stages when empty).
    ///
    /// # Returns
    /// At most one version per stage, ordered by stage as requested.
    async fn get_latest_versions(
        &self,
        name: &str,
        stages: &[Stage],
    ) -> RegistryResult<Vec<ModelVersion>>;

    async fn get_model_version(&self, name: &str, version: u64) -> RegistryResult<ModelVersion>;

    /// Move `version` to `stage`.
    ///
    /// With `archive_existing`, every other version currently in `stage`
    /// is moved to `Archived` as part of the same operation.
    async fn transition_model_version_stage(
        &self,
        name: &str,
        version: u64,
        stage: Stage,
        archive_existing: bool,
    ) -> RegistryResult<ModelVersion>;

    /// Location the version's artifacts can be downloaded from.
    async fn get_model_version_download_uri(&self, name: &str, version: u64)
        -> RegistryResult<String>;

    /// Register a new version in stage `None`, numbered after the last one.
    async fn create_model_version(
        &self,
        name: &str,
        source: &str,
        run_id: Option<&str>,
    ) -> RegistryResult<ModelVersion>;

    /// Fetch `file` below a remote artifact location returned by
    /// [`get_model_version_download_uri`](Self::get_model_version_download_uri).
    ///
    /// Backends without remote artifact storage reject every location.
    async fn download_artifact(&self, artifact_uri: &str, file: &str) -> RegistryResult<Vec<u8>> {
        let _ = file;
        Err(RegistryError::Artifact(ArtifactError::UnsupportedUri(
            artifact_uri.to_string(),
        )))
    }
}
