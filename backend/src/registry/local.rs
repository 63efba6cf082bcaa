//! In-memory model registry for local development and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::{ErrorContext, RegistryError, RegistryResult};
use super::models::{ModelVersion, Stage};
use super::repository::ModelRegistry;

#[derive(Debug, Default)]
struct RegistryData {
    /// Versions per model, ascending by version number.
    models: HashMap<String, Vec<ModelVersion>>,
}

/// Registry kept entirely in memory.
///
/// Stage transitions take a single write lock, so archiving the previous
/// holder of a stage and promoting the new version are never observed
/// separately.
#[derive(Debug, Clone, Default)]
pub struct LocalRegistry {
    data: Arc<RwLock<RegistryData>>,
}

impl LocalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a version as-is, replacing any version with the same number.
    pub fn insert_version(&self, version: ModelVersion) {
        let mut data = self.data.write();
        let versions = data.models.entry(version.name.clone()).or_default();
        versions.retain(|v| v.version != version.version);
        versions.push(version);
        versions.sort_by_key(|v| v.version);
    }

    pub fn versions(&self, name: &str) -> Vec<ModelVersion> {
        self.data
            .read()
            .models
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    fn not_found(operation: &str, name: &str, version: Option<u64>) -> RegistryError {
        let mut context = ErrorContext::new(operation).with_model(name);
        let message = match version {
            Some(v) => {
                context = context.with_version(v);
                format!("Model '{}' has no version {}", name, v)
            }
            None => format!("Model '{}' is not registered", name),
        };
        RegistryError::not_found(message, context)
    }
}

#[async_trait]
impl ModelRegistry for LocalRegistry {
    async fn health_check(&self) -> RegistryResult<bool> {
        Ok(true)
    }

    async fn get_latest_versions(
        &self,
        name: &str,
        stages: &[Stage],
    ) -> RegistryResult<Vec<ModelVersion>> {
        let data = self.data.read();
        let versions = data
            .models
            .get(name)
            .ok_or_else(|| Self::not_found("get_latest_versions", name, None))?;

        let stages: &[Stage] = if stages.is_empty() { &Stage::ALL } else { stages };
        Ok(stages
            .iter()
            .filter_map(|stage| {
                versions
                    .iter()
                    .filter(|v| v.current_stage == *stage)
                    .max_by_key(|v| v.version)
                    .cloned()
            })
            .collect())
    }

    async fn get_model_version(&self, name: &str, version: u64) -> RegistryResult<ModelVersion> {
        self.data
            .read()
            .models
            .get(name)
            .and_then(|versions| versions.iter().find(|v| v.version == version))
            .cloned()
            .ok_or_else(|| Self::not_found("get_model_version", name, Some(version)))
    }

    async fn transition_model_version_stage(
        &self,
        name: &str,
        version: u64,
        stage: Stage,
        archive_existing: bool,
    ) -> RegistryResult<ModelVersion> {
        let mut data = self.data.write();
        let versions = data
            .models
            .get_mut(name)
            .ok_or_else(|| Self::not_found("transition_stage", name, Some(version)))?;

        let idx = versions
            .iter()
            .position(|v| v.version == version)
            .ok_or_else(|| Self::not_found("transition_stage", name, Some(version)))?;

        let from = versions[idx].current_stage;
        if !from.can_transition_to(stage) {
            return Err(RegistryError::invalid_transition(
                from,
                stage,
                ErrorContext::new("transition_stage")
                    .with_model(name)
                    .with_version(version),
            ));
        }

        if stage == Stage::Production && !archive_existing {
            if let Some(holder) = versions
                .iter()
                .find(|v| v.version != version && v.current_stage == Stage::Production)
            {
                return Err(RegistryError::invalid_transition(
                    from,
                    stage,
                    ErrorContext::new("transition_stage")
                        .with_model(name)
                        .with_version(version)
                        .with_details(format!(
                            "version {} already in Production",
                            holder.version
                        )),
                ));
            }
        }

        if archive_existing && stage != Stage::Archived {
            for other in versions.iter_mut() {
                if other.version != version && other.current_stage == stage {
                    tracing::info!(
                        model = name,
                        version = other.version,
                        from = %stage,
                        "Archiving previous version"
                    );
                    other.current_stage = Stage::Archived;
                }
            }
        }

        versions[idx].current_stage = stage;
        tracing::info!(model = name, version, from = %from, to = %stage, "Transitioned model version");
        Ok(versions[idx].clone())
    }

    async fn get_model_version_download_uri(
        &self,
        name: &str,
        version: u64,
    ) -> RegistryResult<String> {
        let found = self.get_model_version(name, version).await?;
        found.source.ok_or_else(|| {
            RegistryError::not_found(
                format!("Model '{}' version {} has no artifact source", name, version),
                ErrorContext::new("get_download_uri")
                    .with_model(name)
                    .with_version(version),
            )
        })
    }

    async fn create_model_version(
        &self,
        name: &str,
        source: &str,
        run_id: Option<&str>,
    ) -> RegistryResult<ModelVersion> {
        let mut data = self.data.write();
        let versions = data.models.entry(name.to_string()).or_default();
        let next = versions.last().map_or(1, |v| v.version + 1);

        let mut created = ModelVersion::new(name, next).with_source(source);
        if let Some(run_id) = run_id {
            created = created.with_run_id(run_id);
        }
        versions.push(created.clone());
        tracing::debug!(model = name, version = next, "Registered model version");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = "uber_demand_prediction_model";

    async fn seeded() -> LocalRegistry {
        let registry = LocalRegistry::new();
        for i in 1..=3 {
            registry
                .create_model_version(MODEL, &format!("/mlruns/run{}/artifacts/model", i), None)
                .await
                .unwrap();
        }
        registry
    }

    #[tokio::test]
    async fn test_create_numbers_versions() {
        let registry = seeded().await;
        let versions = registry.versions(MODEL);
        let numbers: Vec<u64> = versions.iter().map(|v| v.version).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(versions.iter().all(|v| v.current_stage == Stage::None));
    }

    #[tokio::test]
    async fn test_latest_versions_per_stage() {
        let registry = seeded().await;
        registry
            .transition_model_version_stage(MODEL, 1, Stage::Staging, false)
            .await
            .unwrap();
        registry
            .transition_model_version_stage(MODEL, 2, Stage::Staging, false)
            .await
            .unwrap();

        let latest = registry
            .get_latest_versions(MODEL, &[Stage::Staging, Stage::Production])
            .await
            .unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].version, 2);
    }

    #[tokio::test]
    async fn test_archive_existing_in_same_transition() {
        let registry = seeded().await;
        for v in [1, 2] {
            registry
                .transition_model_version_stage(MODEL, v, Stage::Staging, false)
                .await
                .unwrap();
        }
        registry
            .transition_model_version_stage(MODEL, 1, Stage::Production, true)
            .await
            .unwrap();
        registry
            .transition_model_version_stage(MODEL, 2, Stage::Production, true)
            .await
            .unwrap();

        let production: Vec<u64> = registry
            .versions(MODEL)
            .into_iter()
            .filter(|v| v.current_stage == Stage::Production)
            .map(|v| v.version)
            .collect();
        assert_eq!(production, vec![2]);
        assert_eq!(
            registry.get_model_version(MODEL, 1).await.unwrap().current_stage,
            Stage::Archived
        );
    }

    #[tokio::test]
    async fn test_invalid_transition() {
        let registry = seeded().await;
        let err = registry
            .transition_model_version_stage(MODEL, 1, Stage::Production, true)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidTransition {
                from: Stage::None,
                to: Stage::Production,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_second_production_without_archiving_rejected() {
        let registry = seeded().await;
        for v in [1, 2] {
            registry
                .transition_model_version_stage(MODEL, v, Stage::Staging, false)
                .await
                .unwrap();
        }
        registry
            .transition_model_version_stage(MODEL, 1, Stage::Production, false)
            .await
            .unwrap();
        let err = registry
            .transition_model_version_stage(MODEL, 2, Stage::Production, false)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidTransition { .. }));
        assert_eq!(
            registry.get_model_version(MODEL, 2).await.unwrap().current_stage,
            Stage::Staging
        );
    }

    #[tokio::test]
    async fn test_unknown_model_and_version() {
        let registry = seeded().await;
        assert!(matches!(
            registry.get_model_version(MODEL, 9).await,
            Err(RegistryError::NotFound { .. })
        ));
        assert!(matches!(
            registry.get_latest_versions("missing", &[]).await,
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_download_uri_is_source() {
        let registry = seeded().await;
        let uri = registry.get_model_version_download_uri(MODEL, 2).await.unwrap();
        assert_eq!(uri, "/mlruns/run2/artifacts/model");
    }
}
