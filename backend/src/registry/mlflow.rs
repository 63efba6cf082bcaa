//! MLflow model registry client over the REST 2.0 API.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::{ErrorContext, RegistryError, RegistryResult};
use super::factory::MlflowConfig;
use super::models::{ModelVersion, Stage};
use super::repository::ModelRegistry;
use crate::artifacts::ArtifactError;

const API_PREFIX: &str = "api/2.0/mlflow";
/// Artifact proxy serving `mlflow-artifacts:` locations.
const ARTIFACTS_PREFIX: &str = "api/2.0/mlflow-artifacts/artifacts";

/// Registry backed by an MLflow tracking server.
///
/// Requests are sent once; failures are reported, never retried.
#[derive(Debug, Clone)]
pub struct MlflowRegistry {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct WireModelVersion {
    name: String,
    version: String,
    #[serde(default)]
    current_stage: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    run_id: Option<String>,
}

impl WireModelVersion {
    fn into_model_version(self, operation: &str) -> RegistryResult<ModelVersion> {
        let context = || {
            ErrorContext::new(operation)
                .with_model(self.name.clone())
                .with_version(self.version.clone())
        };
        let version = self.version.parse::<u64>().map_err(|_| {
            RegistryError::query(format!("Invalid version number '{}'", self.version), context())
        })?;
        let current_stage = match self.current_stage.as_deref() {
            None | Some("") => Stage::None,
            Some(raw) => raw
                .parse::<Stage>()
                .map_err(|e| RegistryError::query(e, context()))?,
        };
        Ok(ModelVersion {
            name: self.name,
            version,
            current_stage,
            source: self.source.filter(|s| !s.is_empty()),
            run_id: self.run_id.filter(|s| !s.is_empty()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct LatestVersionsResponse {
    #[serde(default)]
    model_versions: Vec<WireModelVersion>,
}

#[derive(Debug, Deserialize)]
struct ModelVersionResponse {
    model_version: WireModelVersion,
}

#[derive(Debug, Deserialize)]
struct DownloadUriResponse {
    artifact_uri: String,
}

#[derive(Debug, Deserialize)]
struct MlflowErrorBody {
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
struct LatestVersionsRequest<'a> {
    name: &'a str,
    stages: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct TransitionRequest<'a> {
    name: &'a str,
    version: String,
    stage: &'static str,
    archive_existing_versions: bool,
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    name: &'a str,
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    run_id: Option<&'a str>,
}

/// Path below the artifact proxy for `mlflow-artifacts:/<path>` and
/// `mlflow-artifacts://<host>/<path>` locations.
fn proxied_artifact_path(uri: &str) -> Option<&str> {
    let rest = uri.strip_prefix("mlflow-artifacts:")?;
    let path = match rest.strip_prefix("//") {
        Some(authority_and_path) => authority_and_path.split_once('/').map_or("", |(_, p)| p),
        None => rest,
    };
    let path = path.trim_matches('/');
    (!path.is_empty()).then_some(path)
}

impl MlflowRegistry {
    pub fn new(config: MlflowConfig) -> RegistryResult<Self> {
        let base_url = config.tracking_uri.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(RegistryError::configuration(
                "MLflow registry requires a tracking URI",
            ));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RegistryError::configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, API_PREFIX, path)
    }

    async fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
        context: ErrorContext,
    ) -> RegistryResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        tracing::debug!(%method, %url, "MLflow request");

        let mut request = self.client.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RegistryError::connection(format!("Request to {} failed: {}", url, e), context.clone()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RegistryError::connection(format!("Failed to read response: {}", e), context.clone()))?;

        if !status.is_success() {
            return Err(Self::error_from_response(status, &text, context));
        }

        serde_json::from_str(&text).map_err(|e| {
            RegistryError::query(format!("Unexpected response body: {}", e), context)
        })
    }

    fn error_from_response(status: StatusCode, body: &str, context: ErrorContext) -> RegistryError {
        let parsed: Option<MlflowErrorBody> = serde_json::from_str(body).ok();
        let (code, message) = match parsed {
            Some(err) => (err.error_code, err.message),
            None => (String::new(), body.to_string()),
        };
        let context = context.with_details(format!("status={}", status.as_u16()));

        if code == "RESOURCE_DOES_NOT_EXIST" || status == StatusCode::NOT_FOUND {
            return RegistryError::not_found(message, context);
        }
        if status.is_server_error() {
            return RegistryError::connection(format!("{} {}", code, message).trim().to_string(), context);
        }
        RegistryError::query(format!("{} {}", code, message).trim().to_string(), context)
    }
}

#[async_trait]
impl ModelRegistry for MlflowRegistry {
    async fn health_check(&self) -> RegistryResult<bool> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            RegistryError::connection(
                format!("Health check failed: {}", e),
                ErrorContext::new("health_check"),
            )
        })?;
        Ok(response.status().is_success())
    }

    async fn get_latest_versions(
        &self,
        name: &str,
        stages: &[Stage],
    ) -> RegistryResult<Vec<ModelVersion>> {
        let body = LatestVersionsRequest {
            name,
            stages: stages.iter().map(Stage::as_str).collect(),
        };
        let response: LatestVersionsResponse = self
            .call(
                Method::POST,
                "registered-models/get-latest-versions",
                &[],
                Some(&body),
                ErrorContext::new("get_latest_versions").with_model(name),
            )
            .await?;
        response
            .model_versions
            .into_iter()
            .map(|v| v.into_model_version("get_latest_versions"))
            .collect()
    }

    async fn get_model_version(&self, name: &str, version: u64) -> RegistryResult<ModelVersion> {
        let response: ModelVersionResponse = self
            .call::<(), _>(
                Method::GET,
                "model-versions/get",
                &[("name", name.to_string()), ("version", version.to_string())],
                None,
                ErrorContext::new("get_model_version")
                    .with_model(name)
                    .with_version(version),
            )
            .await?;
        response.model_version.into_model_version("get_model_version")
    }

    async fn transition_model_version_stage(
        &self,
        name: &str,
        version: u64,
        stage: Stage,
        archive_existing: bool,
    ) -> RegistryResult<ModelVersion> {
        // MLflow accepts any stage change; enforce the lifecycle rules first.
        let current = self.get_model_version(name, version).await?;
        let context = ErrorContext::new("transition_stage")
            .with_model(name)
            .with_version(version);
        if !current.current_stage.can_transition_to(stage) {
            return Err(RegistryError::invalid_transition(
                current.current_stage,
                stage,
                context,
            ));
        }
        if stage == Stage::Production && !archive_existing {
            let holders = self.get_latest_versions(name, &[Stage::Production]).await?;
            if let Some(holder) = holders.iter().find(|v| v.version != version) {
                return Err(RegistryError::invalid_transition(
                    current.current_stage,
                    stage,
                    context.with_details(format!("version {} already in Production", holder.version)),
                ));
            }
        }

        let body = TransitionRequest {
            name,
            version: version.to_string(),
            stage: stage.as_str(),
            archive_existing_versions: archive_existing,
        };
        let response: ModelVersionResponse = self
            .call(
                Method::POST,
                "model-versions/transition-stage",
                &[],
                Some(&body),
                context,
            )
            .await?;
        let updated = response.model_version.into_model_version("transition_stage")?;
        tracing::info!(
            model = name,
            version,
            from = %current.current_stage,
            to = %updated.current_stage,
            "Transitioned model version"
        );
        Ok(updated)
    }

    async fn get_model_version_download_uri(
        &self,
        name: &str,
        version: u64,
    ) -> RegistryResult<String> {
        let response: DownloadUriResponse = self
            .call::<(), _>(
                Method::GET,
                "model-versions/get-download-uri",
                &[("name", name.to_string()), ("version", version.to_string())],
                None,
                ErrorContext::new("get_download_uri")
                    .with_model(name)
                    .with_version(version),
            )
            .await?;
        Ok(response.artifact_uri)
    }

    async fn create_model_version(
        &self,
        name: &str,
        source: &str,
        run_id: Option<&str>,
    ) -> RegistryResult<ModelVersion> {
        let body = CreateRequest {
            name,
            source,
            run_id,
        };
        let response: ModelVersionResponse = self
            .call(
                Method::POST,
                "model-versions/create",
                &[],
                Some(&body),
                ErrorContext::new("create_model_version").with_model(name),
            )
            .await?;
        response.model_version.into_model_version("create_model_version")
    }

    async fn download_artifact(&self, artifact_uri: &str, file: &str) -> RegistryResult<Vec<u8>> {
        // Only locations served by the tracking server's artifact proxy.
        let path = proxied_artifact_path(artifact_uri).ok_or_else(|| {
            RegistryError::Artifact(ArtifactError::UnsupportedUri(artifact_uri.to_string()))
        })?;
        let url = format!("{}/{}/{}/{}", self.base_url, ARTIFACTS_PREFIX, path, file);
        let context = ErrorContext::new("download_artifact");
        tracing::debug!(%url, "MLflow artifact download");

        let response = self.client.get(&url).send().await.map_err(|e| {
            RegistryError::connection(format!("Request to {} failed: {}", url, e), context.clone())
        })?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Self::error_from_response(status, &text, context));
        }
        let bytes = response.bytes().await.map_err(|e| {
            RegistryError::connection(format!("Failed to read artifact: {}", e), context)
        })?;
        Ok(bytes.to_vec())
    }
}
