use serde::{Deserialize, Serialize};

use crate::registry::{ModelVersion, Stage};

/// Registered model version as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVersionInfo {
    pub name: String,
    pub version: u64,
    pub stage: Stage,
    pub source: Option<String>,
    pub run_id: Option<String>,
}

impl From<ModelVersion> for ModelVersionInfo {
    fn from(version: ModelVersion) -> Self {
        Self {
            name: version.name,
            version: version.version,
            stage: version.current_stage,
            source: version.source,
            run_id: version.run_id,
        }
    }
}

/// Route function name constant
pub const GET_LATEST_MODEL: &str = "get_latest_model";
