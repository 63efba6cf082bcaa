//! Run-information record written by the training pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::RegistryResult;
use crate::artifacts::ArtifactStore;

/// Default file name of the run-information record.
pub const RUN_INFORMATION_FILE: &str = "run_information.json";

/// Points at the model produced by a training run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInformation {
    pub model_uri: String,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
}

impl RunInformation {
    pub fn from_file(path: &Path) -> RegistryResult<Self> {
        Ok(ArtifactStore::load_json(path)?)
    }
}
