//! Registered model versions and their lifecycle stages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle stage of a model version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    None,
    Staging,
    Production,
    Archived,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::None, Stage::Staging, Stage::Production, Stage::Archived];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::None => "None",
            Stage::Staging => "Staging",
            Stage::Production => "Production",
            Stage::Archived => "Archived",
        }
    }

    /// Whether a version may move from `self` to `target`.
    ///
    /// Versions move forward through `None -> Staging -> Production`, may be
    /// archived from anywhere, and archived versions may be re-promoted.
    /// Nothing returns to `None` and a stage never transitions to itself.
    pub fn can_transition_to(&self, target: Stage) -> bool {
        matches!(
            (self, target),
            (Stage::None, Stage::Staging)
                | (Stage::Staging, Stage::Production)
                | (Stage::None | Stage::Staging | Stage::Production, Stage::Archived)
                | (Stage::Archived, Stage::Staging | Stage::Production)
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Stage::None),
            "staging" => Ok(Stage::Staging),
            "production" => Ok(Stage::Production),
            "archived" => Ok(Stage::Archived),
            _ => Err(format!("Unknown stage: {}", s)),
        }
    }
}

/// One version of a registered model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVersion {
    pub name: String,
    pub version: u64,
    pub current_stage: Stage,
    /// Artifact location the version was registered from.
    pub source: Option<String>,
    pub run_id: Option<String>,
}

impl ModelVersion {
    pub fn new(name: impl Into<String>, version: u64) -> Self {
        Self {
            name: name.into(),
            version,
            current_stage: Stage::None,
            source: None,
            run_id: None,
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.current_stage = stage;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }
}
