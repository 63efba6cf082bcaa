//! Error types for model registry operations.
//!
//! Every variant carries an [`ErrorContext`] describing the operation and
//! model involved.

use std::fmt;

use super::models::Stage;
use crate::artifacts::ArtifactError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Structured context for registry errors.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation being performed (e.g. "transition_stage", "get_latest_versions")
    pub operation: Option<String>,
    /// The registered model name
    pub model: Option<String>,
    /// The model version if applicable
    pub version: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
    /// Advisory: set on transport failures and 5xx answers. Nothing in
    /// this crate retries; callers decide.
    pub retryable: bool,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_version(mut self, version: impl ToString) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref model) = self.model {
            parts.push(format!("model={}", model));
        }
        if let Some(ref version) = self.version {
            parts.push(format!("version={}", version));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        if self.retryable {
            parts.push("retryable=true".to_string());
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for registry operations
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The registry could not be reached.
    #[error("Connection error: {message} {context}")]
    ConnectionError {
        message: String,
        context: ErrorContext,
    },

    /// The registry answered with an error or an unreadable body.
    #[error("Query error: {message} {context}")]
    QueryError {
        message: String,
        context: ErrorContext,
    },

    /// Model or version does not exist.
    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// No version of the model currently sits in the stage.
    #[error("No version of model '{name}' in stage {stage}")]
    NoVersionInStage { name: String, stage: Stage },

    /// The requested stage change is not allowed.
    #[error("Invalid transition from {from} to {to} {context}")]
    InvalidTransition {
        from: Stage,
        to: Stage,
        context: ErrorContext,
    },

    /// Configuration or initialization error.
    #[error("Configuration error: {message} {context}")]
    ConfigurationError {
        message: String,
        context: ErrorContext,
    },

    /// A resolved model artifact could not be loaded.
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

impl RegistryError {
    pub fn connection(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ConnectionError {
            message: message.into(),
            context: context.retryable(),
        }
    }

    pub fn query(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::QueryError {
            message: message.into(),
            context,
        }
    }

    pub fn not_found(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::NotFound {
            message: message.into(),
            context,
        }
    }

    pub fn no_version_in_stage(name: impl Into<String>, stage: Stage) -> Self {
        Self::NoVersionInStage {
            name: name.into(),
            stage,
        }
    }

    pub fn invalid_transition(from: Stage, to: Stage, context: ErrorContext) -> Self {
        Self::InvalidTransition { from, to, context }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Get the error context if available.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::ConnectionError { context, .. }
            | Self::QueryError { context, .. }
            | Self::NotFound { context, .. }
            | Self::InvalidTransition { context, .. }
            | Self::ConfigurationError { context, .. } => Some(context),
            Self::NoVersionInStage { .. } | Self::Artifact(_) => None,
        }
    }

    /// Whether the failure was transient. Advisory only, like the context
    /// flag it reads.
    pub fn is_retryable(&self) -> bool {
        self.context().is_some_and(|c| c.retryable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_display() {
        let ctx = ErrorContext::new("transition_stage")
            .with_model("uber_demand_prediction_model")
            .with_version(3);
        assert_eq!(
            ctx.to_string(),
            "[operation=transition_stage, model=uber_demand_prediction_model, version=3]"
        );
    }

    #[test]
    fn test_connection_errors_are_retryable() {
        let err = RegistryError::connection("refused", ErrorContext::new("health_check"));
        assert!(err.is_retryable());
        assert!(!RegistryError::configuration("bad").is_retryable());
    }

    #[test]
    fn test_no_version_message() {
        let err = RegistryError::no_version_in_stage("demand", Stage::Staging);
        assert_eq!(err.to_string(), "No version of model 'demand' in stage Staging");
    }
}
