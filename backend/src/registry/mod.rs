//! Model registry access and lifecycle management.
//!
//! ```text
//! ┌────────────────────────────┐
//! │ LifecycleManager           │  latest_in_stage / promote / resolve URIs
//! └─────────────┬──────────────┘
//!               │ Arc<dyn ModelRegistry>
//!     ┌─────────┴─────────┐
//!     ▼                   ▼
//! LocalRegistry      MlflowRegistry (REST 2.0)
//! ```

pub mod error;
pub mod factory;
pub mod health;
pub mod lifecycle;
pub mod local;
#[cfg(feature = "mlflow-registry")]
pub mod mlflow;
pub mod models;
pub mod repository;
pub mod run_info;

pub use error::{ErrorContext, RegistryError, RegistryResult};
pub use factory::{MlflowConfig, RegistryFactory, RegistryType};
pub use health::verify_production_model_loadable;
pub use lifecycle::{LifecycleManager, ModelLocation};
pub use local::LocalRegistry;
#[cfg(feature = "mlflow-registry")]
pub use mlflow::MlflowRegistry;
pub use models::{ModelVersion, Stage};
pub use repository::ModelRegistry;
pub use run_info::{RunInformation, RUN_INFORMATION_FILE};
