//! Post-promotion gate: the model a run points at must load.

use std::path::Path;

use super::error::RegistryResult;
use super::lifecycle::LifecycleManager;
use super::run_info::RunInformation;

/// Read the run-information record at `run_info_path`, resolve its
/// `model_uri` and deserialize the regressor.
///
/// Returns `Ok(true)` when the model loads and validates. Every failure
/// along the way is returned as an error.
pub async fn verify_production_model_loadable(
    manager: &LifecycleManager,
    run_info_path: &Path,
) -> RegistryResult<bool> {
    let info = RunInformation::from_file(run_info_path)?;
    let model = manager.load_model(&info.model_uri).await?;
    tracing::info!(
        model_uri = %info.model_uri,
        features = model.coefficients.len(),
        "Registered model loaded"
    );
    Ok(true)
}
