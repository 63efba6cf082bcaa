//! Promote the newest Staging version of the demand model to Production.
//!
//! Prints `The model is moved to the <stage> stage having version number <n>`
//! on success and exits non-zero with the error otherwise. Afterwards the
//! run-information record is checked: its model must load.
//!
//! # Usage
//!
//! ```bash
//! MLFLOW_TRACKING_URI=http://localhost:5000 cargo run --bin promote-model
//! cargo run --bin promote-model -- --model my_model --skip-check
//! ```

use anyhow::Context;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use demand_map::bootstrap;
use demand_map::config::AppConfig;
use demand_map::registry::{verify_production_model_loadable, Stage};

struct Args {
    model: Option<String>,
    skip_check: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        model: None,
        skip_check: false,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--model" => args.model = Some(iter.next().context("--model needs a value")?),
            "--skip-check" => args.skip_check = true,
            other => anyhow::bail!("Unknown argument: {}", other),
        }
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    let config = AppConfig::load()?;
    config.validate()?;
    let model = args.model.unwrap_or_else(|| config.registry.model_name.clone());

    let lifecycle = bootstrap::lifecycle_from_config(&config)?;
    let promoted = lifecycle
        .promote_latest(&model, Stage::Staging, Stage::Production)
        .await
        .with_context(|| format!("Failed to promote '{}'", model))?;

    println!(
        "The model is moved to the {} stage having version number {}",
        promoted.current_stage, promoted.version
    );

    if !args.skip_check {
        verify_production_model_loadable(&lifecycle, &config.registry.run_info_path)
            .await
            .context("Promoted model failed to load")?;
        tracing::info!("Registered model loads");
    }

    Ok(())
}
