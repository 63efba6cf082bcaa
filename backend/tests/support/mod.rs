#![allow(dead_code)]

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;
use tempfile::TempDir;

use demand_map::artifacts::{ArtifactContext, ArtifactPaths, ArtifactStore};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Synthetic artifacts
// =============================================================================

pub const MODEL_NAME: &str = "uber_demand_prediction_model";

/// Regions form a 3 x 4 grid of centroids in scaled space.
pub const REGION_COUNT: u32 = 12;
const LAT_OFFSETS: [f64; 3] = [-1.0, 0.0, 1.0];
const LON_OFFSETS: [f64; 4] = [-1.5, -0.5, 0.5, 1.5];

pub const MEAN_LAT: f64 = 40.75;
pub const MEAN_LON: f64 = -73.97;
pub const SCALE: f64 = 0.05;

pub fn ts(date: &str, time: &str) -> NaiveDateTime {
    demand_map::models::time::parse_timestamp(date, time).unwrap()
}

/// Timestamps present in the synthetic feature table.
pub fn feature_timestamps() -> Vec<NaiveDateTime> {
    let day = NaiveDate::from_ymd_opt(2016, 3, 15).unwrap();
    [(8, 0), (8, 15), (8, 30)]
        .iter()
        .map(|(h, m)| day.and_hms_opt(*h, *m, 0).unwrap())
        .collect()
}

fn centroid(region: u32) -> (f64, f64) {
    let row = (region / 4) as usize;
    let col = (region % 4) as usize;
    (LAT_OFFSETS[row], LON_OFFSETS[col])
}

/// Geographic location of a region's centroid.
pub fn region_center(region: u32) -> (f64, f64) {
    let (lat, lon) = centroid(region);
    (MEAN_LAT + lat * SCALE, MEAN_LON + lon * SCALE)
}

pub fn scaler_json() -> serde_json::Value {
    json!({
        "feature_names": ["pickup_latitude", "pickup_longitude"],
        "mean": [MEAN_LAT, MEAN_LON],
        "scale": [SCALE, SCALE],
    })
}

pub fn kmeans_json() -> serde_json::Value {
    let centers: Vec<Vec<f64>> = (0..REGION_COUNT)
        .map(|r| {
            let (lat, lon) = centroid(r);
            vec![lat, lon]
        })
        .collect();
    json!({ "cluster_centers": centers })
}

pub fn encoder_json() -> serde_json::Value {
    let regions: Vec<u32> = (0..REGION_COUNT).collect();
    json!({
        "columns": [
            {"column": "region", "kind": "one_hot", "categories": regions},
            {"column": "lag_1", "kind": "passthrough"},
            {"column": "lag_2", "kind": "passthrough"},
            {"column": "lag_3", "kind": "passthrough"},
            {"column": "lag_4", "kind": "passthrough"},
            {"column": "avg_pickups", "kind": "passthrough"},
            {"column": "day_of_week", "kind": "ordinal", "categories": [0, 1, 2, 3, 4, 5, 6]},
        ]
    })
}

/// Coefficients for the encoder above (12 one-hot + 5 passthrough + 1 ordinal).
pub fn model_json() -> serde_json::Value {
    let mut coefficients: Vec<f64> = (0..REGION_COUNT).map(|r| 0.5 * f64::from(r)).collect();
    coefficients.extend([0.4, 0.3, 0.2, 0.1, 0.5, 0.0]);
    json!({ "kind": "linear", "intercept": 2.0, "coefficients": coefficients })
}

pub fn feature_csv() -> String {
    let mut out = String::from(
        "tpep_pickup_datetime,region,lag_1,lag_2,lag_3,lag_4,avg_pickups,day_of_week,total_pickups\n",
    );
    for (step, timestamp) in feature_timestamps().iter().enumerate() {
        for region in 0..REGION_COUNT {
            let base = 10.0 + f64::from(region) * 3.0 + step as f64;
            out.push_str(&format!(
                "{},{},{},{},{},{},{},1,{}\n",
                timestamp.format("%Y-%m-%d %H:%M:%S"),
                region,
                base,
                base - 1.0,
                base - 2.0,
                base - 3.0,
                base - 1.5,
                base + 2.0
            ));
        }
    }
    out
}

pub fn plot_csv() -> String {
    let mut out = String::from("pickup_latitude,pickup_longitude,region\n");
    for region in 0..REGION_COUNT {
        let (lat, lon) = region_center(region);
        for jitter in [-0.001, 0.0, 0.001] {
            out.push_str(&format!("{},{},{}\n", lat + jitter, lon - jitter, region));
        }
    }
    out
}

fn write_json(path: &Path, value: &serde_json::Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

fn write_text(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

/// Project directory holding a complete artifact set.
pub struct Fixture {
    pub dir: TempDir,
    pub paths: ArtifactPaths,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::under(dir.path());
        write_json(&paths.scaler, &scaler_json());
        write_json(&paths.encoder, &encoder_json());
        write_json(&paths.clustering, &kmeans_json());
        write_json(&paths.regressor, &model_json());
        write_text(&paths.plot_data, &plot_csv());
        write_text(&paths.feature_table, &feature_csv());
        Self { dir, paths }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn load(&self) -> ArtifactContext {
        ArtifactStore::new(self.paths.clone()).load().unwrap()
    }

    /// Copy the regressor into an MLflow-style run directory and return
    /// the mlruns root.
    pub fn write_run(&self, run_id: &str) -> PathBuf {
        let mlruns = self.root().join("mlruns");
        write_json(
            &mlruns.join(run_id).join("artifacts").join("model").join("model.json"),
            &model_json(),
        );
        mlruns
    }

    /// Write `run_information.json` pointing at `model_uri`.
    pub fn write_run_information(&self, model_uri: &str) -> PathBuf {
        let path = self.root().join("run_information.json");
        write_json(
            &path,
            &json!({ "run_id": "run-1", "model_name": MODEL_NAME, "model_uri": model_uri }),
        );
        path
    }
}
