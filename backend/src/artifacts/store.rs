//! Startup loading of every artifact into an immutable context.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::checksum::calculate_checksum;
use super::clustering::KMeansModel;
use super::encoder::ColumnEncoder;
use super::error::{ArtifactError, ArtifactResult};
use super::pipeline::InferencePipeline;
use super::regressor::LinearRegressor;
use super::scaler::StandardScaler;
use super::tables::{FeatureTable, PlotDataset};
use crate::models::RegionId;

/// File name of the regressor inside a model directory.
pub const MODEL_FILE_NAME: &str = "model.json";

/// Coordinate features the scaler and clustering model were fit on.
const COORDINATE_FEATURES: usize = 2;

/// Locations of every artifact the service needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub scaler: PathBuf,
    pub encoder: PathBuf,
    pub clustering: PathBuf,
    pub regressor: PathBuf,
    pub plot_data: PathBuf,
    pub feature_table: PathBuf,
}

impl ArtifactPaths {
    /// Standard project layout below `root`.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            scaler: root.join("models").join("scaler.json"),
            encoder: root.join("models").join("encoder.json"),
            clustering: root.join("models").join("mb_kmeans.json"),
            regressor: root.join("models").join(MODEL_FILE_NAME),
            plot_data: root.join("data").join("external").join("plot_data.csv"),
            feature_table: root.join("data").join("processed").join("test.csv"),
        }
    }
}

/// SHA-256 of each loaded artifact, hex encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFingerprints {
    pub scaler: String,
    pub encoder: String,
    pub clustering: String,
    pub regressor: String,
    pub plot_data: String,
    pub feature_table: String,
}

/// Every loaded artifact, validated against each other.
///
/// Built once at startup and shared behind an `Arc`; nothing mutates it
/// afterwards.
#[derive(Debug, Clone)]
pub struct ArtifactContext {
    scaler: StandardScaler,
    clustering: KMeansModel,
    pipeline: InferencePipeline,
    features: FeatureTable,
    plot: PlotDataset,
    fingerprints: ArtifactFingerprints,
}

impl ArtifactContext {
    pub fn new(
        scaler: StandardScaler,
        clustering: KMeansModel,
        pipeline: InferencePipeline,
        features: FeatureTable,
        plot: PlotDataset,
    ) -> ArtifactResult<Self> {
        scaler.validate()?;
        clustering.validate()?;

        if scaler.n_features() != COORDINATE_FEATURES {
            return Err(ArtifactError::Inconsistent(format!(
                "scaler has {} features, expected {} coordinate features",
                scaler.n_features(),
                COORDINATE_FEATURES
            )));
        }
        if clustering.n_features() != scaler.n_features() {
            return Err(ArtifactError::Inconsistent(format!(
                "clustering centers have {} dimensions but the scaler emits {}",
                clustering.n_features(),
                scaler.n_features()
            )));
        }

        let region_count = clustering.n_clusters();
        check_regions("feature table", features.regions(), region_count)?;
        check_regions("plot dataset", plot.region_ids(), region_count)?;

        Ok(Self {
            scaler,
            clustering,
            pipeline,
            features,
            plot,
            fingerprints: ArtifactFingerprints::default(),
        })
    }

    pub fn with_fingerprints(mut self, fingerprints: ArtifactFingerprints) -> Self {
        self.fingerprints = fingerprints;
        self
    }

    /// Number of regions, one per clustering centroid.
    pub fn region_count(&self) -> usize {
        self.clustering.n_clusters()
    }

    pub fn region_ids(&self) -> impl Iterator<Item = RegionId> {
        (0..self.region_count() as u32).map(RegionId::new)
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn clustering(&self) -> &KMeansModel {
        &self.clustering
    }

    pub fn pipeline(&self) -> &InferencePipeline {
        &self.pipeline
    }

    pub fn features(&self) -> &FeatureTable {
        &self.features
    }

    pub fn plot(&self) -> &PlotDataset {
        &self.plot
    }

    pub fn fingerprints(&self) -> &ArtifactFingerprints {
        &self.fingerprints
    }
}

fn check_regions(
    source: &str,
    regions: BTreeSet<RegionId>,
    region_count: usize,
) -> ArtifactResult<()> {
    match regions.iter().next_back() {
        Some(max) if max.index() >= region_count => Err(ArtifactError::Inconsistent(format!(
            "{} references region {} but the clustering model defines {} regions",
            source, max, region_count
        ))),
        _ => Ok(()),
    }
}

/// Loads artifacts from disk.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    paths: ArtifactPaths,
}

impl ArtifactStore {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Load every artifact including the regressor at its configured path.
    pub fn load(&self) -> ArtifactResult<ArtifactContext> {
        let (regressor, hash) = load_json_hashed::<LinearRegressor>(&self.paths.regressor)?;
        regressor.validate()?;
        self.assemble(regressor, hash)
    }

    /// Load every artifact but use `regressor` instead of the file on disk,
    /// e.g. a model fetched through the registry.
    pub fn load_with_regressor(&self, regressor: LinearRegressor) -> ArtifactResult<ArtifactContext> {
        regressor.validate()?;
        let hash = serde_json::to_vec(&regressor)
            .map(|bytes| calculate_checksum(&bytes))
            .map_err(|source| ArtifactError::Decode {
                path: self.paths.regressor.clone(),
                source,
            })?;
        self.assemble(regressor, hash)
    }

    fn assemble(&self, regressor: LinearRegressor, regressor_hash: String) -> ArtifactResult<ArtifactContext> {
        let (scaler, scaler_hash) = load_json_hashed::<StandardScaler>(&self.paths.scaler)?;
        let (encoder, encoder_hash) = load_json_hashed::<ColumnEncoder>(&self.paths.encoder)?;
        encoder.validate()?;
        let (clustering, clustering_hash) = load_json_hashed::<KMeansModel>(&self.paths.clustering)?;

        let plot = PlotDataset::from_csv_path(&self.paths.plot_data)?;
        let features = FeatureTable::from_csv_path(&self.paths.feature_table)?;

        let fingerprints = ArtifactFingerprints {
            scaler: scaler_hash,
            encoder: encoder_hash,
            clustering: clustering_hash,
            regressor: regressor_hash,
            plot_data: file_checksum(&self.paths.plot_data)?,
            feature_table: file_checksum(&self.paths.feature_table)?,
        };

        let pipeline = InferencePipeline::new(encoder, regressor)?;
        let context = ArtifactContext::new(scaler, clustering, pipeline, features, plot)?
            .with_fingerprints(fingerprints);

        tracing::info!(
            regions = context.region_count(),
            feature_rows = context.features().len(),
            plot_points = context.plot().len(),
            "Artifacts loaded"
        );
        Ok(context)
    }

    /// Deserialize one JSON artifact.
    pub fn load_json<T: DeserializeOwned>(path: &Path) -> ArtifactResult<T> {
        load_json_hashed(path).map(|(value, _)| value)
    }

    /// Load a regressor from a file, or from `model.json` inside a directory.
    pub fn load_regressor(path: &Path) -> ArtifactResult<LinearRegressor> {
        let file = if path.is_dir() {
            path.join(MODEL_FILE_NAME)
        } else {
            path.to_path_buf()
        };
        let regressor: LinearRegressor = Self::load_json(&file)?;
        regressor.validate()?;
        tracing::debug!(path = %file.display(), features = regressor.coefficients.len(), "Loaded regressor");
        Ok(regressor)
    }

    /// Decode a regressor fetched from somewhere other than the local disk.
    /// `origin` names the source in errors.
    pub fn regressor_from_slice(bytes: &[u8], origin: &str) -> ArtifactResult<LinearRegressor> {
        let regressor: LinearRegressor =
            serde_json::from_slice(bytes).map_err(|source| ArtifactError::Decode {
                path: PathBuf::from(origin),
                source,
            })?;
        regressor.validate()?;
        Ok(regressor)
    }
}

/// Filesystem location of a `file://` URI or plain path.
///
/// Any other `<scheme>:` prefix (`models:/`, `runs:/`, `mlflow-artifacts:/`,
/// `s3://`, ...) is rejected. Single-letter prefixes are drive letters.
pub fn local_path_for_uri(uri: &str) -> ArtifactResult<PathBuf> {
    if let Some(rest) = uri.strip_prefix("file://") {
        return Ok(PathBuf::from(rest));
    }
    if uri.trim().is_empty() || uri_scheme(uri).is_some() {
        return Err(ArtifactError::UnsupportedUri(uri.to_string()));
    }
    Ok(PathBuf::from(uri))
}

/// RFC 3986 scheme of `uri`, if it has one.
pub fn uri_scheme(uri: &str) -> Option<&str> {
    let (scheme, _) = uri.split_once(':')?;
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let valid = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    (starts_alpha && valid && scheme.len() > 1).then_some(scheme)
}

fn read_bytes(path: &Path) -> ArtifactResult<Vec<u8>> {
    fs::read(path).map_err(|source| ArtifactError::io(path, source))
}

fn file_checksum(path: &Path) -> ArtifactResult<String> {
    read_bytes(path).map(|bytes| calculate_checksum(&bytes))
}

fn load_json_hashed<T: DeserializeOwned>(path: &Path) -> ArtifactResult<(T, String)> {
    let bytes = read_bytes(path)?;
    let value = serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((value, calculate_checksum(&bytes)))
}
