//! Pre-fit model artifacts and the tables they are evaluated against.
//!
//! Everything here is loaded once at startup by [`ArtifactStore`] into an
//! immutable [`ArtifactContext`]; nothing is re-fit at runtime.

pub mod checksum;
pub mod clustering;
pub mod encoder;
pub mod error;
pub mod pipeline;
pub mod regressor;
pub mod scaler;
pub mod store;
pub mod tables;

pub use clustering::KMeansModel;
pub use encoder::{ColumnEncoder, ColumnEncoding, ColumnSpec};
pub use error::{ArtifactError, ArtifactResult};
pub use pipeline::{InferencePipeline, Predict, Transform};
pub use regressor::LinearRegressor;
pub use scaler::StandardScaler;
pub use store::{
    local_path_for_uri, uri_scheme, ArtifactContext, ArtifactFingerprints, ArtifactPaths, ArtifactStore,
    MODEL_FILE_NAME,
};
pub use tables::{FeatureTable, PlotDataset};
