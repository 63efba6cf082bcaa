//! Domain types shared by the artifact store, services and HTTP layer.

pub mod features;
pub mod region;
pub mod time;

pub use features::{FeatureRow, ModelInput, PlotPoint};
pub use region::{Coordinate, RegionId};
pub use time::{SupportedWindow, PREDICTION_INTERVAL_MINUTES};
