//! Service layer for demand queries.
//!
//! Services sit between the loaded artifacts and the HTTP handlers: they
//! resolve regions, run inference and assemble response payloads.

pub mod demand_map;
pub mod demand_predictor;
pub mod error;
pub mod region_resolver;

pub use demand_map::{
    build_demand_map, build_predictions, color_for_region, region_summaries,
    sample_reference_location, DemandMapRequest, DEFAULT_NEIGHBORHOOD_REGIONS,
};
pub use demand_predictor::DemandPredictor;
pub use error::{DemandError, DemandResult};
pub use region_resolver::RegionResolver;
