//! Errors raised while answering demand queries.

use chrono::NaiveDateTime;

use crate::artifacts::ArtifactError;
use crate::models::RegionId;

pub type DemandResult<T> = Result<T, DemandError>;

#[derive(Debug, thiserror::Error)]
pub enum DemandError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No feature rows at {0}")]
    TimestampNotFound(NaiveDateTime),

    #[error("Region {region} has no feature row at {timestamp}")]
    RegionNotFound {
        region: RegionId,
        timestamp: NaiveDateTime,
    },

    #[error("Inference failed: {0}")]
    Inference(#[from] ArtifactError),
}
