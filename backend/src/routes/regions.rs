use serde::{Deserialize, Serialize};

use crate::models::RegionId;

/// Region with its map colour and historical sample count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub region: RegionId,
    pub color: String,
    pub sample_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionsData {
    pub region_count: usize,
    pub regions: Vec<RegionInfo>,
}

/// Route function name constant
pub const LIST_REGIONS: &str = "list_regions";
