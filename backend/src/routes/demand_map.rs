use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::RegionId;

/// Which regions a demand map covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapMode {
    /// Every region of the city.
    Complete,
    /// The K regions nearest the reference location.
    #[default]
    Neighborhood,
}

impl fmt::Display for MapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapMode::Complete => write!(f, "complete"),
            MapMode::Neighborhood => write!(f, "neighborhood"),
        }
    }
}

impl FromStr for MapMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "complete" | "all" => Ok(MapMode::Complete),
            "neighborhood" | "neighbourhood" => Ok(MapMode::Neighborhood),
            other => Err(format!(
                "Invalid map mode '{}'. Expected 'complete' or 'neighborhood'",
                other
            )),
        }
    }
}

/// Historical pickup drawn on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub region: RegionId,
    pub color: String,
}

/// Legend row for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub region: RegionId,
    pub color: String,
    /// Raw model output, clamped at zero.
    pub demand: f64,
    /// Whole pickups shown to users (`demand` truncated).
    pub pickups: u64,
    pub is_current: bool,
    pub is_highest: bool,
}

/// Reference location the map was built around.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub latitude: f64,
    pub longitude: f64,
    pub region: RegionId,
}

/// Everything a client needs to render one demand map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandMapData {
    /// Selected timestamp, `YYYY-MM-DD HH:MM`.
    pub timestamp: String,
    /// End of the forecast interval, `HH:MM`.
    pub interval_end: String,
    pub mode: MapMode,
    pub location: LocationInfo,
    pub points: Vec<MapPoint>,
    pub legend: Vec<LegendEntry>,
}

/// Route function name constant
pub const GET_DEMAND_MAP: &str = "get_demand_map";
