//! Region identifiers and geographic coordinates.

use serde::{Deserialize, Serialize};

/// Region identifier assigned by the offline clustering fit.
///
/// Ids are dense and 0-based: region `n` is the `n`-th centroid of the
/// clustering artifact. The regressor was trained with the id as a
/// categorical feature, so the mapping must never be renumbered.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RegionId(pub u32);

impl RegionId {
    pub fn new(value: u32) -> Self {
        RegionId(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Position of the region's centroid in the clustering artifact.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RegionId> for u32 {
    fn from(id: RegionId) -> Self {
        id.0
    }
}

impl From<u32> for RegionId {
    fn from(value: u32) -> Self {
        RegionId(value)
    }
}

/// Geographic coordinate (WGS84 decimal degrees).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Feature vector in the column order the scaler was fit with
    /// (`pickup_latitude`, `pickup_longitude`).
    pub fn as_features(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_id_ordering() {
        let mut ids = vec![RegionId::new(4), RegionId::new(0), RegionId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![RegionId(0), RegionId(2), RegionId(4)]);
        assert_eq!(RegionId::new(7).index(), 7);
    }

    #[test]
    fn test_region_id_serializes_as_integer() {
        let json = serde_json::to_string(&RegionId::new(12)).unwrap();
        assert_eq!(json, "12");
    }

    #[test]
    fn test_coordinate_finiteness() {
        assert!(Coordinate::new(40.75, -73.98).is_finite());
        assert!(!Coordinate::new(f64::NAN, -73.98).is_finite());
        assert!(!Coordinate::new(40.75, f64::INFINITY).is_finite());
    }

    #[test]
    fn test_coordinate_feature_order() {
        let coord = Coordinate::new(40.7, -73.9);
        assert_eq!(coord.as_features(), [40.7, -73.9]);
    }
}
