//! Maps a coordinate to the nearest demand regions.

use crate::artifacts::{ArtifactContext, KMeansModel, StandardScaler};
use crate::models::{Coordinate, RegionId};

use super::error::{DemandError, DemandResult};

/// Scales a coordinate with the fitted scaler and ranks regions by
/// Euclidean distance to their centroid.
#[derive(Debug, Clone, Copy)]
pub struct RegionResolver<'a> {
    scaler: &'a StandardScaler,
    clustering: &'a KMeansModel,
}

impl<'a> RegionResolver<'a> {
    pub fn new(context: &'a ArtifactContext) -> Self {
        Self::from_parts(context.scaler(), context.clustering())
    }

    pub fn from_parts(scaler: &'a StandardScaler, clustering: &'a KMeansModel) -> Self {
        Self { scaler, clustering }
    }

    pub fn region_count(&self) -> usize {
        self.clustering.n_clusters()
    }

    /// Distance from `coord` to every centroid, indexed by region id.
    pub fn distances(&self, coord: Coordinate) -> DemandResult<Vec<f64>> {
        if !coord.is_finite() {
            return Err(DemandError::InvalidInput(format!(
                "coordinate ({}, {}) is not finite",
                coord.latitude, coord.longitude
            )));
        }
        let scaled = self.scaler.transform(&coord.as_features())?;
        Ok(self.clustering.transform(&scaled)?)
    }

    /// The `k` closest regions, returned in ascending id order.
    ///
    /// Equal distances rank the lower id first. `k` larger than the region
    /// count returns every region.
    pub fn nearest_regions(&self, coord: Coordinate, k: usize) -> DemandResult<Vec<RegionId>> {
        let distances = self.distances(coord)?;
        let mut ranked: Vec<(usize, f64)> = distances.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.truncate(k);

        let mut regions: Vec<RegionId> = ranked
            .into_iter()
            .map(|(idx, _)| RegionId::new(idx as u32))
            .collect();
        regions.sort();
        Ok(regions)
    }

    /// Region whose centroid is closest to `coord`.
    pub fn nearest_region(&self, coord: Coordinate) -> DemandResult<RegionId> {
        let distances = self.distances(coord)?;
        distances
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| RegionId::new(idx as u32))
            .ok_or_else(|| DemandError::InvalidInput("clustering model has no regions".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (StandardScaler, KMeansModel) {
        let scaler = StandardScaler::new(vec![40.0, -74.0], vec![1.0, 1.0]).unwrap();
        let clustering = KMeansModel::new(vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![5.0, 5.0],
        ])
        .unwrap();
        (scaler, clustering)
    }

    #[test]
    fn test_nearest_regions_sorted_by_id() {
        let (scaler, clustering) = fixtures();
        let resolver = RegionResolver::from_parts(&scaler, &clustering);
        let regions = resolver
            .nearest_regions(Coordinate::new(40.9, -74.0), 2)
            .unwrap();
        assert_eq!(regions, vec![RegionId::new(0), RegionId::new(1)]);
    }

    #[test]
    fn test_ties_prefer_lower_id() {
        let (scaler, clustering) = fixtures();
        let resolver = RegionResolver::from_parts(&scaler, &clustering);
        // Equidistant from regions 0, 1 and 2.
        let regions = resolver
            .nearest_regions(Coordinate::new(40.5, -73.5), 1)
            .unwrap();
        assert_eq!(regions, vec![RegionId::new(0)]);
        let regions = resolver
            .nearest_regions(Coordinate::new(40.5, -73.5), 2)
            .unwrap();
        assert_eq!(regions, vec![RegionId::new(0), RegionId::new(1)]);
    }

    #[test]
    fn test_k_bounds() {
        let (scaler, clustering) = fixtures();
        let resolver = RegionResolver::from_parts(&scaler, &clustering);
        let coord = Coordinate::new(40.0, -74.0);
        assert!(resolver.nearest_regions(coord, 0).unwrap().is_empty());
        assert_eq!(resolver.nearest_regions(coord, 50).unwrap().len(), 4);
    }

    #[test]
    fn test_nearest_region() {
        let (scaler, clustering) = fixtures();
        let resolver = RegionResolver::from_parts(&scaler, &clustering);
        assert_eq!(
            resolver.nearest_region(Coordinate::new(45.0, -69.0)).unwrap(),
            RegionId::new(3)
        );
    }

    #[test]
    fn test_non_finite_coordinate_rejected() {
        let (scaler, clustering) = fixtures();
        let resolver = RegionResolver::from_parts(&scaler, &clustering);
        let err = resolver
            .nearest_regions(Coordinate::new(f64::NAN, -74.0), 3)
            .unwrap_err();
        assert!(matches!(err, DemandError::InvalidInput(_)));
    }
}
