//! Assembles the map payload: candidate regions, predictions, points and legend.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use rand::Rng;

use crate::artifacts::ArtifactContext;
use crate::models::time::{forecast_interval_end, format_timestamp};
use crate::models::{Coordinate, RegionId};
use crate::routes::demand_map::{DemandMapData, LegendEntry, LocationInfo, MapMode, MapPoint};
use crate::routes::predictions::{PredictionsData, RegionPrediction};
use crate::routes::regions::{RegionInfo, RegionsData};

use super::demand_predictor::DemandPredictor;
use super::error::DemandResult;
use super::region_resolver::RegionResolver;

/// Default number of regions shown in neighborhood mode.
pub const DEFAULT_NEIGHBORHOOD_REGIONS: usize = 9;

/// Region colours, indexed by region id modulo the palette length.
pub const REGION_PALETTE: [&str; 30] = [
    "#FF0000", "#FF4500", "#FF8C00", "#FFD700", "#ADFF2F", "#32CD32", "#008000", "#006400",
    "#00FF00", "#7CFC00", "#00FA9A", "#00FFFF", "#40E0D0", "#4682B4", "#1E90FF", "#0000FF",
    "#0000CD", "#8A2BE2", "#9932CC", "#BA55D3", "#FF00FF", "#FF1493", "#C71585", "#FF4500",
    "#FF6347", "#FFA07A", "#FFDAB9", "#FFE4B5", "#F5DEB3", "#EEE8AA",
];

pub fn color_for_region(region: RegionId) -> &'static str {
    REGION_PALETTE[region.index() % REGION_PALETTE.len()]
}

/// Parameters of one demand map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandMapRequest {
    pub timestamp: NaiveDateTime,
    pub mode: MapMode,
    /// Where the user is; drives the neighborhood and the current-region marker.
    pub location: Coordinate,
    pub neighborhood_size: usize,
}

impl DemandMapRequest {
    pub fn new(timestamp: NaiveDateTime, mode: MapMode, location: Coordinate) -> Self {
        Self {
            timestamp,
            mode,
            location,
            neighborhood_size: DEFAULT_NEIGHBORHOOD_REGIONS,
        }
    }

    pub fn with_neighborhood_size(mut self, k: usize) -> Self {
        self.neighborhood_size = k;
        self
    }
}

/// Build the full map payload for `request`.
pub fn build_demand_map(
    context: &ArtifactContext,
    request: &DemandMapRequest,
) -> DemandResult<DemandMapData> {
    let resolver = RegionResolver::new(context);
    let predictor = DemandPredictor::new(context);
    let current = resolver.nearest_region(request.location)?;

    let predictions = match request.mode {
        MapMode::Complete => predictor.predict_all(request.timestamp)?,
        MapMode::Neighborhood => {
            let regions = resolver.nearest_regions(request.location, request.neighborhood_size)?;
            predictor.predict_demand(request.timestamp, &regions)?
        }
    };

    let points: Vec<MapPoint> = match request.mode {
        MapMode::Complete => context.plot().points().iter().map(map_point).collect(),
        MapMode::Neighborhood => {
            let candidates: BTreeSet<RegionId> = predictions.keys().copied().collect();
            context
                .plot()
                .filter_regions(&candidates)
                .map(map_point)
                .collect()
        }
    };

    tracing::info!(
        timestamp = %request.timestamp,
        mode = %request.mode,
        regions = predictions.len(),
        points = points.len(),
        current_region = %current,
        "Built demand map"
    );

    Ok(DemandMapData {
        timestamp: format_timestamp(&request.timestamp),
        interval_end: forecast_interval_end(&request.timestamp)
            .format("%H:%M")
            .to_string(),
        mode: request.mode,
        location: LocationInfo {
            latitude: request.location.latitude,
            longitude: request.location.longitude,
            region: current,
        },
        points,
        legend: build_legend(&predictions, current),
    })
}

fn map_point(point: &crate::models::PlotPoint) -> MapPoint {
    MapPoint {
        latitude: point.pickup_latitude,
        longitude: point.pickup_longitude,
        region: point.region,
        color: color_for_region(point.region).to_string(),
    }
}

/// Legend rows in region order. The first maximum is the highest-demand region.
pub fn build_legend(predictions: &BTreeMap<RegionId, f64>, current: RegionId) -> Vec<LegendEntry> {
    let mut highest: Option<(RegionId, f64)> = None;
    for (region, demand) in predictions {
        if highest.map_or(true, |(_, best)| *demand > best) {
            highest = Some((*region, *demand));
        }
    }

    predictions
        .iter()
        .map(|(region, demand)| LegendEntry {
            region: *region,
            color: color_for_region(*region).to_string(),
            demand: *demand,
            pickups: demand.trunc() as u64,
            is_current: *region == current,
            is_highest: highest.map(|(r, _)| r) == Some(*region),
        })
        .collect()
}

/// Predictions for `regions`, or every region at `timestamp` when `None`.
pub fn build_predictions(
    context: &ArtifactContext,
    timestamp: NaiveDateTime,
    regions: Option<&[RegionId]>,
) -> DemandResult<PredictionsData> {
    let predictor = DemandPredictor::new(context);
    let predictions = match regions {
        Some(regions) => predictor.predict_demand(timestamp, regions)?,
        None => predictor.predict_all(timestamp)?,
    };
    Ok(PredictionsData {
        timestamp: format_timestamp(&timestamp),
        interval_end: forecast_interval_end(&timestamp).format("%H:%M").to_string(),
        predictions: predictions
            .into_iter()
            .map(|(region, demand)| RegionPrediction { region, demand })
            .collect(),
    })
}

/// Every region of the clustering model with its colour and plot sample count.
pub fn region_summaries(context: &ArtifactContext) -> RegionsData {
    let counts = context.plot().region_counts();
    let regions = context
        .region_ids()
        .map(|region| RegionInfo {
            region,
            color: color_for_region(region).to_string(),
            sample_count: counts.get(&region).copied().unwrap_or(0),
        })
        .collect();
    RegionsData {
        region_count: context.region_count(),
        regions,
    }
}

/// Random historical pickup location, used when a client sends none.
pub fn sample_reference_location<R: Rng + ?Sized>(
    context: &ArtifactContext,
    rng: &mut R,
) -> Option<Coordinate> {
    context.plot().sample(rng).map(|point| point.coordinate())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predictions(values: &[(u32, f64)]) -> BTreeMap<RegionId, f64> {
        values.iter().map(|(r, v)| (RegionId::new(*r), *v)).collect()
    }

    #[test]
    fn test_palette_wraps() {
        assert_eq!(color_for_region(RegionId::new(0)), "#FF0000");
        assert_eq!(color_for_region(RegionId::new(29)), "#EEE8AA");
        assert_eq!(color_for_region(RegionId::new(30)), "#FF0000");
    }

    #[test]
    fn test_legend_first_maximum_wins() {
        let legend = build_legend(&predictions(&[(1, 5.0), (3, 9.0), (4, 9.0)]), RegionId::new(4));
        let highest: Vec<u32> = legend
            .iter()
            .filter(|e| e.is_highest)
            .map(|e| e.region.value())
            .collect();
        assert_eq!(highest, vec![3]);
        let current: Vec<u32> = legend
            .iter()
            .filter(|e| e.is_current)
            .map(|e| e.region.value())
            .collect();
        assert_eq!(current, vec![4]);
    }

    #[test]
    fn test_legend_truncates_pickups() {
        let legend = build_legend(&predictions(&[(0, 12.97)]), RegionId::new(8));
        assert_eq!(legend[0].pickups, 12);
        assert!(!legend[0].is_current);
    }

    #[test]
    fn test_empty_legend() {
        assert!(build_legend(&BTreeMap::new(), RegionId::new(0)).is_empty());
    }

    #[test]
    fn test_request_defaults() {
        let ts = chrono::NaiveDate::from_ymd_opt(2016, 3, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let request = DemandMapRequest::new(ts, MapMode::Neighborhood, Coordinate::new(40.75, -73.98));
        assert_eq!(request.neighborhood_size, DEFAULT_NEIGHBORHOOD_REGIONS);
        assert_eq!(request.with_neighborhood_size(3).neighborhood_size, 3);
    }
}
