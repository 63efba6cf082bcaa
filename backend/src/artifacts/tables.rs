//! Feature table and plot dataset loaded from CSV.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::NaiveDateTime;
use rand::seq::SliceRandom;
use rand::Rng;

use super::error::{ArtifactError, ArtifactResult};
use crate::models::{FeatureRow, PlotPoint, RegionId};

/// Time-indexed feature rows.
///
/// Rows are grouped by timestamp and sorted by region id inside each
/// group. `(timestamp, region)` is unique.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    rows: BTreeMap<NaiveDateTime, Vec<FeatureRow>>,
    len: usize,
}

impl FeatureTable {
    pub fn from_rows(rows: impl IntoIterator<Item = FeatureRow>) -> ArtifactResult<Self> {
        let mut grouped: BTreeMap<NaiveDateTime, Vec<FeatureRow>> = BTreeMap::new();
        let mut len = 0;
        for row in rows {
            if !row.numeric_fields_finite() {
                return Err(ArtifactError::invalid(
                    "feature table",
                    format!(
                        "non-finite value at {} region {}",
                        row.timestamp, row.region
                    ),
                ));
            }
            grouped.entry(row.timestamp).or_default().push(row);
            len += 1;
        }
        for (timestamp, group) in grouped.iter_mut() {
            group.sort_by_key(|row| row.region);
            if let Some(pair) = group.windows(2).find(|w| w[0].region == w[1].region) {
                return Err(ArtifactError::invalid(
                    "feature table",
                    format!("duplicate row for {} region {}", timestamp, pair[0].region),
                ));
            }
        }
        Ok(Self { rows: grouped, len })
    }

    pub fn from_csv_path(path: &Path) -> ArtifactResult<Self> {
        let rows = read_csv::<FeatureRow>(path)?;
        let table = Self::from_rows(rows)?;
        tracing::debug!(
            path = %path.display(),
            rows = table.len(),
            timestamps = table.rows.len(),
            "Loaded feature table"
        );
        Ok(table)
    }

    /// Rows at `timestamp`, ascending by region. Empty when the key is absent.
    pub fn rows_at(&self, timestamp: &NaiveDateTime) -> &[FeatureRow] {
        self.rows.get(timestamp).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn timestamps(&self) -> impl Iterator<Item = &NaiveDateTime> {
        self.rows.keys()
    }

    /// Every region that appears anywhere in the table.
    pub fn regions(&self) -> BTreeSet<RegionId> {
        self.rows
            .values()
            .flat_map(|group| group.iter().map(|row| row.region))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Historical pickup locations labelled with their region.
#[derive(Debug, Clone, Default)]
pub struct PlotDataset {
    points: Vec<PlotPoint>,
}

impl PlotDataset {
    pub fn from_points(points: Vec<PlotPoint>) -> ArtifactResult<Self> {
        if let Some(point) = points.iter().find(|p| !p.coordinate().is_finite()) {
            return Err(ArtifactError::invalid(
                "plot dataset",
                format!("non-finite coordinate in region {}", point.region),
            ));
        }
        Ok(Self { points })
    }

    pub fn from_csv_path(path: &Path) -> ArtifactResult<Self> {
        let dataset = Self::from_points(read_csv::<PlotPoint>(path)?)?;
        tracing::debug!(
            path = %path.display(),
            points = dataset.len(),
            "Loaded plot dataset"
        );
        Ok(dataset)
    }

    pub fn points(&self) -> &[PlotPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn region_ids(&self) -> BTreeSet<RegionId> {
        self.points.iter().map(|p| p.region).collect()
    }

    /// Number of points per region.
    pub fn region_counts(&self) -> BTreeMap<RegionId, usize> {
        let mut counts = BTreeMap::new();
        for point in &self.points {
            *counts.entry(point.region).or_insert(0) += 1;
        }
        counts
    }

    /// Points whose region is in `regions`, in dataset order.
    pub fn filter_regions<'a>(
        &'a self,
        regions: &'a BTreeSet<RegionId>,
    ) -> impl Iterator<Item = &'a PlotPoint> + 'a {
        self.points.iter().filter(move |p| regions.contains(&p.region))
    }

    /// Uniformly random point, `None` for an empty dataset.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&PlotPoint> {
        self.points.choose(rng)
    }
}

fn read_csv<T: serde::de::DeserializeOwned>(path: &Path) -> ArtifactResult<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| ArtifactError::Table {
            path: path.to_path_buf(),
            source,
        })?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| ArtifactError::Table {
            path: path.to_path_buf(),
            source,
        })
}
