//! Column encoder mapping model inputs into the regressor's feature space.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::{ArtifactError, ArtifactResult};
use super::pipeline::Transform;
use crate::models::ModelInput;

/// How a single input column is encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnEncoding {
    /// One indicator per known category, in category order.
    OneHot { categories: Vec<f64> },
    /// Position of the value in the category list.
    Ordinal { categories: Vec<f64> },
    /// Value copied unchanged.
    Passthrough,
}

impl ColumnEncoding {
    fn width(&self) -> usize {
        match self {
            ColumnEncoding::OneHot { categories } => categories.len(),
            ColumnEncoding::Ordinal { .. } | ColumnEncoding::Passthrough => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub column: String,
    #[serde(flatten)]
    pub encoding: ColumnEncoding,
}

/// Ordered list of column encodings; output columns follow list order.
///
/// Categories the encoder was not fit on are rejected rather than
/// silently encoded as all-zero rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnEncoder {
    pub columns: Vec<ColumnSpec>,
}

impl ColumnEncoder {
    pub fn new(columns: Vec<ColumnSpec>) -> ArtifactResult<Self> {
        let encoder = Self { columns };
        encoder.validate()?;
        Ok(encoder)
    }

    pub fn validate(&self) -> ArtifactResult<()> {
        if self.columns.is_empty() {
            return Err(ArtifactError::invalid("encoder", "no columns"));
        }
        let mut seen = HashSet::new();
        for spec in &self.columns {
            if !ModelInput::COLUMNS.contains(&spec.column.as_str()) {
                return Err(ArtifactError::invalid(
                    "encoder",
                    format!("column '{}' is not a model input", spec.column),
                ));
            }
            if !seen.insert(spec.column.as_str()) {
                return Err(ArtifactError::invalid(
                    "encoder",
                    format!("column '{}' is encoded twice", spec.column),
                ));
            }
            match &spec.encoding {
                ColumnEncoding::OneHot { categories } | ColumnEncoding::Ordinal { categories } => {
                    if categories.is_empty() {
                        return Err(ArtifactError::invalid(
                            "encoder",
                            format!("column '{}' has no categories", spec.column),
                        ));
                    }
                    let mut sorted = categories.clone();
                    sorted.sort_by(f64::total_cmp);
                    if sorted.windows(2).any(|w| w[0] == w[1]) {
                        return Err(ArtifactError::invalid(
                            "encoder",
                            format!("column '{}' has duplicate categories", spec.column),
                        ));
                    }
                }
                ColumnEncoding::Passthrough => {}
            }
        }
        Ok(())
    }

    pub fn encode_row(&self, input: &ModelInput) -> ArtifactResult<Vec<f64>> {
        let mut out = Vec::with_capacity(self.output_width());
        for spec in &self.columns {
            let value = input.value(&spec.column).ok_or_else(|| {
                ArtifactError::invalid("encoder", format!("unknown column '{}'", spec.column))
            })?;
            match &spec.encoding {
                ColumnEncoding::OneHot { categories } => {
                    let position = category_position(&spec.column, categories, value)?;
                    out.extend((0..categories.len()).map(|i| if i == position { 1.0 } else { 0.0 }));
                }
                ColumnEncoding::Ordinal { categories } => {
                    let position = category_position(&spec.column, categories, value)?;
                    out.push(position as f64);
                }
                ColumnEncoding::Passthrough => out.push(value),
            }
        }
        Ok(out)
    }
}

fn category_position(column: &str, categories: &[f64], value: f64) -> ArtifactResult<usize> {
    categories
        .iter()
        .position(|c| *c == value)
        .ok_or_else(|| ArtifactError::UnknownCategory {
            column: column.to_string(),
            value,
        })
}

impl Transform for ColumnEncoder {
    fn output_width(&self) -> usize {
        self.columns.iter().map(|spec| spec.encoding.width()).sum()
    }

    fn transform(&self, inputs: &[ModelInput]) -> ArtifactResult<Vec<Vec<f64>>> {
        inputs.iter().map(|input| self.encode_row(input)).collect()
    }
}
