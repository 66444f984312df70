//! Gradient-boosted tree ensembles
//!
//! The wider platform trains price models as LightGBM regressors; this
//! module understands the LightGBM text model format (regression objective
//! only) so those models can be imported and evaluated without the native
//! library. Parsed ensembles serialize through serde like any other
//! [`Regressor`](crate::Regressor) variant.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One decision tree in flattened LightGBM layout.
///
/// `left_child`/`right_child` entries are either an internal node index
/// (>= 0) or `-(leaf_index + 1)` for a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtTree {
    split_features: Vec<usize>,
    thresholds: Vec<f64>,
    left_child: Vec<i32>,
    right_child: Vec<i32>,
    leaf_values: Vec<f64>,
    shrinkage: f64,
}

impl GbdtTree {
    fn from_lines(lines: &mut std::iter::Peekable<std::str::Lines<'_>>) -> Result<Self> {
        let mut num_leaves: Option<usize> = None;
        let mut split_features = Vec::new();
        let mut thresholds = Vec::new();
        let mut left_child = Vec::new();
        let mut right_child = Vec::new();
        let mut leaf_values = Vec::new();
        let mut shrinkage = 1.0;

        while let Some(peeked) = lines.peek() {
            if peeked.starts_with("Tree=") {
                break;
            }
            let line = match lines.next() {
                Some(line) => line.trim(),
                None => break,
            };

            if let Some(raw) = line.strip_prefix("num_leaves=") {
                num_leaves = Some(parse_scalar(raw, "num_leaves")?);
            } else if let Some(raw) = line.strip_prefix("split_feature=") {
                split_features = parse_list(raw, "split_feature")?;
            } else if let Some(raw) = line.strip_prefix("threshold=") {
                thresholds = parse_list(raw, "threshold")?;
            } else if let Some(raw) = line.strip_prefix("left_child=") {
                left_child = parse_list(raw, "left_child")?;
            } else if let Some(raw) = line.strip_prefix("right_child=") {
                right_child = parse_list(raw, "right_child")?;
            } else if let Some(raw) = line.strip_prefix("leaf_value=") {
                leaf_values = parse_list(raw, "leaf_value")?;
            } else if let Some(raw) = line.strip_prefix("shrinkage=") {
                shrinkage = parse_scalar(raw, "shrinkage")?;
            }
        }

        let internal_nodes = split_features.len();
        if thresholds.len() != internal_nodes
            || left_child.len() != internal_nodes
            || right_child.len() != internal_nodes
        {
            return Err(ForecastError::ModelParseError(
                "Tree split/threshold/child arrays have mismatched lengths".to_string(),
            ));
        }

        if leaf_values.is_empty() {
            return Err(ForecastError::ModelParseError(
                "Tree has no leaf values".to_string(),
            ));
        }
        if let Some(declared) = num_leaves {
            if declared != leaf_values.len() {
                return Err(ForecastError::ModelParseError(format!(
                    "Tree declares {} leaves but lists {}",
                    declared,
                    leaf_values.len()
                )));
            }
        }

        Ok(Self {
            split_features,
            thresholds,
            left_child,
            right_child,
            leaf_values,
            shrinkage,
        })
    }

    /// Walk the tree to a leaf for the given feature vector
    fn predict(&self, features: &[f64]) -> f64 {
        // Stump tree: a single leaf, no splits
        if self.split_features.is_empty() {
            return self.leaf_values[0] * self.shrinkage;
        }

        let mut node = 0usize;
        loop {
            let feature_idx = self.split_features[node];
            let value = features.get(feature_idx).copied().unwrap_or(0.0);
            let child = if value <= self.thresholds[node] {
                self.left_child[node]
            } else {
                self.right_child[node]
            };

            if child < 0 {
                let leaf = (-child - 1) as usize;
                return self.leaf_values.get(leaf).copied().unwrap_or(0.0) * self.shrinkage;
            }
            node = child as usize;
        }
    }
}

/// Additive regression ensemble parsed from LightGBM model text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtRegressor {
    trees: Vec<GbdtTree>,
    feature_count: usize,
}

impl GbdtRegressor {
    /// Parse a LightGBM text model with a regression objective.
    ///
    /// Classification objectives are rejected: price prediction has no use
    /// for them and silently summing their raw scores would be wrong.
    pub fn from_model_text(text: &str) -> Result<Self> {
        let mut lines = text.lines().peekable();
        let mut trees = Vec::new();
        let mut max_feature_idx: Option<usize> = None;
        let mut objective: Option<String> = None;

        while let Some(line) = lines.next() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(raw) = trimmed.strip_prefix("objective=") {
                objective = Some(raw.trim().to_string());
            } else if let Some(raw) = trimmed.strip_prefix("max_feature_idx=") {
                max_feature_idx = Some(parse_scalar(raw, "max_feature_idx")?);
            } else if trimmed.starts_with("Tree=") {
                trees.push(GbdtTree::from_lines(&mut lines)?);
            }
        }

        if let Some(objective) = &objective {
            if objective.contains("binary") || objective.contains("multiclass") {
                return Err(ForecastError::ModelParseError(format!(
                    "Unsupported objective '{}': only regression models can be imported",
                    objective
                )));
            }
        }

        if trees.is_empty() {
            return Err(ForecastError::ModelParseError(
                "Model text contained no trees".to_string(),
            ));
        }

        let inferred = trees
            .iter()
            .flat_map(|tree| tree.split_features.iter())
            .copied()
            .max()
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let feature_count = max_feature_idx.map(|idx| idx + 1).unwrap_or(inferred);

        Ok(Self {
            trees,
            feature_count,
        })
    }

    /// Sum of all tree outputs
    pub fn predict(&self, features: &[f64]) -> f64 {
        self.trees.iter().map(|tree| tree.predict(features)).sum()
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

fn parse_scalar<T>(raw: &str, field: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|err| {
        ForecastError::ModelParseError(format!("Bad value '{}' for {}: {}", raw.trim(), field, err))
    })
}

fn parse_list<T>(raw: &str, field: &str) -> Result<Vec<T>>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    raw.split_whitespace()
        .map(|token| {
            token.parse::<T>().map_err(|err| {
                ForecastError::ModelParseError(format!(
                    "Bad value '{}' for {}: {}",
                    token, field, err
                ))
            })
        })
        .collect()
}
