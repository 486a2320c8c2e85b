use crate::core::FeatureMatrix;
use crate::models::{FeatureColumn, Target};
use crate::services::artifacts::{read_artifact, ConfigurationError};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors raised when a model rejects a feature matrix
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Feature matrix has {actual} columns, model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Model returned {actual} predictions for {expected} rows")]
    RowCount { expected: usize, actual: usize },

    #[error("Model produced a non-finite value for row {0}")]
    NonFinite(usize),
}

/// A fitted regression model.
///
/// Implementations must be pure: the same matrix always yields the same
/// output, one value per row in row order.
pub trait Regressor: Send + Sync {
    fn version(&self) -> &str;

    fn n_features(&self) -> usize;

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, InferenceError>;
}

/// Tree node as exported by the training pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Walk from the root to a leaf. Rows with `x[feature] <= threshold` go left.
    fn evaluate(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    /// Check that every walk terminates inside the node array
    fn check(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                threshold,
            } = *node
            {
                if feature >= n_features {
                    return Err(format!("node {i} splits on feature {feature} of {n_features}"));
                }
                if threshold.is_nan() {
                    return Err(format!("node {i} has a NaN threshold"));
                }
                for child in [left, right] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(format!("node {i} has invalid child {child}"));
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ModelArtifact {
    GradientBoosting(GradientBoostingArtifact),
}

#[derive(Debug, Deserialize)]
struct GradientBoostingArtifact {
    version: String,
    #[serde(default)]
    target: Option<Target>,
    feature_names: Vec<String>,
    init: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

/// Gradient-boosted regression tree ensemble.
///
/// Raw prediction is `init + learning_rate * sum(tree(x))`.
#[derive(Debug, Clone)]
pub struct GradientBoostedTrees {
    version: String,
    n_features: usize,
    init: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedTrees {
    pub fn new(
        version: impl Into<String>,
        n_features: usize,
        init: f64,
        learning_rate: f64,
        trees: Vec<RegressionTree>,
    ) -> Result<Self, String> {
        if !init.is_finite() || !learning_rate.is_finite() {
            return Err("init and learning_rate must be finite".to_string());
        }
        for (i, tree) in trees.iter().enumerate() {
            tree.check(n_features).map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(Self {
            version: version.into(),
            n_features,
            init,
            learning_rate,
            trees,
        })
    }

    /// Load `model.json` from a target's artifact directory.
    ///
    /// The model must have been fitted on exactly the feature schema columns,
    /// in order.
    pub fn load(dir: &Path, target: Target) -> Result<Self, ConfigurationError> {
        let path = dir.join("model.json");
        let ModelArtifact::GradientBoosting(artifact) = read_artifact(&path)?;

        if let Some(fitted_for) = artifact.target {
            if fitted_for != target {
                return Err(ConfigurationError::invalid(
                    &path,
                    format!("model was fitted for {fitted_for}, expected {target}"),
                ));
            }
        }

        let expected: Vec<&str> = FeatureColumn::SCHEMA.iter().map(|c| c.name()).collect();
        if artifact.feature_names != expected {
            return Err(ConfigurationError::invalid(
                &path,
                format!(
                    "feature names {:?} do not match schema {:?}",
                    artifact.feature_names, expected
                ),
            ));
        }

        let model = Self::new(
            artifact.version,
            expected.len(),
            artifact.init,
            artifact.learning_rate,
            artifact.trees,
        )
        .map_err(|reason| ConfigurationError::invalid(&path, reason))?;

        tracing::info!(
            "Loaded {} model {} from {} ({} trees)",
            target,
            model.version,
            path.display(),
            model.trees.len()
        );

        Ok(model)
    }
}

impl Regressor for GradientBoostedTrees {
    fn version(&self) -> &str {
        &self.version
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, InferenceError> {
        if features.n_cols() != self.n_features {
            return Err(InferenceError::ShapeMismatch {
                expected: self.n_features,
                actual: features.n_cols(),
            });
        }

        features
            .rows()
            .enumerate()
            .map(|(i, row)| {
                let boost: f64 = self.trees.iter().map(|t| t.evaluate(row)).sum();
                let value = self.init + self.learning_rate * boost;
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(InferenceError::NonFinite(i))
                }
            })
            .collect()
    }
}
