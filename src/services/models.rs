use crate::core::FeatureMatrix;
use crate::models::Target;
use crate::services::artifacts::ConfigurationError;
use crate::services::regressor::{GradientBoostedTrees, InferenceError, Regressor};
use std::path::Path;
use std::sync::Arc;

/// Per-target fitted regression models, loaded once at startup and read-only thereafter
#[derive(Clone)]
pub struct ModelRegistry {
    heating: Arc<dyn Regressor>,
    cooling: Arc<dyn Regressor>,
}

impl ModelRegistry {
    pub fn new(heating: Arc<dyn Regressor>, cooling: Arc<dyn Regressor>) -> Self {
        Self { heating, cooling }
    }

    /// Load both targets' models from their artifact directories
    pub fn load(
        heating_dir: impl AsRef<Path>,
        cooling_dir: impl AsRef<Path>,
    ) -> Result<Self, ConfigurationError> {
        let heating = GradientBoostedTrees::load(heating_dir.as_ref(), Target::Heating)?;
        let cooling = GradientBoostedTrees::load(cooling_dir.as_ref(), Target::Cooling)?;
        Ok(Self::new(Arc::new(heating), Arc::new(cooling)))
    }

    pub fn model(&self, target: Target) -> &dyn Regressor {
        match target {
            Target::Heating => self.heating.as_ref(),
            Target::Cooling => self.cooling.as_ref(),
        }
    }

    pub fn version(&self, target: Target) -> &str {
        self.model(target).version()
    }

    /// Raw load predictions for every row of `features`, in row order
    pub fn predict(
        &self,
        target: Target,
        features: &FeatureMatrix,
    ) -> Result<Vec<f64>, InferenceError> {
        let model = self.model(target);
        if features.n_cols() != model.n_features() {
            return Err(InferenceError::ShapeMismatch {
                expected: model.n_features(),
                actual: features.n_cols(),
            });
        }
        let predictions = model.predict(features)?;
        if predictions.len() != features.n_rows() {
            return Err(InferenceError::RowCount {
                expected: features.n_rows(),
                actual: predictions.len(),
            });
        }
        Ok(predictions)
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("heating", &self.heating.version())
            .field("cooling", &self.cooling.version())
            .finish()
    }
}
