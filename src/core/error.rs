use crate::models::{CategoricalAttribute, Target};
use crate::services::InferenceError;
use thiserror::Error;

/// Per-request failures of the prediction pipeline
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown {attribute} value '{value}' for {target} model (row {row})")]
    UnknownCategory {
        target: Target,
        attribute: CategoricalAttribute,
        value: String,
        row: usize,
    },

    #[error("Inference failed for {target} model: {source}")]
    Inference {
        target: Target,
        #[source]
        source: InferenceError,
    },
}

impl PredictionError {
    /// Whether the caller sent something the pipeline cannot accept
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PredictionError::Inference { .. })
    }

    /// Short machine-readable kind for error responses
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::InvalidInput(_) => "invalid_input",
            PredictionError::UnknownCategory { .. } => "unknown_category",
            PredictionError::Inference { .. } => "inference_error",
        }
    }
}
