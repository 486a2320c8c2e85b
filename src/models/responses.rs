use serde::{Deserialize, Serialize};
use crate::models::domain::{LoadPrediction, PredictionResult};

/// Response for the single-building endpoint.
///
/// Values are single-element arrays, mirroring the vectorized model output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub heating_load_prediction: Vec<f64>,
    pub cooling_load_prediction: Vec<f64>,
}

impl From<LoadPrediction> for PredictResponse {
    fn from(prediction: LoadPrediction) -> Self {
        Self {
            heating_load_prediction: vec![prediction.heating_load],
            cooling_load_prediction: vec![prediction.cooling_load],
        }
    }
}

/// One entry of the batch endpoint response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPredictionItem {
    pub id: serde_json::Value,
    pub heating_load_prediction: f64,
    pub cooling_load_prediction: f64,
}

impl From<PredictionResult> for BatchPredictionItem {
    fn from(result: PredictionResult) -> Self {
        Self {
            id: result.id,
            heating_load_prediction: result.heating_load,
            cooling_load_prediction: result.cooling_load,
        }
    }
}

/// Versions of the loaded model artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelVersions {
    pub heating: String,
    pub cooling: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub models: ModelVersions,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
