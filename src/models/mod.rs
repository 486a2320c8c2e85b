// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Target, CategoricalAttribute, FeatureColumn, CategoryLabel, BuildingRecord, LoadPrediction, PredictionResult};
pub use requests::{BuildingRequest, BatchPredictRequest};
pub use responses::{PredictResponse, BatchPredictionItem, HealthResponse, ModelVersions, ErrorResponse};
