// Core pipeline exports
pub mod error;
pub mod features;
pub mod service;

pub use error::PredictionError;
pub use features::{FeatureBuilder, FeatureMatrix};
pub use service::PredictionService;
