//! Energy Load - heating and cooling load prediction service
//!
//! This library provides the prediction pipeline behind the building energy
//! map: per-target categorical encoding of building attributes, inference
//! with pre-trained regression models, and normalization of raw loads by
//! roof area and story count.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{FeatureBuilder, FeatureMatrix, PredictionError, PredictionService};
pub use crate::models::{BuildingRecord, CategoryLabel, LoadPrediction, PredictionResult, Target};
pub use crate::services::{ConfigurationError, EncoderRegistry, ModelRegistry};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        assert_eq!(Target::ALL.len(), 2);
        assert_eq!(Target::Heating.to_string(), "heating");
    }
}
