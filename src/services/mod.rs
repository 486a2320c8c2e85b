// Service exports
pub mod artifacts;
pub mod encoders;
pub mod models;
pub mod regressor;

pub use artifacts::ConfigurationError;
pub use encoders::{CategoricalEncoder, EncoderSet, EncoderRegistry};
pub use models::ModelRegistry;
pub use regressor::{GradientBoostedTrees, InferenceError, RegressionTree, Regressor, TreeNode};
