use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{BuildingRecord, CategoryLabel};

/// Building attributes as posted to `/predict` and inside `/predict_all`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BuildingRequest {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(rename = "Building_Type")]
    pub building_type: CategoryLabel,
    #[serde(rename = "Building_Shape")]
    pub building_shape: CategoryLabel,
    #[serde(rename = "Orientation")]
    pub orientation: f64,
    #[validate(range(exclusive_min = 0.0))]
    #[serde(rename = "Building_Height")]
    pub building_height: f64,
    #[serde(rename = "Building_Stories")]
    pub building_stories: f64,
    #[validate(range(exclusive_min = 0.0))]
    #[serde(rename = "Wall_Area")]
    pub wall_area: f64,
    #[validate(range(exclusive_min = 0.0))]
    #[serde(rename = "Window_Area")]
    pub window_area: f64,
    #[serde(rename = "Roof_Area")]
    pub roof_area: f64,
    pub energy_code: CategoryLabel,
    pub hvac_category: CategoryLabel,
}

impl From<BuildingRequest> for BuildingRecord {
    fn from(req: BuildingRequest) -> Self {
        BuildingRecord {
            id: req.id,
            building_type: req.building_type,
            shape: req.building_shape,
            orientation: req.orientation,
            height: req.building_height,
            stories: req.building_stories,
            wall_area: req.wall_area,
            window_area: req.window_area,
            roof_area: req.roof_area,
            energy_code: req.energy_code,
            hvac_category: req.hvac_category,
        }
    }
}

/// Request to predict loads for many buildings at once
///
/// `buildings` is optional at the serde level so that a missing key can be
/// reported with its own message instead of a generic JSON error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPredictRequest {
    #[serde(default)]
    pub buildings: Option<Vec<BuildingRequest>>,
}
