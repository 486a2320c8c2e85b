use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One of the two independent prediction problems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Heating,
    Cooling,
}

impl Target {
    pub const ALL: [Target; 2] = [Target::Heating, Target::Cooling];

    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Heating => "heating",
            Target::Cooling => "cooling",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Building attributes that go through a fitted categorical encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalAttribute {
    Type,
    Shape,
    EnergyCode,
    HvacCategory,
}

impl CategoricalAttribute {
    pub const ALL: [CategoricalAttribute; 4] = [
        CategoricalAttribute::Type,
        CategoricalAttribute::Shape,
        CategoricalAttribute::EnergyCode,
        CategoricalAttribute::HvacCategory,
    ];

    /// Column name the encoder was fitted against
    pub fn column_name(&self) -> &'static str {
        match self {
            CategoricalAttribute::Type => "X1_Type",
            CategoricalAttribute::Shape => "X3_Shape",
            CategoricalAttribute::EnergyCode => "X13_EnergyCode",
            CategoricalAttribute::HvacCategory => "X14_HVAC",
        }
    }

    /// File name of the exported encoder inside a target's artifact directory
    pub fn artifact_file(&self) -> String {
        format!("{}_encoder.json", self.column_name())
    }
}

impl fmt::Display for CategoricalAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Fixed, ordered column schema both models were fitted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureColumn {
    Type,
    Shape,
    Orientation,
    Height,
    Stories,
    WallArea,
    WindowArea,
    RoofArea,
    EnergyCode,
    HvacCategory,
}

impl FeatureColumn {
    pub const SCHEMA: [FeatureColumn; 10] = [
        FeatureColumn::Type,
        FeatureColumn::Shape,
        FeatureColumn::Orientation,
        FeatureColumn::Height,
        FeatureColumn::Stories,
        FeatureColumn::WallArea,
        FeatureColumn::WindowArea,
        FeatureColumn::RoofArea,
        FeatureColumn::EnergyCode,
        FeatureColumn::HvacCategory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FeatureColumn::Type => "X1_Type",
            FeatureColumn::Shape => "X3_Shape",
            FeatureColumn::Orientation => "X5_Orientation",
            FeatureColumn::Height => "X6_Height",
            FeatureColumn::Stories => "X7_Stories",
            FeatureColumn::WallArea => "X9_WallArea",
            FeatureColumn::WindowArea => "X10_WindowArea",
            FeatureColumn::RoofArea => "X12_RoofArea",
            FeatureColumn::EnergyCode => "X13_EnergyCode",
            FeatureColumn::HvacCategory => "X14_HVAC",
        }
    }

    /// The encoder backing this column, if it is categorical
    pub fn categorical(&self) -> Option<CategoricalAttribute> {
        match self {
            FeatureColumn::Type => Some(CategoricalAttribute::Type),
            FeatureColumn::Shape => Some(CategoricalAttribute::Shape),
            FeatureColumn::EnergyCode => Some(CategoricalAttribute::EnergyCode),
            FeatureColumn::HvacCategory => Some(CategoricalAttribute::HvacCategory),
            _ => None,
        }
    }
}

/// Category label as sent by clients or stored in an encoder vocabulary.
///
/// Labels arrive either as strings or as numbers (the map front-end sends
/// integer codes). Numbers are canonicalised so that `1` and `1.0` both
/// become `"1"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CategoryLabel(String);

impl CategoryLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_number(number: &serde_json::Number) -> Self {
        if let Some(i) = number.as_i64() {
            return Self(i.to_string());
        }
        if let Some(u) = number.as_u64() {
            return Self(u.to_string());
        }
        match number.as_f64() {
            Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Self((f as i64).to_string())
            }
            _ => Self(number.to_string()),
        }
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryLabel {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl<'de> Deserialize<'de> for CategoryLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawLabel {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawLabel::deserialize(deserializer)? {
            RawLabel::Text(text) => CategoryLabel(text),
            RawLabel::Number(number) => CategoryLabel::from_number(&number),
        })
    }
}

/// One building's attributes
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingRecord {
    /// Opaque client identifier (batch mode only)
    pub id: Option<serde_json::Value>,
    pub building_type: CategoryLabel,
    pub shape: CategoryLabel,
    pub orientation: f64,
    pub height: f64,
    pub stories: f64,
    pub wall_area: f64,
    pub window_area: f64,
    pub roof_area: f64,
    pub energy_code: CategoryLabel,
    pub hvac_category: CategoryLabel,
}

impl BuildingRecord {
    pub fn label(&self, attribute: CategoricalAttribute) -> &CategoryLabel {
        match attribute {
            CategoricalAttribute::Type => &self.building_type,
            CategoricalAttribute::Shape => &self.shape,
            CategoricalAttribute::EnergyCode => &self.energy_code,
            CategoricalAttribute::HvacCategory => &self.hvac_category,
        }
    }

    /// Raw numeric value of a non-categorical column
    pub fn numeric(&self, column: FeatureColumn) -> Option<f64> {
        match column {
            FeatureColumn::Orientation => Some(self.orientation),
            FeatureColumn::Height => Some(self.height),
            FeatureColumn::Stories => Some(self.stories),
            FeatureColumn::WallArea => Some(self.wall_area),
            FeatureColumn::WindowArea => Some(self.window_area),
            FeatureColumn::RoofArea => Some(self.roof_area),
            _ => None,
        }
    }

    /// Normalization divisor: roof area times story count
    pub fn footprint_divisor(&self) -> f64 {
        self.roof_area * self.stories
    }
}

/// Normalized heating and cooling loads for one building
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadPrediction {
    pub heating_load: f64,
    pub cooling_load: f64,
}

/// One batch result, row-aligned with the input
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// Client id if given, otherwise the zero-based input position
    pub id: serde_json::Value,
    pub heating_load: f64,
    pub cooling_load: f64,
}
