use crate::models::{CategoricalAttribute, CategoryLabel, Target};
use crate::services::artifacts::{read_artifact, ConfigurationError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Exported label encoder as written by the training pipeline
#[derive(Debug, Deserialize)]
struct EncoderArtifact {
    attribute: String,
    classes: Vec<CategoryLabel>,
}

/// Pre-fitted mapping from a finite label vocabulary to numeric codes.
///
/// A label's code is its position in the fitted class list. Immutable once
/// constructed.
#[derive(Debug, Clone)]
pub struct CategoricalEncoder {
    attribute: CategoricalAttribute,
    classes: Vec<CategoryLabel>,
    codes: HashMap<CategoryLabel, f64>,
}

impl CategoricalEncoder {
    /// Build an encoder from its fitted classes. Returns `None` if the
    /// vocabulary is empty or contains duplicates.
    pub fn new(attribute: CategoricalAttribute, classes: Vec<CategoryLabel>) -> Option<Self> {
        if classes.is_empty() {
            return None;
        }

        let codes: HashMap<CategoryLabel, f64> = classes
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i as f64))
            .collect();

        if codes.len() != classes.len() {
            return None;
        }

        Some(Self {
            attribute,
            classes,
            codes,
        })
    }

    /// Load `<column>_encoder.json` for `attribute` from a target's artifact directory
    pub fn load(dir: &Path, attribute: CategoricalAttribute) -> Result<Self, ConfigurationError> {
        let path = dir.join(attribute.artifact_file());
        let artifact: EncoderArtifact = read_artifact(&path)?;

        if artifact.attribute != attribute.column_name() {
            return Err(ConfigurationError::invalid(
                &path,
                format!(
                    "encoder was fitted for {}, expected {}",
                    artifact.attribute,
                    attribute.column_name()
                ),
            ));
        }

        Self::new(attribute, artifact.classes).ok_or_else(|| {
            ConfigurationError::invalid(&path, "vocabulary is empty or has duplicate classes")
        })
    }

    pub fn attribute(&self) -> CategoricalAttribute {
        self.attribute
    }

    pub fn classes(&self) -> &[CategoryLabel] {
        &self.classes
    }

    /// Numeric code for a label, or `None` if it is outside the fitted vocabulary
    pub fn encode(&self, label: &CategoryLabel) -> Option<f64> {
        self.codes.get(label).copied()
    }
}

/// The four encoders fitted for one target
#[derive(Debug, Clone)]
pub struct EncoderSet {
    encoders: HashMap<CategoricalAttribute, CategoricalEncoder>,
}

impl EncoderSet {
    /// Assemble a set from fitted encoders. Returns `None` unless every
    /// categorical attribute is covered.
    pub fn new(encoders: Vec<CategoricalEncoder>) -> Option<Self> {
        let encoders: HashMap<CategoricalAttribute, CategoricalEncoder> = encoders
            .into_iter()
            .map(|e| (e.attribute(), e))
            .collect();

        if CategoricalAttribute::ALL.iter().all(|a| encoders.contains_key(a)) {
            Some(Self { encoders })
        } else {
            None
        }
    }

    pub fn load(dir: &Path) -> Result<Self, ConfigurationError> {
        let mut encoders = HashMap::new();
        for attribute in CategoricalAttribute::ALL {
            let encoder = CategoricalEncoder::load(dir, attribute)?;
            tracing::info!(
                "Loaded {} encoder from {} ({} classes)",
                attribute,
                dir.display(),
                encoder.classes().len()
            );
            encoders.insert(attribute, encoder);
        }
        Ok(Self { encoders })
    }

    pub fn get(&self, attribute: CategoricalAttribute) -> &CategoricalEncoder {
        // Construction guarantees every attribute is present
        &self.encoders[&attribute]
    }
}

/// Per-target categorical encoders, loaded once at startup and read-only thereafter
#[derive(Debug, Clone)]
pub struct EncoderRegistry {
    heating: EncoderSet,
    cooling: EncoderSet,
}

impl EncoderRegistry {
    pub fn new(heating: EncoderSet, cooling: EncoderSet) -> Self {
        Self { heating, cooling }
    }

    /// Load both targets' encoders from their artifact directories
    pub fn load(
        heating_dir: impl AsRef<Path>,
        cooling_dir: impl AsRef<Path>,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            heating: EncoderSet::load(heating_dir.as_ref())?,
            cooling: EncoderSet::load(cooling_dir.as_ref())?,
        })
    }

    pub fn encoders(&self, target: Target) -> &EncoderSet {
        match target {
            Target::Heating => &self.heating,
            Target::Cooling => &self.cooling,
        }
    }

    pub fn get(&self, target: Target, attribute: CategoricalAttribute) -> &CategoricalEncoder {
        self.encoders(target).get(attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<CategoryLabel> {
        values.iter().map(|v| CategoryLabel::from(*v)).collect()
    }

    #[test]
    fn test_codes_follow_class_order() {
        let encoder =
            CategoricalEncoder::new(CategoricalAttribute::Shape, labels(&["L-Shape", "Rectangle"]))
                .unwrap();
        assert_eq!(encoder.encode(&"L-Shape".into()), Some(0.0));
        assert_eq!(encoder.encode(&"Rectangle".into()), Some(1.0));
        assert_eq!(encoder.encode(&"Circle".into()), None);
    }

    #[test]
    fn test_rejects_duplicate_or_empty_vocabulary() {
        assert!(CategoricalEncoder::new(CategoricalAttribute::Type, labels(&["A", "A"])).is_none());
        assert!(CategoricalEncoder::new(CategoricalAttribute::Type, vec![]).is_none());
    }

    #[test]
    fn test_encoder_set_requires_every_attribute() {
        let partial = vec![
            CategoricalEncoder::new(CategoricalAttribute::Type, labels(&["Office"])).unwrap(),
            CategoricalEncoder::new(CategoricalAttribute::Shape, labels(&["Rectangle"])).unwrap(),
        ];
        assert!(EncoderSet::new(partial).is_none());
    }

    #[test]
    fn test_missing_encoder_artifact_is_configuration_error() {
        let err = EncoderSet::load(Path::new("no/such/dir")).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingArtifact(_)));
    }
}
