use crate::core::error::PredictionError;
use crate::core::features::FeatureBuilder;
use crate::models::{BuildingRecord, LoadPrediction, PredictionResult, Target};
use crate::services::{EncoderRegistry, ModelRegistry};
use std::sync::Arc;

/// Prediction pipeline orchestrator
///
/// # Pipeline Stages
/// 1. Validate normalization divisors (`roof_area`, `stories`)
/// 2. Build one encoded feature matrix per target
/// 3. Run each target's model once over its whole matrix
/// 4. Normalize raw loads by each row's `roof_area * stories`
///
/// Single and batch predictions share the same path, so a record always
/// gets bit-identical loads whichever endpoint it came through.
#[derive(Debug, Clone)]
pub struct PredictionService {
    encoders: Arc<EncoderRegistry>,
    models: Arc<ModelRegistry>,
}

impl PredictionService {
    pub fn new(encoders: Arc<EncoderRegistry>, models: Arc<ModelRegistry>) -> Self {
        Self { encoders, models }
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Predict normalized heating and cooling loads for one building
    pub fn predict_one(&self, record: &BuildingRecord) -> Result<LoadPrediction, PredictionError> {
        validate_record(record).map_err(PredictionError::InvalidInput)?;

        let (heating_load, cooling_load) = self
            .run(std::slice::from_ref(record))?
            .into_iter()
            .next()
            .unwrap_or_else(|| Err("no prediction produced".to_string()))
            .map_err(PredictionError::InvalidInput)?;

        Ok(LoadPrediction {
            heating_load,
            cooling_load,
        })
    }

    /// Predict normalized loads for every building, in input order.
    ///
    /// The batch is atomic: the first invalid row fails the whole call.
    pub fn predict_batch(
        &self,
        records: &[BuildingRecord],
    ) -> Result<Vec<PredictionResult>, PredictionError> {
        if records.is_empty() {
            return Err(PredictionError::InvalidInput(
                "batch must contain at least one building".to_string(),
            ));
        }

        for (row, record) in records.iter().enumerate() {
            validate_record(record)
                .map_err(|reason| PredictionError::InvalidInput(format!("row {row}: {reason}")))?;
        }

        let loads = self.run(records)?;

        records
            .iter()
            .zip(loads)
            .enumerate()
            .map(|(row, (record, load))| {
                let (heating_load, cooling_load) = load.map_err(|reason| {
                    PredictionError::InvalidInput(format!("row {row}: {reason}"))
                })?;
                Ok(PredictionResult {
                    id: record
                        .id
                        .clone()
                        .unwrap_or_else(|| serde_json::Value::from(row)),
                    heating_load,
                    cooling_load,
                })
            })
            .collect()
    }

    /// Encode, infer and normalize already-validated records.
    ///
    /// Rows whose normalized load is not finite come back as per-row errors.
    fn run(
        &self,
        records: &[BuildingRecord],
    ) -> Result<Vec<Result<(f64, f64), String>>, PredictionError> {
        let heating = self.raw_loads(records, Target::Heating)?;
        let cooling = self.raw_loads(records, Target::Cooling)?;

        tracing::debug!("Predicted loads for {} buildings", records.len());

        Ok(records
            .iter()
            .zip(heating.into_iter().zip(cooling))
            .map(|(record, (raw_heating, raw_cooling))| {
                let divisor = record.footprint_divisor();
                let loads = (raw_heating / divisor, raw_cooling / divisor);
                if loads.0.is_finite() && loads.1.is_finite() {
                    Ok(loads)
                } else {
                    Err(format!(
                        "normalized load is not finite for Roof_Area {} and Building_Stories {}",
                        record.roof_area, record.stories
                    ))
                }
            })
            .collect())
    }

    fn raw_loads(
        &self,
        records: &[BuildingRecord],
        target: Target,
    ) -> Result<Vec<f64>, PredictionError> {
        let features = FeatureBuilder::new(&self.encoders).build(records, target)?;
        self.models
            .predict(target, &features)
            .map_err(|source| PredictionError::Inference { target, source })
    }
}

/// Check the normalization divisors of a record
fn validate_record(record: &BuildingRecord) -> Result<(), String> {
    if !record.roof_area.is_finite() || record.roof_area <= 0.0 {
        return Err(format!("Roof_Area must be positive, got {}", record.roof_area));
    }
    if !record.stories.is_finite() || record.stories <= 0.0 {
        return Err(format!("Building_Stories must be positive, got {}", record.stories));
    }
    if record.stories.fract() != 0.0 {
        return Err(format!(
            "Building_Stories must be a whole number, got {}",
            record.stories
        ));
    }
    let divisor = record.footprint_divisor();
    if !divisor.is_normal() {
        return Err(format!(
            "Roof_Area * Building_Stories is out of range, got {}",
            divisor
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FeatureMatrix;
    use crate::models::{CategoricalAttribute, CategoryLabel};
    use crate::services::{CategoricalEncoder, EncoderSet, InferenceError, Regressor};

    /// Returns `base + type code` for each row, so rows can be told apart
    struct TypeOffsetModel {
        base: f64,
    }

    impl Regressor for TypeOffsetModel {
        fn version(&self) -> &str {
            "mock"
        }

        fn n_features(&self) -> usize {
            10
        }

        fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, InferenceError> {
            Ok(features.rows().map(|r| self.base + r[0]).collect())
        }
    }

    struct BrokenModel;

    impl Regressor for BrokenModel {
        fn version(&self) -> &str {
            "broken"
        }

        fn n_features(&self) -> usize {
            12
        }

        fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, InferenceError> {
            Err(InferenceError::ShapeMismatch {
                expected: 12,
                actual: features.n_cols(),
            })
        }
    }

    fn make(attribute: CategoricalAttribute, values: &[&str]) -> CategoricalEncoder {
        CategoricalEncoder::new(
            attribute,
            values.iter().map(|v| CategoryLabel::from(*v)).collect(),
        )
        .unwrap()
    }

    fn encoder_set(types: &[&str]) -> EncoderSet {
        EncoderSet::new(vec![
            make(CategoricalAttribute::Type, types),
            make(CategoricalAttribute::Shape, &["Rectangle"]),
            make(CategoricalAttribute::EnergyCode, &["A"]),
            make(CategoricalAttribute::HvacCategory, &["Central"]),
        ])
        .unwrap()
    }

    fn encoders() -> Arc<EncoderRegistry> {
        Arc::new(EncoderRegistry::new(
            encoder_set(&["Office", "Residential"]),
            encoder_set(&["Residential"]),
        ))
    }

    fn service() -> PredictionService {
        // Residential encodes to 1 for heating and 0 for cooling
        let models = ModelRegistry::new(
            Arc::new(TypeOffsetModel { base: 107.0 }),
            Arc::new(TypeOffsetModel { base: 36.0 }),
        );
        PredictionService::new(encoders(), Arc::new(models))
    }

    fn record() -> BuildingRecord {
        BuildingRecord {
            id: None,
            building_type: "Residential".into(),
            shape: "Rectangle".into(),
            orientation: 180.0,
            height: 9.0,
            stories: 3.0,
            wall_area: 200.0,
            window_area: 40.0,
            roof_area: 120.0,
            energy_code: "A".into(),
            hvac_category: "Central".into(),
        }
    }

    #[test]
    fn test_predict_one_normalizes_by_footprint() {
        let prediction = service().predict_one(&record()).unwrap();
        assert!((prediction.heating_load - 108.0 / 360.0).abs() < 1e-12);
        assert!((prediction.cooling_load - 36.0 / 360.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_divisors_rejected() {
        let service = service();

        let mut no_roof = record();
        no_roof.roof_area = 0.0;
        assert!(matches!(
            service.predict_one(&no_roof),
            Err(PredictionError::InvalidInput(_))
        ));

        let mut negative_stories = record();
        negative_stories.stories = -2.0;
        assert!(matches!(
            service.predict_one(&negative_stories),
            Err(PredictionError::InvalidInput(_))
        ));

        let mut half_story = record();
        half_story.stories = 1.5;
        assert!(matches!(
            service.predict_one(&half_story),
            Err(PredictionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_degenerate_footprint_rejected() {
        let service = service();

        // Subnormal product would divide to inf
        let mut tiny_roof = record();
        tiny_roof.roof_area = 1e-310;
        tiny_roof.stories = 1.0;
        assert!(matches!(
            service.predict_one(&tiny_roof),
            Err(PredictionError::InvalidInput(_))
        ));

        // Product overflows to inf and would collapse loads to zero
        let mut huge = record();
        huge.roof_area = 1e200;
        huge.stories = 1e200;
        assert!(matches!(
            service.predict_one(&huge),
            Err(PredictionError::InvalidInput(_))
        ));

        let err = service.predict_batch(&[record(), huge]).unwrap_err();
        match err {
            PredictionError::InvalidInput(message) => assert!(message.starts_with("row 1:")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_normalized_load_rejected() {
        let models = ModelRegistry::new(
            Arc::new(TypeOffsetModel { base: f64::MAX }),
            Arc::new(TypeOffsetModel { base: 36.0 }),
        );
        let service = PredictionService::new(encoders(), Arc::new(models));

        // Normal divisor, but f64::MAX / 1e-300 overflows
        let mut small_roof = record();
        small_roof.roof_area = 1e-300;
        small_roof.stories = 1.0;

        assert!(matches!(
            service.predict_one(&small_roof),
            Err(PredictionError::InvalidInput(_))
        ));

        let err = service.predict_batch(&[record(), record(), small_roof]).unwrap_err();
        match err {
            PredictionError::InvalidInput(message) => {
                assert!(message.starts_with("row 2:"));
                assert!(message.contains("not finite"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_batch_matches_single() {
        let service = service();
        let mut small = record();
        small.roof_area = 80.0;
        small.stories = 2.0;
        let records = vec![record(), small];

        let batch = service.predict_batch(&records).unwrap();
        assert_eq!(batch.len(), records.len());
        for (i, record) in records.iter().enumerate() {
            let single = service.predict_one(record).unwrap();
            assert_eq!(batch[i].heating_load, single.heating_load);
            assert_eq!(batch[i].cooling_load, single.cooling_load);
        }
    }

    #[test]
    fn test_label_unknown_to_one_target_fails() {
        // Office is in the heating vocabulary only
        let mut office = record();
        office.building_type = "Office".into();
        let err = service().predict_one(&office).unwrap_err();
        assert!(err.is_client_error());
        assert!(matches!(
            err,
            PredictionError::UnknownCategory { target: Target::Cooling, attribute: CategoricalAttribute::Type, .. }
        ));
    }

    #[test]
    fn test_batch_ids_default_to_position() {
        let mut tagged = record();
        tagged.id = Some(serde_json::json!("bldg-7"));
        let results = service()
            .predict_batch(&[record(), tagged, record()])
            .unwrap();

        let ids: Vec<serde_json::Value> = results.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![serde_json::json!(0), serde_json::json!("bldg-7"), serde_json::json!(2)]);
    }

    #[test]
    fn test_batch_is_atomic() {
        let mut bad = record();
        bad.stories = 0.0;
        let err = service().predict_batch(&[record(), bad]).unwrap_err();
        match err {
            PredictionError::InvalidInput(message) => assert!(message.starts_with("row 1:")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert!(matches!(
            service().predict_batch(&[]),
            Err(PredictionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_inference_error_surfaces() {
        let models = ModelRegistry::new(
            Arc::new(BrokenModel),
            Arc::new(TypeOffsetModel { base: 1.0 }),
        );
        let service = PredictionService::new(encoders(), Arc::new(models));
        let err = service.predict_one(&record()).unwrap_err();
        assert!(!err.is_client_error());
        assert!(matches!(err, PredictionError::Inference { target: Target::Heating, .. }));
    }

    #[test]
    fn test_predict_one_is_idempotent() {
        let service = service();
        let first = service.predict_one(&record()).unwrap();
        let second = service.predict_one(&record()).unwrap();
        assert_eq!(first.heating_load.to_bits(), second.heating_load.to_bits());
        assert_eq!(first.cooling_load.to_bits(), second.cooling_load.to_bits());
    }
}
