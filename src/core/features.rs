use crate::core::error::PredictionError;
use crate::models::{BuildingRecord, FeatureColumn, Target};
use crate::services::EncoderRegistry;

/// Row-major numeric matrix with the columns of `FeatureColumn::SCHEMA`
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    n_cols: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    /// Build a matrix from already-encoded rows. Returns `None` if rows differ in width.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let n_cols = rows.first().map_or(FeatureColumn::SCHEMA.len(), Vec::len);
        if rows.iter().any(|r| r.len() != n_cols) {
            return None;
        }
        Some(Self {
            n_cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub fn n_rows(&self) -> usize {
        if self.n_cols == 0 {
            0
        } else {
            self.data.len() / self.n_cols
        }
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Row `index`, or `None` past the last row
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        if index >= self.n_rows() {
            return None;
        }
        self.data.get(index * self.n_cols..(index + 1) * self.n_cols)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.n_cols.max(1))
    }
}

/// Projects building records into a target's encoded feature matrix.
///
/// Categorical columns are replaced by the target's encoder codes, numeric
/// columns pass through verbatim. Input order is preserved.
#[derive(Debug, Clone, Copy)]
pub struct FeatureBuilder<'a> {
    encoders: &'a EncoderRegistry,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(encoders: &'a EncoderRegistry) -> Self {
        Self { encoders }
    }

    /// Build the feature matrix for `target`.
    ///
    /// Fails the whole build on the first label outside a fitted vocabulary.
    pub fn build(
        &self,
        records: &[BuildingRecord],
        target: Target,
    ) -> Result<FeatureMatrix, PredictionError> {
        let n_cols = FeatureColumn::SCHEMA.len();
        let mut data = Vec::with_capacity(records.len() * n_cols);

        for (row, record) in records.iter().enumerate() {
            for column in FeatureColumn::SCHEMA {
                let value = match column.categorical() {
                    Some(attribute) => {
                        let label = record.label(attribute);
                        self.encoders
                            .get(target, attribute)
                            .encode(label)
                            .ok_or_else(|| PredictionError::UnknownCategory {
                                target,
                                attribute,
                                value: label.to_string(),
                                row,
                            })?
                    }
                    // Every non-categorical schema column is numeric
                    None => record.numeric(column).unwrap_or_default(),
                };
                data.push(value);
            }
        }

        Ok(FeatureMatrix { n_cols, data })
    }
}
