use crate::error::{PredictionError, TrainingError};
use crate::model::encoder::OneHotEncoder;
use crate::model::regression::LinearRegression;
use crate::shared_data::TrafficFeatures;
use nalgebra::{DMatrix, DVector};

/// Encoder and regressor fitted together. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedPipeline {
    encoder: OneHotEncoder,
    regressor: LinearRegression,
}

impl FittedPipeline {
    /// Fits the encoder on `features`, then the regression on the encoded rows.
    /// Callers are expected to pass already-normalized features.
    pub fn fit(features: &[TrafficFeatures], targets: &[f64]) -> Result<Self, TrainingError> {
        if features.is_empty() || features.len() != targets.len() {
            return Err(TrainingError::EmptyDataset);
        }

        let encoder = OneHotEncoder::fit(features);
        let width = encoder.n_features();
        let mut x = DMatrix::<f64>::zeros(features.len(), width);
        for (i, row) in features.iter().enumerate() {
            let encoded = encoder.transform(row)?;
            x.row_mut(i).copy_from_slice(&encoded);
        }
        let y = DVector::from_column_slice(targets);

        let regressor = LinearRegression::fit(&x, &y)?;
        Ok(Self { encoder, regressor })
    }

    /// Raw (unrounded) prediction for one normalized input.
    pub fn predict(&self, features: &TrafficFeatures) -> Result<f64, PredictionError> {
        let encoded = self.encoder.transform(features)?;
        let value = self.regressor.predict_row(&encoded).ok_or_else(|| {
            PredictionError::Inference(format!(
                "encoded width {} does not match {} fitted coefficients",
                encoded.len(),
                self.regressor.n_features()
            ))
        })?;
        if !value.is_finite() {
            return Err(PredictionError::Inference(format!(
                "prediction is not finite ({})",
                value
            )));
        }
        Ok(value)
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    pub fn regressor(&self) -> &LinearRegression {
        &self.regressor
    }

    /// Pairs every encoded column name with its fitted weight.
    pub fn weights(&self) -> Vec<(String, f64)> {
        self.encoder
            .feature_names()
            .into_iter()
            .zip(self.regressor.coefficients().iter().copied())
            .collect()
    }
}
