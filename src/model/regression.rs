use crate::error::TrainingError;
use nalgebra::{DMatrix, DVector};

/// Singular values below `RCOND * largest` are treated as zero.
const RCOND: f64 = 1e-10;

/// Extra solves against the residual to absorb error in the decomposition itself.
const REFINEMENT_STEPS: usize = 2;

/// Ordinary least squares with an intercept term.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    coefficients: DVector<f64>,
    intercept: f64,
}

impl LinearRegression {
    /// Fits `y ≈ x·w + b` minimizing squared error.
    ///
    /// Features and target are centred first so the intercept drops out of the
    /// solve, then the centred system is solved through the SVD. Singular values
    /// below `RCOND` are treated as zero, which yields the
    /// minimum-norm solution when columns are collinear (a full one-hot block
    /// always sums to one, so they are). The computed SVD is not exact, so the
    /// first solution is refined by solving again against its own residual.
    pub fn fit(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<Self, TrainingError> {
        let (n_rows, n_cols) = x.shape();
        if n_rows == 0 || y.len() != n_rows {
            return Err(TrainingError::EmptyDataset);
        }

        let x_mean = DVector::from_fn(n_cols, |j, _| x.column(j).mean());
        let y_mean = y.mean();

        let mut centred = x.clone();
        for j in 0..n_cols {
            centred.column_mut(j).add_scalar_mut(-x_mean[j]);
        }
        let y_centred = y.add_scalar(-y_mean);

        let svd = centred.clone().svd(true, true);
        let eps = svd.singular_values.max() * RCOND;
        let mut coefficients = svd
            .solve(&y_centred, eps)
            .map_err(|e| TrainingError::Solve(e.to_string()))?;
        for _ in 0..REFINEMENT_STEPS {
            let residual = &y_centred - &centred * &coefficients;
            let correction = svd
                .solve(&residual, eps)
                .map_err(|e| TrainingError::Solve(e.to_string()))?;
            coefficients += correction;
        }

        let intercept = y_mean - x_mean.dot(&coefficients);
        if !intercept.is_finite() || coefficients.iter().any(|w| !w.is_finite()) {
            return Err(TrainingError::Solve(
                "solution contains non-finite values".to_string(),
            ));
        }

        Ok(Self {
            coefficients,
            intercept,
        })
    }

    pub fn coefficients(&self) -> &DVector<f64> {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns `None` if `row` has the wrong width.
    pub fn predict_row(&self, row: &[f64]) -> Option<f64> {
        if row.len() != self.coefficients.len() {
            return None;
        }
        let dot: f64 = row
            .iter()
            .zip(self.coefficients.iter())
            .map(|(x, w)| x * w)
            .sum();
        Some(self.intercept + dot)
    }
}
