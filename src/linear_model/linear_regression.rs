use super::{check_schedule, join_weights, split_weights};
use crate::dataset::{add_intercept_column, check_samples};
use crate::error::{MlError, Result};
use crate::{Matrix, Vector};
use tracing::debug;

const DEFAULT_LEARNING_RATE: f64 = 0.1;
const DEFAULT_ITERATIONS: usize = 1000;

#[derive(Clone, Debug)]
pub struct LinearRegression {
    pub coefficients: Option<Vector>,
    pub intercept: Option<f64>,
    /// Mean squared error before each update.
    pub cost_log: Vec<f64>,
    fit_intercept: bool,
    learning_rate: f64,
    n_iterations: usize,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            cost_log: Vec::new(),
            fit_intercept: true,
            learning_rate: DEFAULT_LEARNING_RATE,
            n_iterations: DEFAULT_ITERATIONS,
        }
    }

    pub fn fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn n_iterations(mut self, n_iterations: usize) -> Self {
        self.n_iterations = n_iterations;
        self
    }

    pub fn fit(&mut self, x: &Matrix, y: &Vector) -> Result<()> {
        check_samples(x, y)?;
        check_schedule(self.learning_rate, self.n_iterations)?;

        let design = if self.fit_intercept {
            add_intercept_column(x)
        } else {
            x.clone()
        };

        let (weights, cost_log) = self.gradient_descent(&design, y)?;
        let (coeffs, intercept) = split_weights(&weights, self.fit_intercept);

        debug!(
            n_samples = x.nrows(),
            n_features = x.ncols(),
            iterations = self.n_iterations,
            final_cost = cost_log.last().copied().unwrap_or(f64::NAN),
            "linear regression fitted"
        );

        self.coefficients = Some(coeffs);
        self.intercept = Some(intercept);
        self.cost_log = cost_log;
        Ok(())
    }

    /// Fitted parameters with the intercept first when one is modeled.
    pub fn parameters(&self) -> Result<Vector> {
        let coeffs = self
            .coefficients
            .as_ref()
            .ok_or(MlError::NotFitted("LinearRegression"))?;
        Ok(join_weights(
            coeffs,
            self.intercept.unwrap_or(0.0),
            self.fit_intercept,
        ))
    }

    pub fn predict(&self, x: &Matrix) -> Result<Vector> {
        let coeffs = self
            .coefficients
            .as_ref()
            .ok_or(MlError::NotFitted("LinearRegression"))?;
        let intercept = self.intercept.unwrap_or(0.0);

        if x.ncols() != coeffs.len() {
            return Err(MlError::FeatureMismatch {
                expected: coeffs.len(),
                found: x.ncols(),
            });
        }

        Ok(x.dot(coeffs) + intercept)
    }

    pub fn score(&self, x: &Matrix, y: &Vector) -> Result<f64> {
        let y_pred = self.predict(x)?;
        crate::metrics::r2_score(y, &y_pred)
    }

    fn gradient_descent(&self, x: &Matrix, y: &Vector) -> Result<(Vector, Vec<f64>)> {
        let n_samples = x.nrows() as f64;
        let mut weights = Vector::zeros(x.ncols());
        let mut cost_log = Vec::with_capacity(self.n_iterations);

        for iteration in 0..self.n_iterations {
            let predictions = x.dot(&weights);
            let error = &predictions - y;
            let cost = error.mapv(|e| e * e).sum() / n_samples;

            if !cost.is_finite() {
                return Err(MlError::Diverged { iteration });
            }
            cost_log.push(cost);

            let gradient = x.t().dot(&error) / n_samples;
            weights.scaled_add(-self.learning_rate, &gradient);
        }

        Ok((weights, cost_log))
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}
