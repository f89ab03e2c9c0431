use super::{check_schedule, join_weights, split_weights};
use crate::dataset::{add_intercept_column, check_samples};
use crate::error::{MlError, Result};
use crate::metrics::{accuracy, log_loss};
use crate::{Matrix, Vector};
use tracing::debug;

const SIGMOID_CLAMP: f64 = 500.0;

#[derive(Clone, Debug)]
pub struct LogisticRegression {
    pub coefficients: Option<Vector>,
    pub intercept: Option<f64>,
    /// Cross-entropy (plus L2 penalty) before each update.
    pub cost_log: Vec<f64>,
    fit_intercept: bool,
    learning_rate: f64,
    n_iterations: usize,
    lambda: f64,
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            cost_log: Vec::new(),
            fit_intercept: true,
            learning_rate: 0.01,
            n_iterations: 1000,
            lambda: 0.0,
        }
    }

    pub fn with_params(learning_rate: f64, n_iterations: usize, fit_intercept: bool) -> Self {
        Self::new()
            .learning_rate(learning_rate)
            .n_iterations(n_iterations)
            .fit_intercept(fit_intercept)
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

    /// L2 strength. Zero disables regularization; the intercept is never penalized.
    pub fn lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn fit(&mut self, x: &Matrix, y: &Vector) -> Result<()> {
        check_samples(x, y)?;
        check_schedule(self.learning_rate, self.n_iterations)?;
        if !(self.lambda >= 0.0 && self.lambda.is_finite()) {
            return Err(MlError::InvalidParameter(format!(
                "lambda must be non-negative, got {}",
                self.lambda
            )));
        }
        Self::validate_labels(y)?;

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
            lambda = self.lambda,
            final_cost = cost_log.last().copied().unwrap_or(f64::NAN),
            "logistic regression fitted"
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
            .ok_or(MlError::NotFitted("LogisticRegression"))?;
        Ok(join_weights(
            coeffs,
            self.intercept.unwrap_or(0.0),
            self.fit_intercept,
        ))
    }

    pub fn predict(&self, x: &Matrix) -> Result<Vector> {
        let probabilities = self.predict_proba(x)?;
        Ok(probabilities.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    pub fn predict_proba(&self, x: &Matrix) -> Result<Vector> {
        let coeffs = self
            .coefficients
            .as_ref()
            .ok_or(MlError::NotFitted("LogisticRegression"))?;
        let intercept = self.intercept.unwrap_or(0.0);

        if x.ncols() != coeffs.len() {
            return Err(MlError::FeatureMismatch {
                expected: coeffs.len(),
                found: x.ncols(),
            });
        }

        let linear_combination = x.dot(coeffs) + intercept;
        Ok(linear_combination.mapv(sigmoid))
    }

    pub fn score(&self, x: &Matrix, y: &Vector) -> Result<f64> {
        let predictions = self.predict(x)?;
        accuracy(y, &predictions)
    }

    fn validate_labels(y: &Vector) -> Result<()> {
        if let Some(label) = y.iter().find(|&&label| label != 0.0 && label != 1.0) {
            return Err(MlError::InvalidLabels(format!(
                "labels must be 0 or 1 for binary classification, found {}",
                label
            )));
        }
        Ok(())
    }

    fn gradient_descent(&self, x: &Matrix, y: &Vector) -> Result<(Vector, Vec<f64>)> {
        let n_samples = x.nrows() as f64;
        let first_penalized = usize::from(self.fit_intercept);
        let mut weights = Vector::zeros(x.ncols());
        let mut cost_log = Vec::with_capacity(self.n_iterations);

        for iteration in 0..self.n_iterations {
            let predictions = x.dot(&weights).mapv(sigmoid);

            let mut cost = log_loss(y, &predictions)?;
            if self.lambda > 0.0 {
                let penalty: f64 = weights.iter().skip(first_penalized).map(|w| w * w).sum();
                cost += self.lambda / (2.0 * n_samples) * penalty;
            }
            if !cost.is_finite() {
                return Err(MlError::Diverged { iteration });
            }
            cost_log.push(cost);

            let error = &predictions - y;
            let mut gradient = x.t().dot(&error) / n_samples;
            if self.lambda > 0.0 {
                for j in first_penalized..weights.len() {
                    gradient[j] += self.lambda / n_samples * weights[j];
                }
            }
            weights.scaled_add(-self.learning_rate, &gradient);
        }

        Ok((weights, cost_log))
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z.clamp(-SIGMOID_CLAMP, SIGMOID_CLAMP)).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable_fixture() -> (Matrix, Vector) {
        let x = array![
            [0.5, 1.5],
            [1.0, 1.0],
            [1.5, 0.5],
            [3.0, 0.5],
            [2.0, 2.0],
            [1.0, 2.5]
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_logistic_regression_simple() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut model = LogisticRegression::with_params(0.1, 5000, true);
        model.fit(&x, &y).unwrap();

        let predictions = model.predict(&x).unwrap();
        let probabilities = model.predict_proba(&x).unwrap();

        assert_eq!(predictions.len(), 4);
        assert!(probabilities[0] < 0.5);
        assert!(probabilities[3] > 0.5);
        assert_eq!(model.score(&x, &y).unwrap(), 1.0);
    }

    #[test]
    fn test_matches_known_gradient_descent_solution() {
        let (x, y) = separable_fixture();

        let mut model = LogisticRegression::new()
            .learning_rate(0.1)
            .n_iterations(10_000);
        model.fit(&x, &y).unwrap();

        let params = model.parameters().unwrap();
        assert!((params[0] - (-14.222409982019837)).abs() < 0.01);
        assert!((params[1] - 5.28).abs() < 0.01);
        assert!((params[2] - 5.08).abs() < 0.01);
    }

    #[test]
    fn test_regularization_shrinks_parameters() {
        let (x, y) = separable_fixture();

        let mut plain = LogisticRegression::new()
            .learning_rate(0.1)
            .n_iterations(10_000);
        plain.fit(&x, &y).unwrap();

        let mut shrunk = LogisticRegression::new()
            .learning_rate(0.1)
            .n_iterations(10_000)
            .lambda(10.0);
        shrunk.fit(&x, &y).unwrap();

        let plain_params = plain.parameters().unwrap();
        let shrunk_params = shrunk.parameters().unwrap();
        for (s, p) in shrunk_params.iter().zip(plain_params.iter()) {
            assert!(s.abs() < p.abs());
        }
    }

    #[test]
    fn test_cost_log_decreases() {
        let (x, y) = separable_fixture();

        let mut model = LogisticRegression::new().learning_rate(0.1).n_iterations(200);
        model.fit(&x, &y).unwrap();

        assert_eq!(model.cost_log.len(), 200);
        assert!((model.cost_log[0] - std::f64::consts::LN_2).abs() < 1e-12);
        assert!(model.cost_log[199] < model.cost_log[0]);
    }

    #[test]
    fn test_logistic_regression_invalid_labels() {
        let x = array![[1.0], [2.0]];
        let y = array![0.5, 2.0];

        let mut model = LogisticRegression::new();
        assert!(matches!(model.fit(&x, &y), Err(MlError::InvalidLabels(_))));
    }

    #[test]
    fn test_negative_lambda_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![0.0, 1.0];

        let mut model = LogisticRegression::new().lambda(-1.0);
        assert!(matches!(model.fit(&x, &y), Err(MlError::InvalidParameter(_))));
    }

    #[test]
    fn test_logistic_regression_predict_without_fit() {
        let x = array![[1.0], [2.0]];
        let model = LogisticRegression::new();

        assert!(model.predict(&x).is_err());
        assert!(model.predict_proba(&x).is_err());
    }

    #[test]
    fn test_sigmoid_function() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-10);
        assert!(sigmoid(1000.0) > 0.99);
        assert!(sigmoid(-1000.0) < 0.01);
        assert!(sigmoid(-1000.0).is_finite());
    }
}
