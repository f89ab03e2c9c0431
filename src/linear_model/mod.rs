//! Linear models fitted by batch gradient descent.
//!
//! This module provides:
//! - `LinearRegression`: least squares with a fixed learning rate and iteration budget
//! - `LogisticRegression`: binary classification with optional L2 shrinkage
//!
//! Both estimators start from zero parameters, run exactly `n_iterations`
//! full-batch updates and keep one cost value per iteration in `cost_log`.
//! When an intercept is modeled a column of ones is prepended to the design
//! matrix, so `parameters()` returns the intercept first.
//!
//! # Examples
//!
//! ## Linear Regression
//! ```rust
//! use gradcheck::LinearRegression;
//! use ndarray::array;
//!
//! let x = array![[0.0], [1.0], [2.0], [3.0]];
//! let y = array![1.0, 3.0, 5.0, 7.0];
//!
//! let mut model = LinearRegression::new().learning_rate(0.1).n_iterations(5000);
//! model.fit(&x, &y).unwrap();
//! let params = model.parameters().unwrap();
//! assert!((params[0] - 1.0).abs() < 1e-6);
//! assert!((params[1] - 2.0).abs() < 1e-6);
//! ```
//!
//! ## Logistic Regression
//! ```rust
//! use gradcheck::LogisticRegression;
//! use ndarray::array;
//!
//! let x = array![[1.0], [2.0], [3.0], [4.0]];
//! let y = array![0.0, 0.0, 1.0, 1.0];
//!
//! let mut model = LogisticRegression::new()
//!     .learning_rate(0.1)
//!     .n_iterations(5000)
//!     .lambda(1.0);
//! model.fit(&x, &y).unwrap();
//! let predictions = model.predict(&x).unwrap();
//! assert_eq!(predictions, y);
//! ```

mod linear_regression;
mod logistic_regression;

pub use linear_regression::LinearRegression;
pub use logistic_regression::LogisticRegression;

use crate::Vector;
use crate::error::{MlError, Result};
use ndarray::s;

/// Splits a fitted weight vector into `(coefficients, intercept)`.
pub(crate) fn split_weights(weights: &Vector, fit_intercept: bool) -> (Vector, f64) {
    if fit_intercept {
        (weights.slice(s![1..]).to_owned(), weights[0])
    } else {
        (weights.clone(), 0.0)
    }
}

/// Joins coefficients back into one vector, intercept first when modeled.
pub(crate) fn join_weights(coefficients: &Vector, intercept: f64, fit_intercept: bool) -> Vector {
    if fit_intercept {
        let mut params = Vector::zeros(coefficients.len() + 1);
        params[0] = intercept;
        params.slice_mut(s![1..]).assign(coefficients);
        params
    } else {
        coefficients.clone()
    }
}

pub(crate) fn check_schedule(learning_rate: f64, n_iterations: usize) -> Result<()> {
    if !(learning_rate > 0.0 && learning_rate.is_finite()) {
        return Err(MlError::InvalidParameter(format!(
            "learning_rate must be positive, got {}",
            learning_rate
        )));
    }
    if n_iterations == 0 {
        return Err(MlError::InvalidParameter(
            "n_iterations must be > 0".to_string(),
        ));
    }
    Ok(())
}
