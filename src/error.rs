//! Error type shared by every estimator in the crate.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MlError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MlError {
    /// Design matrix rows and target length disagree.
    #[error("Number of samples in X ({x_rows}) and y ({y_len}) must match")]
    ShapeMismatch { x_rows: usize, y_len: usize },

    /// Input has a different number of features than the fitted model.
    #[error("Number of features in X ({found}) doesn't match training data ({expected})")]
    FeatureMismatch { expected: usize, found: usize },

    #[error("Input matrix must have at least one sample and one feature")]
    EmptyInput,

    #[error("Invalid labels: {0}")]
    InvalidLabels(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Estimator used before `fit`.
    #[error("{0} not fitted. Call fit() first.")]
    NotFitted(&'static str),

    /// Cost became NaN or infinite.
    #[error("Gradient descent diverged at iteration {iteration}")]
    Diverged { iteration: usize },

    #[error("n_samples={n_samples} should be >= n_clusters={n_clusters}")]
    TooFewSamples { n_samples: usize, n_clusters: usize },

    #[error("No anomaly threshold selected. Call select_threshold() first.")]
    ThresholdNotSelected,

    #[error("Covariance matrix is not positive definite")]
    NotPositiveDefinite,

    /// The reference k-means used by the harness failed to fit.
    #[error("Reference clustering failed: {0}")]
    Reference(String),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MlError::ShapeMismatch { x_rows: 3, y_len: 2 };
        assert_eq!(err.to_string(), "Number of samples in X (3) and y (2) must match");

        let err = MlError::NotFitted("KMeans");
        assert_eq!(err.to_string(), "KMeans not fitted. Call fit() first.");

        let err = MlError::Reference("empty dataset".to_string());
        assert_eq!(err.to_string(), "Reference clustering failed: empty dataset");
    }
}
