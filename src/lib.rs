//! Hand-written gradient-descent regressions, k-means clustering and Gaussian
//! anomaly detection, together with the harness that checks them against
//! known answers.
//!
//! ```rust
//! use gradcheck::{LinearRegression, Matrix, Vector};
//! use ndarray::array;
//!
//! let x: Matrix = array![[1.0], [2.0], [3.0], [4.0]];
//! let y: Vector = array![2.0, 4.0, 6.0, 8.0];
//!
//! let mut model = LinearRegression::new().fit_intercept(false).learning_rate(0.05);
//! model.fit(&x, &y).unwrap();
//! assert!((model.parameters().unwrap()[0] - 2.0).abs() < 1e-6);
//! ```

pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub mod anomaly;
pub mod checks;
pub mod cluster;
pub mod dataset;
pub mod error;
pub mod linear_model;
pub mod metrics;
pub mod synthetic;
pub mod validation;

pub use anomaly::{CovarianceKind, GaussianAnomalyDetector, ThresholdSelection};
pub use checks::{CheckConfig, run_all};
pub use cluster::KMeans;
pub use dataset::Dataset;
pub use error::{MlError, Result};
pub use linear_model::{LinearRegression, LogisticRegression};
pub use validation::{CheckOutcome, Report};

pub type Vector = Array1<f64>;
pub type Matrix = Array2<f64>;
