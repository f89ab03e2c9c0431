//! Density-based anomaly detection.
//!
//! `GaussianAnomalyDetector` fits a Gaussian to data assumed to be normal,
//! picks a density cutoff `epsilon` on a labeled validation set by maximizing
//! F1, and flags points whose density falls below it. Densities are handled in
//! log space, so many features or far-away points never underflow to zero.
//!
//! # Examples
//!
//! ```rust
//! use gradcheck::GaussianAnomalyDetector;
//! use ndarray::array;
//!
//! let train = array![[0.9, 5.1], [1.1, 4.9], [1.0, 5.0], [0.8, 5.2], [1.2, 4.8]];
//! let val = array![[1.0, 5.05], [0.95, 4.9], [4.0, 9.0]];
//! let val_labels = array![0.0, 0.0, 1.0];
//!
//! let mut detector = GaussianAnomalyDetector::new();
//! detector.fit(&train).unwrap();
//! let selection = detector.select_threshold(&val, &val_labels).unwrap();
//! assert_eq!(selection.f1, 1.0);
//!
//! let flags = detector.predict(&array![[1.0, 5.0], [-3.0, 0.0]]).unwrap();
//! assert_eq!(flags, array![0.0, 1.0]);
//! ```

mod gaussian;

pub use gaussian::{CovarianceKind, GaussianAnomalyDetector, ThresholdSelection};
