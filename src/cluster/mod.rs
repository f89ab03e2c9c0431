//! Clustering algorithms for unsupervised learning.
//!
//! `KMeans` runs Lloyd's algorithm from several random initializations and
//! keeps the run with the lowest inertia (within-cluster sum of squares).
//! Centroid order is arbitrary, so callers comparing against a reference
//! should match centroids explicitly (see `validation::match_centroids`).
//!
//! # Examples
//!
//! ```rust
//! use gradcheck::KMeans;
//! use ndarray::array;
//!
//! let x = array![
//!     [1.0, 1.0],
//!     [1.5, 2.0],
//!     [3.0, 4.0],
//!     [5.0, 7.0],
//!     [3.5, 5.0],
//!     [4.5, 5.0]
//! ];
//!
//! let mut kmeans = KMeans::new(2).n_init(20).max_iter(100).random_state(42);
//! let labels = kmeans.fit_predict(&x).unwrap();
//! assert_eq!(labels.len(), 6);
//!
//! let centers = kmeans.cluster_centers.as_ref().unwrap();
//! assert_eq!(centers.nrows(), 2);
//!
//! let inertia = kmeans.inertia.unwrap();
//! println!("Inertia: {:.4}", inertia);
//! ```

mod kmeans;

pub use kmeans::KMeans;
