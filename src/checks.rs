//! The six algorithm checks: each fits an estimator on seeded synthetic data
//! and compares the result against a known answer or, for k-means, against
//! linfa's implementation.
//!
//! ```rust,no_run
//! use gradcheck::{CheckConfig, run_all};
//!
//! let report = run_all(&CheckConfig::default());
//! println!("{}", report);
//! ```

use crate::anomaly::GaussianAnomalyDetector;
use crate::cluster::KMeans;
use crate::error::{MlError, Result};
use crate::linear_model::{LinearRegression, LogisticRegression};
use crate::synthetic::{anomaly_scenario, linear_dataset, logistic_fixture, quadrant_blobs};
use crate::validation::{CheckOutcome, Report, centroids_match, labels_match, params_match};
use crate::{Matrix, Vector};
use linfa::DatasetBase;
use linfa::traits::Fit;
use linfa_clustering::KMeans as LinfaKMeans;
use ndarray::array;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

pub const LINEAR_WITHOUT_INTERCEPT: &str = "linear regression without intercept";
pub const LINEAR_WITH_INTERCEPT: &str = "linear regression with intercept";
pub const LOGISTIC_UNREGULARIZED: &str = "logistic regression";
pub const LOGISTIC_REGULARIZED: &str = "regularized logistic regression shrinks parameters";
pub const KMEANS_QUADRANTS: &str = "k-means on quadrant clusters";
pub const ANOMALY_DETECTION: &str = "gaussian anomaly detection";

const N_QUADRANTS: usize = 4;

/// Known gradient-descent solution for the logistic fixture
/// (learning rate 0.1, 10 000 iterations): intercept, w1, w2.
pub const LOGISTIC_REFERENCE: [f64; 3] = [-14.222409982019837, 5.28, 5.08];

#[derive(Clone, Debug)]
pub struct CheckConfig {
    pub seed: u64,
    /// Maximum relative error for numeric comparisons.
    pub tolerance: f64,
    pub linear_samples: usize,
    pub linear_iterations: usize,
    pub linear_learning_rate: f64,
    pub logistic_iterations: usize,
    pub logistic_learning_rate: f64,
    pub logistic_lambda: f64,
    pub cluster_size: usize,
    pub kmeans_n_init: usize,
    pub kmeans_max_iter: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tolerance: 0.01,
            linear_samples: 200,
            linear_iterations: 1000,
            linear_learning_rate: 0.1,
            logistic_iterations: 10_000,
            logistic_learning_rate: 0.1,
            logistic_lambda: 10.0,
            cluster_size: 100,
            kmeans_n_init: 1500,
            kmeans_max_iter: 500,
        }
    }
}

/// Runs every check with one RNG seeded from `config.seed`.
pub fn run_all(config: &CheckConfig) -> Report {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut report = Report::default();

    report.push(settle(
        LINEAR_WITHOUT_INTERCEPT,
        linear_regression_check(config, &mut rng, false),
    ));
    report.push(settle(
        LINEAR_WITH_INTERCEPT,
        linear_regression_check(config, &mut rng, true),
    ));
    match logistic_regression_checks(config) {
        Ok([plain, shrunk]) => {
            report.push(plain);
            report.push(shrunk);
        }
        Err(e) => {
            report.push(CheckOutcome::errored(LOGISTIC_UNREGULARIZED, &e));
            report.push(CheckOutcome::errored(LOGISTIC_REGULARIZED, &e));
        }
    }
    report.push(settle(KMEANS_QUADRANTS, kmeans_check(config, &mut rng)));
    report.push(settle(ANOMALY_DETECTION, anomaly_check(&mut rng)));

    for outcome in &report.outcomes {
        info!(
            check = %outcome.name,
            passed = outcome.passed,
            detail = %outcome.detail,
            "check finished"
        );
    }
    report
}

fn settle(name: &str, result: Result<CheckOutcome>) -> CheckOutcome {
    result.unwrap_or_else(|e| CheckOutcome::errored(name, &e))
}

/// Fits y = 15·x1 + 25·x2 (+ 10 with an intercept) and compares the parameters.
pub fn linear_regression_check<R: Rng + ?Sized>(
    config: &CheckConfig,
    rng: &mut R,
    fit_intercept: bool,
) -> Result<CheckOutcome> {
    let coefficients = array![15.0, 25.0];
    let (intercept, expected, name) = if fit_intercept {
        (10.0, array![10.0, 15.0, 25.0], LINEAR_WITH_INTERCEPT)
    } else {
        (0.0, coefficients.clone(), LINEAR_WITHOUT_INTERCEPT)
    };

    let data = linear_dataset(rng, config.linear_samples, &coefficients, intercept);
    let mut model = LinearRegression::new()
        .fit_intercept(fit_intercept)
        .learning_rate(config.linear_learning_rate)
        .n_iterations(config.linear_iterations);
    model.fit(&data.features, &data.targets)?;
    let fitted = model.parameters()?;

    Ok(CheckOutcome::new(
        name,
        params_match(&expected, &fitted, config.tolerance),
        format!("fitted {:.4}, expected {}", fitted, expected),
    ))
}

/// Fits the logistic fixture with and without L2 shrinkage. The first outcome
/// compares against `LOGISTIC_REFERENCE`, the second requires every
/// regularized parameter to be smaller in magnitude.
pub fn logistic_regression_checks(config: &CheckConfig) -> Result<[CheckOutcome; 2]> {
    let data = logistic_fixture();

    let mut plain = LogisticRegression::new()
        .learning_rate(config.logistic_learning_rate)
        .n_iterations(config.logistic_iterations);
    plain.fit(&data.features, &data.targets)?;
    let plain_params = plain.parameters()?;

    let mut shrunk = LogisticRegression::new()
        .learning_rate(config.logistic_learning_rate)
        .n_iterations(config.logistic_iterations)
        .lambda(config.logistic_lambda);
    shrunk.fit(&data.features, &data.targets)?;
    let shrunk_params = shrunk.parameters()?;

    let reference = Vector::from(LOGISTIC_REFERENCE.to_vec());
    let smaller = shrunk_params.len() == plain_params.len()
        && shrunk_params
            .iter()
            .zip(plain_params.iter())
            .all(|(s, p)| s.abs() < p.abs());

    Ok([
        CheckOutcome::new(
            LOGISTIC_UNREGULARIZED,
            params_match(&reference, &plain_params, config.tolerance),
            format!("fitted {:.4}, expected {:.4}", plain_params, reference),
        ),
        CheckOutcome::new(
            LOGISTIC_REGULARIZED,
            smaller,
            format!(
                "lambda {} gives {:.4} against {:.4}",
                config.logistic_lambda, shrunk_params, plain_params
            ),
        ),
    ])
}

/// Clusters four quadrant blobs with `KMeans` and with linfa's k-means under
/// the same budget and seed, then matches the two sets of centroids.
pub fn kmeans_check<R: Rng + ?Sized>(config: &CheckConfig, rng: &mut R) -> Result<CheckOutcome> {
    let (points, _) = quadrant_blobs(rng, config.cluster_size);
    let seed: u64 = rng.r#gen();
    let reference = reference_centroids(
        &points,
        N_QUADRANTS,
        config.kmeans_n_init,
        config.kmeans_max_iter,
        seed,
    )?;

    let mut kmeans = KMeans::new(N_QUADRANTS)
        .n_init(config.kmeans_n_init)
        .max_iter(config.kmeans_max_iter)
        .random_state(seed);
    kmeans.fit(&points)?;
    let centroids: &Matrix = kmeans
        .cluster_centers
        .as_ref()
        .ok_or(MlError::NotFitted("KMeans"))?;

    Ok(CheckOutcome::new(
        KMEANS_QUADRANTS,
        centroids_match(&reference, centroids, config.tolerance)?,
        format!(
            "inertia {:.4}, reference centroids {:.4}",
            kmeans.inertia.unwrap_or(f64::NAN),
            reference
        ),
    ))
}

/// Centroids found by `linfa-clustering`'s k-means (k-means++ seeding,
/// `n_runs` restarts, best inertia kept).
pub fn reference_centroids(
    points: &Matrix,
    n_clusters: usize,
    n_runs: usize,
    max_iter: usize,
    seed: u64,
) -> Result<Matrix> {
    let dataset = DatasetBase::from(points.clone());
    let model = LinfaKMeans::params_with_rng(n_clusters, StdRng::seed_from_u64(seed))
        .n_runs(n_runs)
        .max_n_iterations(max_iter as u64)
        .fit(&dataset)
        .map_err(|e| MlError::Reference(e.to_string()))?;
    Ok(model.centroids().to_owned())
}

/// Fits on normal data, selects epsilon on the validation split and requires
/// the test split labels to be reproduced exactly.
pub fn anomaly_check<R: Rng + ?Sized>(rng: &mut R) -> Result<CheckOutcome> {
    let scenario = anomaly_scenario(rng)?;

    let mut detector = GaussianAnomalyDetector::new();
    detector.fit(&scenario.train)?;
    let selection = detector.select_threshold(&scenario.validation, &scenario.validation_labels)?;
    let flags = detector.predict(&scenario.test)?;

    let mismatches = flags
        .iter()
        .zip(scenario.test_labels.iter())
        .filter(|(f, t)| f != t)
        .count();

    Ok(CheckOutcome::new(
        ANOMALY_DETECTION,
        labels_match(&scenario.test_labels, &flags),
        format!(
            "epsilon {:.3e} (validation F1 {:.3}), {} of {} test labels wrong",
            selection.epsilon,
            selection.f1,
            mismatches,
            flags.len()
        ),
    ))
}
