use gradcheck::checks::{
    LOGISTIC_REFERENCE, anomaly_check, kmeans_check, linear_regression_check,
    logistic_regression_checks, reference_centroids,
};
use gradcheck::synthetic::{anomaly_scenario, group_means, quadrant_blobs};
use gradcheck::validation::{centroids_match, params_match};
use gradcheck::{CheckConfig, GaussianAnomalyDetector, KMeans, LogisticRegression, run_all};
use ndarray::array;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn quick_config() -> CheckConfig {
    CheckConfig {
        kmeans_n_init: 50,
        kmeans_max_iter: 100,
        ..CheckConfig::default()
    }
}

#[test]
fn linear_regression_recovers_coefficients_without_intercept() {
    let mut rng = StdRng::seed_from_u64(42);
    let outcome = linear_regression_check(&quick_config(), &mut rng, false).unwrap();
    assert!(outcome.passed, "{}", outcome);
}

#[test]
fn linear_regression_recovers_coefficients_with_intercept() {
    let mut rng = StdRng::seed_from_u64(7);
    let outcome = linear_regression_check(&quick_config(), &mut rng, true).unwrap();
    assert!(outcome.passed, "{}", outcome);
}

#[test]
fn logistic_regression_matches_reference_and_shrinks() {
    let [plain, shrunk] = logistic_regression_checks(&quick_config()).unwrap();
    assert!(plain.passed, "{}", plain);
    assert!(shrunk.passed, "{}", shrunk);
}

#[test]
fn logistic_reference_is_reproduced_directly() {
    let x = array![
        [0.5, 1.5],
        [1.0, 1.0],
        [1.5, 0.5],
        [3.0, 0.5],
        [2.0, 2.0],
        [1.0, 2.5]
    ];
    let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

    let mut model = LogisticRegression::new().learning_rate(0.1).n_iterations(10_000);
    model.fit(&x, &y).unwrap();

    let reference = ndarray::Array1::from(LOGISTIC_REFERENCE.to_vec());
    assert!(params_match(&reference, &model.parameters().unwrap(), 0.01));
    assert_eq!(model.predict(&x).unwrap(), y);
}

#[test]
fn kmeans_finds_quadrant_centroids() {
    let mut rng = StdRng::seed_from_u64(42);
    let outcome = kmeans_check(&quick_config(), &mut rng).unwrap();
    assert!(outcome.passed, "{}", outcome);
}

#[test]
fn kmeans_assignments_follow_quadrants() {
    let mut rng = StdRng::seed_from_u64(5);
    let (points, quadrants) = quadrant_blobs(&mut rng, 50);

    let mut kmeans = KMeans::new(4).n_init(30).random_state(5);
    let labels = kmeans.fit_predict(&points).unwrap();

    // Each quadrant maps onto exactly one cluster.
    for q in 0..4 {
        let members: Vec<usize> = labels
            .iter()
            .zip(&quadrants)
            .filter(|(_, quadrant)| **quadrant == q)
            .map(|(label, _)| *label)
            .collect();
        assert!(members.iter().all(|&l| l == members[0]));
    }

    let reference = group_means(&points, &quadrants, 4).unwrap();
    let centroids = kmeans.cluster_centers.as_ref().unwrap();
    assert!(centroids_match(&reference, centroids, 1e-9).unwrap());
}

#[test]
fn linfa_reference_lands_on_quadrant_means() {
    let mut rng = StdRng::seed_from_u64(3);
    let (points, quadrants) = quadrant_blobs(&mut rng, 100);

    let reference = reference_centroids(&points, 4, 20, 100, 3).unwrap();
    assert_eq!(reference.shape(), &[4, 2]);

    let means = group_means(&points, &quadrants, 4).unwrap();
    assert!(centroids_match(&means, &reference, 0.01).unwrap());
}

#[test]
fn kmeans_matches_linfa_on_same_points() {
    let mut rng = StdRng::seed_from_u64(21);
    let (points, _) = quadrant_blobs(&mut rng, 100);

    let mut kmeans = KMeans::new(4).n_init(20).max_iter(100).random_state(21);
    kmeans.fit(&points).unwrap();
    let reference = reference_centroids(&points, 4, 20, 100, 21).unwrap();

    let centroids = kmeans.cluster_centers.as_ref().unwrap();
    assert!(centroids_match(&reference, centroids, 0.01).unwrap());
}

#[test]
fn anomaly_detection_reproduces_test_labels() {
    let mut rng = StdRng::seed_from_u64(42);
    let outcome = anomaly_check(&mut rng).unwrap();
    assert!(outcome.passed, "{}", outcome);
}

#[test]
fn anomaly_threshold_comes_from_validation_split() {
    let mut rng = StdRng::seed_from_u64(11);
    let scenario = anomaly_scenario(&mut rng).unwrap();

    let mut detector = GaussianAnomalyDetector::new();
    detector.fit(&scenario.train).unwrap();
    let selection = detector
        .select_threshold(&scenario.validation, &scenario.validation_labels)
        .unwrap();
    assert_eq!(selection.f1, 1.0);

    let log_density = detector.log_density(&scenario.validation).unwrap();
    let worst_normal = log_density
        .iter()
        .take(50)
        .copied()
        .fold(f64::INFINITY, f64::min);
    let best_anomaly = log_density
        .iter()
        .skip(50)
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    assert!(selection.log_epsilon > best_anomaly);
    assert!(selection.log_epsilon <= worst_normal);
}

#[test]
fn all_checks_pass_and_are_reproducible() {
    let config = quick_config();
    let first = run_all(&config);
    let second = run_all(&config);

    assert_eq!(first.total(), 6);
    assert!(first.all_passed(), "{}", first);
    assert_eq!(first.outcomes, second.outcomes);
    assert!(first.to_string().ends_with("Out of the 6 checks, 6 have passed"));
}
