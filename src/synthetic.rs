//! Seeded synthetic datasets used by the algorithm checks.
//!
//! Every generator draws from the caller's RNG, so a fixed seed reproduces
//! the same data and the same check results.

use crate::dataset::Dataset;
use crate::error::{MlError, Result};
use crate::{Matrix, Vector};
use ndarray::{Axis, array, concatenate, s};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::{Normal, Uniform};
use rand::Rng;

const TRAIN_NORMAL: usize = 400;
const HOLDOUT_NORMAL: usize = 50;
const HOLDOUT_ANOMALOUS: usize = 25;

/// Features drawn from U[-1, 1) with noiseless targets `x · coefficients + intercept`.
pub fn linear_dataset<R: Rng + ?Sized>(
    rng: &mut R,
    n_samples: usize,
    coefficients: &Vector,
    intercept: f64,
) -> Dataset {
    let features = Matrix::random_using(
        (n_samples, coefficients.len()),
        Uniform::new(-1.0, 1.0),
        rng,
    );
    let targets = features.dot(coefficients) + intercept;
    Dataset { features, targets }
}

/// Six linearly separable points with labels `[0, 0, 0, 1, 1, 1]`.
pub fn logistic_fixture() -> Dataset {
    Dataset {
        features: array![
            [0.5, 1.5],
            [1.0, 1.0],
            [1.5, 0.5],
            [3.0, 0.5],
            [2.0, 2.0],
            [1.0, 2.5]
        ],
        targets: array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
    }
}

/// Four clusters mirrored across both axes: x in ±[2, 3.5), y in ±[3, 4.5).
/// Returns the points and the quadrant each point was drawn for.
pub fn quadrant_blobs<R: Rng + ?Sized>(rng: &mut R, per_cluster: usize) -> (Matrix, Vec<usize>) {
    let east = Vector::random_using(per_cluster, Uniform::new(2.0, 3.5), rng);
    let north = Vector::random_using(per_cluster, Uniform::new(3.0, 4.5), rng);
    let west = -&east;
    let south = -&north;

    let quadrants = [(&east, &north), (&east, &south), (&west, &north), (&west, &south)];
    let mut points = Matrix::zeros((quadrants.len() * per_cluster, 2));
    let mut labels = Vec::with_capacity(points.nrows());

    for (k, (xs, ys)) in quadrants.into_iter().enumerate() {
        let mut block = points.slice_mut(s![k * per_cluster..(k + 1) * per_cluster, ..]);
        block.column_mut(0).assign(xs);
        block.column_mut(1).assign(ys);
        labels.extend(std::iter::repeat_n(k, per_cluster));
    }

    (points, labels)
}

/// Mean of the rows carrying each label in `0..n_groups`.
pub fn group_means(x: &Matrix, labels: &[usize], n_groups: usize) -> Result<Matrix> {
    if x.nrows() != labels.len() {
        return Err(MlError::ShapeMismatch {
            x_rows: x.nrows(),
            y_len: labels.len(),
        });
    }

    let mut sums = Matrix::zeros((n_groups, x.ncols()));
    let mut counts = vec![0usize; n_groups];
    for (row, &label) in x.rows().into_iter().zip(labels) {
        if label >= n_groups {
            return Err(MlError::InvalidLabels(format!(
                "label {} out of range for {} groups",
                label, n_groups
            )));
        }
        let mut sum = sums.row_mut(label);
        sum += &row;
        counts[label] += 1;
    }

    for (k, &count) in counts.iter().enumerate() {
        if count == 0 {
            return Err(MlError::InvalidLabels(format!("group {} is empty", k)));
        }
        let mut mean = sums.row_mut(k);
        mean /= count as f64;
    }

    Ok(sums)
}

/// Train/validation/test splits for the Gaussian anomaly detector.
#[derive(Clone, Debug)]
pub struct AnomalyScenario {
    pub train: Matrix,
    pub validation: Matrix,
    pub validation_labels: Vector,
    pub test: Matrix,
    pub test_labels: Vector,
}

/// Bivariate normal data (N(0.5, 1), N(5, 2.5)) with anomalies placed in two
/// boxes more than five standard deviations out on the first feature and
/// three on the second. Validation and test each hold 50 normal points
/// followed by 25 anomalies drawn from different boxes.
pub fn anomaly_scenario<R: Rng + ?Sized>(rng: &mut R) -> Result<AnomalyScenario> {
    let n_normal = TRAIN_NORMAL + 2 * HOLDOUT_NORMAL;
    let normal = bivariate_normal(rng, n_normal, (0.5, 1.0), (5.0, 2.5))?;

    let validation_anomalies = uniform_box(rng, HOLDOUT_ANOMALOUS, (-5.5, -4.5), (12.5, 13.5));
    let test_anomalies = uniform_box(rng, HOLDOUT_ANOMALOUS, (5.5, 6.5), (-3.5, -2.5));

    let train = normal.slice(s![..TRAIN_NORMAL, ..]).to_owned();
    let validation = concatenate(
        Axis(0),
        &[
            normal.slice(s![TRAIN_NORMAL..TRAIN_NORMAL + HOLDOUT_NORMAL, ..]),
            validation_anomalies.view(),
        ],
    )?;
    let test = concatenate(
        Axis(0),
        &[
            normal.slice(s![TRAIN_NORMAL + HOLDOUT_NORMAL.., ..]),
            test_anomalies.view(),
        ],
    )?;

    Ok(AnomalyScenario {
        train,
        validation,
        validation_labels: holdout_labels(),
        test,
        test_labels: holdout_labels(),
    })
}

fn holdout_labels() -> Vector {
    let mut labels = Vector::zeros(HOLDOUT_NORMAL + HOLDOUT_ANOMALOUS);
    labels.slice_mut(s![HOLDOUT_NORMAL..]).fill(1.0);
    labels
}

fn bivariate_normal<R: Rng + ?Sized>(
    rng: &mut R,
    n_samples: usize,
    first: (f64, f64),
    second: (f64, f64),
) -> Result<Matrix> {
    let mut points = Matrix::zeros((n_samples, 2));
    for (j, (mean, std_dev)) in [first, second].into_iter().enumerate() {
        let distribution =
            Normal::new(mean, std_dev).map_err(|e| MlError::InvalidParameter(e.to_string()))?;
        points
            .column_mut(j)
            .assign(&Vector::random_using(n_samples, distribution, rng));
    }
    Ok(points)
}

fn uniform_box<R: Rng + ?Sized>(
    rng: &mut R,
    n_samples: usize,
    x_range: (f64, f64),
    y_range: (f64, f64),
) -> Matrix {
    let mut points = Matrix::zeros((n_samples, 2));
    for (j, (low, high)) in [x_range, y_range].into_iter().enumerate() {
        points
            .column_mut(j)
            .assign(&Vector::random_using(n_samples, Uniform::new(low, high), rng));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_linear_dataset_is_noiseless() {
        let mut rng = StdRng::seed_from_u64(1);
        let data = linear_dataset(&mut rng, 50, &array![15.0, 25.0], 10.0);

        assert_eq!(data.n_samples(), 50);
        assert!(data.features.iter().all(|v| (-1.0..1.0).contains(v)));
        let row = data.features.row(7);
        assert!((data.targets[7] - (10.0 + 15.0 * row[0] + 25.0 * row[1])).abs() < 1e-12);
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = linear_dataset(&mut StdRng::seed_from_u64(9), 10, &array![1.0], 0.0);
        let b = linear_dataset(&mut StdRng::seed_from_u64(9), 10, &array![1.0], 0.0);
        assert_eq!(a.features, b.features);
    }

    #[test]
    fn test_quadrant_blobs_layout() {
        let mut rng = StdRng::seed_from_u64(2);
        let (points, labels) = quadrant_blobs(&mut rng, 20);

        assert_eq!(points.shape(), &[80, 2]);
        assert_eq!(labels.len(), 80);
        for (row, &label) in points.rows().into_iter().zip(&labels) {
            let (x, y) = (row[0], row[1]);
            assert!((2.0..3.5).contains(&x.abs()));
            assert!((3.0..4.5).contains(&y.abs()));
            assert_eq!(label, usize::from(x < 0.0) * 2 + usize::from(y < 0.0));
        }
    }

    #[test]
    fn test_group_means() {
        let x = array![[0.0, 0.0], [2.0, 2.0], [10.0, 10.0]];
        let means = group_means(&x, &[0, 0, 1], 2).unwrap();
        assert_eq!(means, array![[1.0, 1.0], [10.0, 10.0]]);

        assert!(group_means(&x, &[0, 0, 0], 2).is_err());
        assert!(group_means(&x, &[0, 0, 5], 2).is_err());
    }

    #[test]
    fn test_anomaly_scenario_shapes() {
        let mut rng = StdRng::seed_from_u64(3);
        let scenario = anomaly_scenario(&mut rng).unwrap();

        assert_eq!(scenario.train.shape(), &[400, 2]);
        assert_eq!(scenario.validation.shape(), &[75, 2]);
        assert_eq!(scenario.test.shape(), &[75, 2]);
        assert_eq!(scenario.validation_labels.sum(), 25.0);
        assert_eq!(scenario.test_labels[49], 0.0);
        assert_eq!(scenario.test_labels[50], 1.0);
        assert!(scenario.validation[[60, 0]] < -4.5);
        assert!(scenario.test[[60, 0]] >= 5.5);
    }
}
