use crate::Matrix;
use crate::error::{MlError, Result};
use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct KMeans {
    pub cluster_centers: Option<Matrix>,
    /// Index of the assigned centroid for every training point.
    pub labels: Option<Vec<usize>>,
    pub inertia: Option<f64>,
    /// Inertia after each iteration of the winning restart.
    pub cost_log: Option<Vec<f64>>,
    n_clusters: usize,
    n_init: usize,
    max_iter: usize,
    random_state: Option<u64>,
}

#[derive(Debug)]
struct Run {
    centroids: Matrix,
    labels: Vec<usize>,
    inertia: f64,
    cost_log: Vec<f64>,
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            cluster_centers: None,
            labels: None,
            inertia: None,
            cost_log: None,
            n_clusters,
            n_init: 10,
            max_iter: 300,
            random_state: None,
        }
    }

    /// Number of independent random initializations.
    pub fn n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    pub fn fit(&mut self, x: &Matrix) -> Result<()> {
        self.validate(x)?;

        let mut rng = match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut best: Option<Run> = None;
        for restart in 0..self.n_init {
            let run = self.single_run(x, &mut rng);
            debug!(
                restart,
                inertia = run.inertia,
                iterations = run.cost_log.len(),
                "k-means restart finished"
            );
            // Strict comparison: the first restart reaching the minimum wins.
            if best.as_ref().is_none_or(|b| run.inertia < b.inertia) {
                best = Some(run);
            }
        }

        let Some(best) = best else {
            return Err(MlError::InvalidParameter("n_init must be > 0".to_string()));
        };

        debug!(
            n_clusters = self.n_clusters,
            n_init = self.n_init,
            inertia = best.inertia,
            "k-means fitted"
        );

        self.cluster_centers = Some(best.centroids);
        self.labels = Some(best.labels);
        self.inertia = Some(best.inertia);
        self.cost_log = Some(best.cost_log);
        Ok(())
    }

    pub fn fit_predict(&mut self, x: &Matrix) -> Result<Vec<usize>> {
        self.fit(x)?;
        self.labels.clone().ok_or(MlError::NotFitted("KMeans"))
    }

    pub fn predict(&self, x: &Matrix) -> Result<Vec<usize>> {
        let centroids = self.fitted_centers(x)?;
        Ok(assign_labels(x, centroids))
    }

    /// Euclidean distance from every point to every centroid.
    pub fn transform(&self, x: &Matrix) -> Result<Matrix> {
        let centroids = self.fitted_centers(x)?;

        let mut distances = Matrix::zeros((x.nrows(), centroids.nrows()));
        for i in 0..x.nrows() {
            for k in 0..centroids.nrows() {
                distances[[i, k]] = squared_distance(x.row(i), centroids.row(k)).sqrt();
            }
        }

        Ok(distances)
    }

    fn fitted_centers(&self, x: &Matrix) -> Result<&Matrix> {
        let centroids = self
            .cluster_centers
            .as_ref()
            .ok_or(MlError::NotFitted("KMeans"))?;

        if x.ncols() != centroids.ncols() {
            return Err(MlError::FeatureMismatch {
                expected: centroids.ncols(),
                found: x.ncols(),
            });
        }
        Ok(centroids)
    }

    fn validate(&self, x: &Matrix) -> Result<()> {
        if self.n_clusters == 0 {
            return Err(MlError::InvalidParameter(
                "n_clusters must be > 0".to_string(),
            ));
        }
        if self.n_init == 0 {
            return Err(MlError::InvalidParameter("n_init must be > 0".to_string()));
        }
        if self.max_iter == 0 {
            return Err(MlError::InvalidParameter(
                "max_iter must be > 0".to_string(),
            ));
        }
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(MlError::EmptyInput);
        }
        if x.nrows() < self.n_clusters {
            return Err(MlError::TooFewSamples {
                n_samples: x.nrows(),
                n_clusters: self.n_clusters,
            });
        }
        Ok(())
    }

    /// One Lloyd run from centroids sampled without replacement from `x`.
    fn single_run<R: Rng + ?Sized>(&self, x: &Matrix, rng: &mut R) -> Run {
        let mut centroids = Matrix::zeros((self.n_clusters, x.ncols()));
        for (k, idx) in sample(rng, x.nrows(), self.n_clusters).into_iter().enumerate() {
            centroids.row_mut(k).assign(&x.row(idx));
        }

        let mut labels = assign_labels(x, &centroids);
        let mut cost_log = Vec::new();

        for _ in 0..self.max_iter {
            update_centroids(x, &labels, &mut centroids, rng);
            let new_labels = assign_labels(x, &centroids);
            cost_log.push(inertia(x, &centroids, &new_labels));

            let converged = new_labels == labels;
            labels = new_labels;
            if converged {
                break;
            }
        }

        let inertia = inertia(x, &centroids, &labels);
        Run {
            centroids,
            labels,
            inertia,
            cost_log,
        }
    }
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
}

fn assign_labels(x: &Matrix, centroids: &Matrix) -> Vec<usize> {
    x.rows()
        .into_iter()
        .map(|point| {
            let mut min_distance = f64::INFINITY;
            let mut closest = 0;
            for (k, centroid) in centroids.rows().into_iter().enumerate() {
                let distance = squared_distance(point, centroid);
                if distance < min_distance {
                    min_distance = distance;
                    closest = k;
                }
            }
            closest
        })
        .collect()
}

/// Moves every centroid to the mean of its points. A centroid left without
/// points is re-seeded from a random data point so it never becomes NaN.
fn update_centroids<R: Rng + ?Sized>(
    x: &Matrix,
    labels: &[usize],
    centroids: &mut Matrix,
    rng: &mut R,
) {
    let n_clusters = centroids.nrows();
    let mut sums = Matrix::zeros(centroids.raw_dim());
    let mut counts = vec![0usize; n_clusters];

    for (point, &label) in x.rows().into_iter().zip(labels) {
        let mut sum = sums.row_mut(label);
        sum += &point;
        counts[label] += 1;
    }

    for k in 0..n_clusters {
        if counts[k] == 0 {
            let idx = rng.gen_range(0..x.nrows());
            warn!(cluster = k, point = idx, "empty cluster re-seeded");
            centroids.row_mut(k).assign(&x.row(idx));
        } else {
            let mean = &sums.row(k) / counts[k] as f64;
            centroids.row_mut(k).assign(&mean);
        }
    }
}

fn inertia(x: &Matrix, centroids: &Matrix, labels: &[usize]) -> f64 {
    x.rows()
        .into_iter()
        .zip(labels)
        .map(|(point, &label)| squared_distance(point, centroids.row(label)))
        .sum()
}
