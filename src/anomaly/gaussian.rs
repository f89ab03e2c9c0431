use crate::dataset::check_samples;
use crate::error::{MlError, Result};
use crate::metrics::binary_scores;
use crate::{Matrix, Vector};
use ndarray::{ArrayView1, Axis};
use std::f64::consts::PI;
use tracing::{debug, warn};

/// Relative pivot size below which a covariance is treated as singular.
const PD_TOLERANCE: f64 = 1e-10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CovarianceKind {
    /// Independent features: product of per-feature densities.
    #[default]
    Diagonal,
    /// Multivariate normal with the full sample covariance.
    Full,
}

/// Threshold picked on a labeled validation set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdSelection {
    /// `exp(log_epsilon)`. Underflows to `0.0` once `log_epsilon` drops below
    /// about -745; `predict` always compares against `log_epsilon`.
    pub epsilon: f64,
    pub log_epsilon: f64,
    pub f1: f64,
}

#[derive(Clone, Debug)]
pub struct GaussianAnomalyDetector {
    pub mean: Option<Vector>,
    /// Per-feature variance, floored at `min_variance`.
    pub variance: Option<Vector>,
    /// Sample covariance, only with `CovarianceKind::Full`.
    pub covariance: Option<Matrix>,
    pub threshold: Option<ThresholdSelection>,
    covariance_kind: CovarianceKind,
    n_thresholds: usize,
    min_variance: f64,
    cholesky: Option<Matrix>,
}

impl GaussianAnomalyDetector {
    pub fn new() -> Self {
        Self {
            mean: None,
            variance: None,
            covariance: None,
            threshold: None,
            covariance_kind: CovarianceKind::Diagonal,
            n_thresholds: 1000,
            min_variance: 1e-9,
            cholesky: None,
        }
    }

    pub fn covariance_kind(mut self, kind: CovarianceKind) -> Self {
        self.covariance_kind = kind;
        self
    }

    /// Number of evenly spaced candidates scanned by `select_threshold`.
    pub fn n_thresholds(mut self, n_thresholds: usize) -> Self {
        self.n_thresholds = n_thresholds;
        self
    }

    pub fn min_variance(mut self, min_variance: f64) -> Self {
        self.min_variance = min_variance;
        self
    }

    /// Fits the Gaussian parameters on data assumed to be normal.
    pub fn fit(&mut self, x: &Matrix) -> Result<()> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(MlError::EmptyInput);
        }
        if !(self.min_variance > 0.0) {
            return Err(MlError::InvalidParameter(format!(
                "min_variance must be positive, got {}",
                self.min_variance
            )));
        }

        let mean = x.mean_axis(Axis(0)).ok_or(MlError::EmptyInput)?;
        let mut variance = x.var_axis(Axis(0), 0.0);
        for (j, v) in variance.iter_mut().enumerate() {
            if *v < self.min_variance {
                warn!(feature = j, variance = *v, "variance floored");
                *v = self.min_variance;
            }
        }

        let (covariance, cholesky) = match self.covariance_kind {
            CovarianceKind::Diagonal => (None, None),
            CovarianceKind::Full => {
                let centered = x - &mean;
                let mut cov = centered.t().dot(&centered) / x.nrows() as f64;
                for j in 0..cov.nrows() {
                    cov[[j, j]] = cov[[j, j]].max(self.min_variance);
                }
                let l = cholesky(&cov)?;
                (Some(cov), Some(l))
            }
        };

        debug!(
            n_samples = x.nrows(),
            n_features = x.ncols(),
            kind = ?self.covariance_kind,
            "gaussian parameters fitted"
        );

        self.mean = Some(mean);
        self.variance = Some(variance);
        self.covariance = covariance;
        self.cholesky = cholesky;
        self.threshold = None;
        Ok(())
    }

    /// Natural log of the fitted density at every row of `x`.
    pub fn log_density(&self, x: &Matrix) -> Result<Vector> {
        let mean = self
            .mean
            .as_ref()
            .ok_or(MlError::NotFitted("GaussianAnomalyDetector"))?;
        if x.ncols() != mean.len() {
            return Err(MlError::FeatureMismatch {
                expected: mean.len(),
                found: x.ncols(),
            });
        }

        let log_density: Vector = match (&self.cholesky, &self.variance) {
            (Some(l), _) => {
                let log_det = 2.0 * l.diag().mapv(f64::ln).sum();
                let constant = mean.len() as f64 * (2.0 * PI).ln() + log_det;
                x.rows()
                    .into_iter()
                    .map(|row| {
                        let diff = &row - mean;
                        let z = forward_substitute(l, diff.view());
                        -0.5 * (constant + z.dot(&z))
                    })
                    .collect()
            }
            (None, Some(variance)) => x
                .rows()
                .into_iter()
                .map(|row| {
                    row.iter()
                        .zip(mean.iter().zip(variance.iter()))
                        .map(|(&v, (&mu, &var))| {
                            -0.5 * (2.0 * PI * var).ln() - (v - mu) * (v - mu) / (2.0 * var)
                        })
                        .sum::<f64>()
                })
                .collect(),
            (None, None) => return Err(MlError::NotFitted("GaussianAnomalyDetector")),
        };

        Ok(log_density)
    }

    pub fn density(&self, x: &Matrix) -> Result<Vector> {
        Ok(self.log_density(x)?.mapv(f64::exp))
    }

    /// Scans candidate thresholds on a labeled validation set (`1.0` marks an
    /// anomaly) and keeps the one with the best F1. Among the first run of
    /// candidates sharing the best score, the midpoint is taken.
    pub fn select_threshold(&mut self, x_val: &Matrix, y_val: &Vector) -> Result<ThresholdSelection> {
        check_samples(x_val, y_val)?;
        if self.n_thresholds < 2 {
            return Err(MlError::InvalidParameter(format!(
                "n_thresholds must be >= 2, got {}",
                self.n_thresholds
            )));
        }
        if y_val.iter().any(|&label| label != 0.0 && label != 1.0) {
            return Err(MlError::InvalidLabels(
                "validation labels must be 0 or 1".to_string(),
            ));
        }
        if !y_val.iter().any(|&label| label == 1.0) {
            return Err(MlError::InvalidLabels(
                "validation labels contain no anomalies".to_string(),
            ));
        }

        let log_density = self.log_density(x_val)?;
        let low = log_density.iter().copied().fold(f64::INFINITY, f64::min);
        let high = log_density.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let step = (high - low) / (self.n_thresholds - 1) as f64;

        let candidates: Vec<f64> = (0..self.n_thresholds)
            .map(|i| low + step * i as f64)
            .collect();
        let scores = candidates
            .iter()
            .map(|&log_eps| {
                let predicted = flag_below(&log_density, log_eps);
                binary_scores(y_val, &predicted).map(|s| s.f1)
            })
            .collect::<Result<Vec<f64>>>()?;

        let best_f1 = scores.iter().copied().fold(0.0, f64::max);
        let start = scores.iter().position(|&s| s == best_f1).unwrap_or(0);
        let end = scores[start..]
            .iter()
            .take_while(|&&s| s == best_f1)
            .count()
            + start
            - 1;

        let log_epsilon = 0.5 * (candidates[start] + candidates[end]);
        let selection = ThresholdSelection {
            epsilon: log_epsilon.exp(),
            log_epsilon,
            f1: best_f1,
        };

        debug!(
            log_epsilon,
            f1 = best_f1,
            candidates = self.n_thresholds,
            "anomaly threshold selected"
        );

        self.threshold = Some(selection);
        Ok(selection)
    }

    /// Flags rows whose density falls below the selected threshold (`1.0` = anomalous).
    pub fn predict(&self, x: &Matrix) -> Result<Vector> {
        let threshold = self.threshold.ok_or(MlError::ThresholdNotSelected)?;
        Ok(flag_below(&self.log_density(x)?, threshold.log_epsilon))
    }

    /// Same as `predict` with an explicit density cutoff. A cutoff of `0.0`
    /// flags nothing; use `predict_log_with` when the cutoff is only
    /// representable in log space.
    pub fn predict_with(&self, x: &Matrix, epsilon: f64) -> Result<Vector> {
        if !(epsilon >= 0.0) {
            return Err(MlError::InvalidParameter(format!(
                "epsilon must be non-negative, got {}",
                epsilon
            )));
        }
        Ok(flag_below(&self.log_density(x)?, epsilon.ln()))
    }

    /// Flags rows whose log-density falls below `log_epsilon`.
    pub fn predict_log_with(&self, x: &Matrix, log_epsilon: f64) -> Result<Vector> {
        if log_epsilon.is_nan() {
            return Err(MlError::InvalidParameter(
                "log_epsilon must not be NaN".to_string(),
            ));
        }
        Ok(flag_below(&self.log_density(x)?, log_epsilon))
    }
}

impl Default for GaussianAnomalyDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn flag_below(log_density: &Vector, log_epsilon: f64) -> Vector {
    log_density.mapv(|p| if p < log_epsilon { 1.0 } else { 0.0 })
}

/// Lower-triangular `L` with `L Lᵗ = a`.
fn cholesky(a: &Matrix) -> Result<Matrix> {
    let n = a.nrows();
    let mut l = Matrix::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if !(sum > PD_TOLERANCE * a[[i, i]].abs()) || !sum.is_finite() {
                    return Err(MlError::NotPositiveDefinite);
                }
                l[[i, j]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }

    Ok(l)
}

/// Solves `L z = b` for lower-triangular `L`.
fn forward_substitute(l: &Matrix, b: ArrayView1<f64>) -> Vector {
    let mut z = Vector::zeros(b.len());
    for i in 0..b.len() {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * z[k];
        }
        z[i] = sum / l[[i, i]];
    }
    z
}
