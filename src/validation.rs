//! Tolerance comparisons and pass/fail bookkeeping for the algorithm checks.

use crate::Matrix;
use crate::Vector;
use crate::error::{MlError, Result};
use ndarray::{ArrayBase, Axis, Data, Dimension};
use std::fmt;

/// Above this many centroids the exhaustive matching gets too slow.
const MAX_MATCHED_CENTROIDS: usize = 10;

/// `|test - truth| / |truth|`, or `|test|` when the true value is zero.
pub fn relative_error(truth: f64, test: f64) -> f64 {
    if truth == 0.0 {
        test.abs()
    } else {
        ((test - truth) / truth).abs()
    }
}

/// True when both arrays share a shape and every element is within
/// `tolerance` relative error of the true value. NaN never matches.
pub fn params_match<S1, S2, D>(
    truth: &ArrayBase<S1, D>,
    test: &ArrayBase<S2, D>,
    tolerance: f64,
) -> bool
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    D: Dimension,
{
    truth.shape() == test.shape()
        && truth
            .iter()
            .zip(test.iter())
            .all(|(&t, &v)| relative_error(t, v) <= tolerance)
}

/// Exact agreement of two 0/1 label vectors.
pub fn labels_match(truth: &Vector, predicted: &Vector) -> bool {
    truth.len() == predicted.len() && truth.iter().zip(predicted.iter()).all(|(t, p)| t == p)
}

/// Pairs every reference centroid with a distinct fitted centroid so that
/// the total squared distance is minimal. `result[i]` is the fitted row
/// matched to reference row `i`.
pub fn match_centroids(reference: &Matrix, fitted: &Matrix) -> Result<Vec<usize>> {
    if reference.nrows() != fitted.nrows() {
        return Err(MlError::InvalidParameter(format!(
            "cannot match {} reference centroids against {} fitted ones",
            reference.nrows(),
            fitted.nrows()
        )));
    }
    if reference.ncols() != fitted.ncols() {
        return Err(MlError::FeatureMismatch {
            expected: reference.ncols(),
            found: fitted.ncols(),
        });
    }
    if reference.nrows() > MAX_MATCHED_CENTROIDS {
        return Err(MlError::InvalidParameter(format!(
            "centroid matching supports at most {} centroids, got {}",
            MAX_MATCHED_CENTROIDS,
            reference.nrows()
        )));
    }

    let k = reference.nrows();
    let mut cost = Matrix::zeros((k, k));
    for i in 0..k {
        for j in 0..k {
            let diff = &reference.row(i) - &fitted.row(j);
            cost[[i, j]] = diff.dot(&diff);
        }
    }

    let mut matcher = Matcher {
        cost: &cost,
        best_cost: f64::INFINITY,
        best: (0..k).collect(),
        current: Vec::with_capacity(k),
        used: vec![false; k],
    };
    matcher.search(0, 0.0);
    Ok(matcher.best)
}

/// Centroid sets agree within `tolerance` once optimally matched.
pub fn centroids_match(reference: &Matrix, fitted: &Matrix, tolerance: f64) -> Result<bool> {
    let assignment = match_centroids(reference, fitted)?;
    let reordered = fitted.select(Axis(0), &assignment);
    Ok(params_match(reference, &reordered, tolerance))
}

struct Matcher<'a> {
    cost: &'a Matrix,
    best_cost: f64,
    best: Vec<usize>,
    current: Vec<usize>,
    used: Vec<bool>,
}

impl Matcher<'_> {
    fn search(&mut self, row: usize, partial: f64) {
        if partial >= self.best_cost {
            return;
        }
        if row == self.cost.nrows() {
            self.best_cost = partial;
            self.best.clone_from(&self.current);
            return;
        }
        for col in 0..self.cost.ncols() {
            if self.used[col] {
                continue;
            }
            self.used[col] = true;
            self.current.push(col);
            self.search(row + 1, partial + self.cost[[row, col]]);
            self.current.pop();
            self.used[col] = false;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CheckOutcome {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl CheckOutcome {
    pub fn new(name: impl Into<String>, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }

    /// An outcome for a check that could not run to completion.
    pub fn errored(name: impl Into<String>, error: &MlError) -> Self {
        Self::new(name, false, format!("error: {}", error))
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "PASS" } else { "FAIL" };
        write!(f, "[{}] {}: {}", status, self.name, self.detail)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Report {
    pub outcomes: Vec<CheckOutcome>,
}

impl Report {
    pub fn push(&mut self, outcome: CheckOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(f, "{}", outcome)?;
        }
        writeln!(f, "Passed all checks? {}!", self.all_passed())?;
        write!(
            f,
            "Out of the {} checks, {} have passed",
            self.total(),
            self.passed()
        )
    }
}
