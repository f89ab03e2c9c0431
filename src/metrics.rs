use crate::Vector;
use crate::error::{MlError, Result};

const LOG_CLIP: f64 = 1e-15;

fn check_lengths(y_true: &Vector, y_pred: &Vector) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(MlError::ShapeMismatch {
            x_rows: y_pred.len(),
            y_len: y_true.len(),
        });
    }
    if y_true.is_empty() {
        return Err(MlError::EmptyInput);
    }
    Ok(())
}

pub fn mean_squared_error(y_true: &Vector, y_pred: &Vector) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let diff = y_true - y_pred;
    diff.mapv(|x| x * x).mean().ok_or(MlError::EmptyInput)
}

pub fn r2_score(y_true: &Vector, y_pred: &Vector) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let y_mean = y_true.mean().ok_or(MlError::EmptyInput)?;
    let ss_res = (y_true - y_pred).mapv(|x| x * x).sum();
    let ss_tot = y_true.mapv(|x| (x - y_mean) * (x - y_mean)).sum();

    if ss_tot == 0.0 {
        return Ok(1.0);
    }

    Ok(1.0 - ss_res / ss_tot)
}

/// Mean binary cross-entropy; probabilities are clipped away from 0 and 1.
pub fn log_loss(y_true: &Vector, y_prob: &Vector) -> Result<f64> {
    check_lengths(y_true, y_prob)?;

    let loss = y_true
        .iter()
        .zip(y_prob.iter())
        .map(|(&y, &p)| {
            let p = p.clamp(LOG_CLIP, 1.0 - LOG_CLIP);
            -y * p.ln() - (1.0 - y) * (1.0 - p).ln()
        })
        .sum::<f64>();

    Ok(loss / y_true.len() as f64)
}

pub fn accuracy(y_true: &Vector, y_pred: &Vector) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| (*t - *p).abs() < 1e-10)
        .count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Precision, recall and F1 for the positive class (label `1.0`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BinaryScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

pub fn binary_scores(y_true: &Vector, y_pred: &Vector) -> Result<BinaryScores> {
    check_lengths(y_true, y_pred)?;

    let (mut tp, mut fp, mut fn_) = (0usize, 0usize, 0usize);
    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        match (t == 1.0, p == 1.0) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
    }

    if tp == 0 {
        return Ok(BinaryScores {
            precision: 0.0,
            recall: 0.0,
            f1: 0.0,
        });
    }

    let precision = tp as f64 / (tp + fp) as f64;
    let recall = tp as f64 / (tp + fn_) as f64;
    let f1 = 2.0 * precision * recall / (precision + recall);
    Ok(BinaryScores {
        precision,
        recall,
        f1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mean_squared_error() {
        let y_true = array![1.0, 2.0, 3.0];
        let y_pred = array![1.0, 2.0, 5.0];

        let mse = mean_squared_error(&y_true, &y_pred).unwrap();
        assert!((mse - 4.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_r2_score() {
        let y_true = array![1.0, 2.0, 3.0, 4.0];
        let y_pred = array![1.0, 2.0, 3.0, 4.0];

        let r2 = r2_score(&y_true, &y_pred).unwrap();
        assert!((r2 - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_log_loss_clips_extremes() {
        let y_true = array![1.0, 0.0];
        let y_prob = array![0.0, 1.0];

        let loss = log_loss(&y_true, &y_prob).unwrap();
        assert!(loss.is_finite());
        assert!(loss > 30.0);
    }

    #[test]
    fn test_binary_scores() {
        let y_true = array![1.0, 1.0, 0.0, 0.0];
        let y_pred = array![1.0, 0.0, 1.0, 0.0];

        let scores = binary_scores(&y_true, &y_pred).unwrap();
        assert!((scores.precision - 0.5).abs() < 1e-12);
        assert!((scores.recall - 0.5).abs() < 1e-12);
        assert!((scores.f1 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_binary_scores_without_true_positives() {
        let y_true = array![1.0, 0.0];
        let y_pred = array![0.0, 0.0];

        let scores = binary_scores(&y_true, &y_pred).unwrap();
        assert_eq!(scores.f1, 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        let y_true = array![1.0, 2.0];
        let y_pred = array![1.0];
        assert!(mean_squared_error(&y_true, &y_pred).is_err());
        assert!(accuracy(&y_true, &y_pred).is_err());
    }
}
