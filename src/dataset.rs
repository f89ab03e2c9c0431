use crate::error::{MlError, Result};
use crate::{Matrix, Vector};
use ndarray::s;

/// Features paired row-wise with their targets.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub features: Matrix,
    pub targets: Vector,
}

impl Dataset {
    pub fn new(features: Matrix, targets: Vector) -> Result<Self> {
        check_samples(&features, &targets)?;
        Ok(Self { features, targets })
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }
}

/// Fails fast when `x` and `y` are not aligned row-wise or `x` is empty.
pub fn check_samples(x: &Matrix, y: &Vector) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(MlError::ShapeMismatch {
            x_rows: x.nrows(),
            y_len: y.len(),
        });
    }
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(MlError::EmptyInput);
    }
    Ok(())
}

/// Returns `x` with a leading column of ones.
pub fn add_intercept_column(x: &Matrix) -> Matrix {
    let mut design = Matrix::ones((x.nrows(), x.ncols() + 1));
    design.slice_mut(s![.., 1..]).assign(x);
    design
}
