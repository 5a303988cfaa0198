use ndarray::{ArrayView1, ArrayViewMut1, Zip};

use super::LossFn;

/// Summed squared error, `sum((y - y_pred)^2)`.
///
/// The error it backpropagates is `y_pred - y`, without the factor of two, so
/// the gradients it yields are those of half the cost.
#[derive(Default, Clone, Copy, Debug)]
pub struct SquaredError;

impl SquaredError {
    /// Returns a new `SquaredError`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for SquaredError {
    fn loss(&self, y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
        Zip::from(&y_pred)
            .and(&y)
            .fold(0., |acc, &p, &t| acc + (t - p).powi(2))
    }

    fn loss_prime(&self, y_pred: ArrayView1<f64>, y: ArrayView1<f64>, mut d: ArrayViewMut1<f64>) {
        Zip::from(&mut d)
            .and(&y_pred)
            .and(&y)
            .for_each(|d, &p, &t| *d = p - t);
    }
}
