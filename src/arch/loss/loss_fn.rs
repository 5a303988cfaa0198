use ndarray::{ArrayView1, ArrayViewMut1};

pub trait LossFn {
    /// The cost of a single prediction.
    fn loss(&self, y_pred: ArrayView1<f64>, y: ArrayView1<f64>) -> f64;

    /// Writes the error of every output neuron into `d`.
    fn loss_prime(&self, y_pred: ArrayView1<f64>, y: ArrayView1<f64>, d: ArrayViewMut1<f64>);
}
