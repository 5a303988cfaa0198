use ndarray::{ArrayView1, ArrayViewMut1, Axis, linalg};

use super::Gradients;
use crate::{
    MlpErr, Result,
    arch::{
        Network,
        loss::{LossFn, SquaredError},
    },
    error::try_filled,
    optimization::{GradientDescent, Optimizer},
};

/// Backpropagation over a batch of samples.
///
/// Holds the scratch of a single training step: the gradient accumulators,
/// the per neuron deltas and the output of the last forward pass. Gradients
/// add up across calls to [`Backprop::accumulate`] until applied.
pub struct Backprop<L: LossFn> {
    loss_fn: L,
    grad: Gradients,
    deltas: Vec<f64>,
    output: Vec<f64>,
}

impl<L: LossFn> Backprop<L> {
    /// Allocates the scratch needed to train `net`.
    ///
    /// # Arguments
    /// * `net` - The network that will be trained.
    /// * `loss_fn` - The function whose gradient gets backpropagated.
    ///
    /// # Returns
    /// A new `Backprop` or an error if any buffer could not be allocated.
    pub fn new(net: &Network, loss_fn: L) -> Result<Self> {
        Ok(Self {
            loss_fn,
            grad: Gradients::zeros(net.layout())?,
            deltas: try_filled("deltas", net.n_neurons(), 0.)?,
            output: try_filled("output", net.outputs(), 0.)?,
        })
    }

    pub fn gradients(&self) -> &Gradients {
        &self.grad
    }

    /// The deltas of every neuron for the last accumulated sample.
    pub fn deltas(&self) -> &[f64] {
        &self.deltas
    }

    /// The cost of the last accumulated sample.
    pub fn loss(&self, y: &[f64]) -> f64 {
        self.loss_fn
            .loss(ArrayView1::from(&self.output[..]), ArrayView1::from(y))
    }

    /// Runs one sample forward and backward through `net`, adding its gradient
    /// to the accumulators.
    ///
    /// # Arguments
    /// * `net` - The network being trained.
    /// * `x` - The input of the sample.
    /// * `y` - The expected output of the sample.
    ///
    /// # Returns
    /// An error if the sample doesn't match the network's shape.
    pub fn accumulate(&mut self, net: &mut Network, x: &[f64], y: &[f64]) -> Result<()> {
        if y.len() != net.outputs() {
            return Err(MlpErr::size_mismatch("expected", y.len(), net.outputs()));
        }

        net.forward(x, &mut self.output)?;

        let layout = net.layout();
        let depth = layout.depth();

        self.loss_fn.loss_prime(
            ArrayView1::from(&self.output[..]),
            ArrayView1::from(y),
            ArrayViewMut1::from(&mut self.deltas[layout.neurons(depth - 1)]),
        );

        for layer in (1..depth).rev() {
            let neurons = layout.neurons(layer);
            let (head, next) = self.deltas.split_at_mut(neurons.end);
            let d = &mut head[neurons.clone()];

            if layer + 1 < depth {
                let w_next = layout.weight_view(layer + 1, net.weights())?;
                let d_next = &next[..layout.neurons(layer + 1).len()];

                linalg::general_mat_vec_mul(
                    1.,
                    &w_next.t(),
                    &ArrayView1::from(d_next),
                    0.,
                    &mut ArrayViewMut1::from(&mut *d),
                );
            }

            let z = &net.preactivations()[neurons.clone()];
            let act_fns = &net.act_fns()[neurons.clone()];
            for ((d, &z), act_fn) in d.iter_mut().zip(z).zip(act_fns) {
                *d *= act_fn.df(z);
            }

            for (db, &d) in self.grad.biases[neurons].iter_mut().zip(d.iter()) {
                *db += d;
            }

            let upstream = match layer {
                1 => x,
                _ => &net.activations()[layout.neurons(layer - 1)],
            };

            let mut dw = layout.weight_view_mut(layer, &mut self.grad.weights)?;
            linalg::general_mat_mul(
                1.,
                &ArrayView1::from(&*d).insert_axis(Axis(1)),
                &ArrayView1::from(upstream).insert_axis(Axis(0)),
                1.,
                &mut dw,
            );
        }

        Ok(())
    }

    /// Updates the parameters of `net` with the accumulated gradient.
    pub fn apply<O: Optimizer>(&self, net: &mut Network, optimizer: &mut O) {
        optimizer.update_params(net.weights_mut(), &self.grad.weights);
        optimizer.update_params(net.biases_mut(), &self.grad.biases);
    }
}

impl Network {
    /// Performs one step of batch gradient descent.
    ///
    /// Every sample is forwarded and backpropagated in order, the gradients
    /// are summed and, once the whole batch went through, every parameter is
    /// moved by `-(learning_rate / samples) * gradient`.
    ///
    /// # Arguments
    /// * `learning_rate` - The length of the step.
    /// * `inputs` - `samples` inputs laid one after the other.
    /// * `samples` - The size of the batch.
    /// * `expected` - `samples` expected outputs laid one after the other.
    /// * `want_cost` - Whether to sum the squared error of the batch.
    ///
    /// # Returns
    /// The summed squared error of the batch if requested, or an error if the
    /// batch is empty, malformed or its scratch could not be allocated. On
    /// error no parameter is modified.
    pub fn train_batch(
        &mut self,
        learning_rate: f64,
        inputs: &[f64],
        samples: usize,
        expected: &[f64],
        want_cost: bool,
    ) -> Result<Option<f64>> {
        if samples == 0 {
            return Err(MlpErr::invalid("samples", "the batch is empty"));
        }

        check_batch("inputs", inputs.len(), samples, self.inputs())?;
        check_batch("expected", expected.len(), samples, self.outputs())?;

        let mut backprop = Backprop::new(self, SquaredError::new())?;
        let mut cost = want_cost.then_some(0.);

        let xs = inputs.chunks_exact(self.inputs());
        let ys = expected.chunks_exact(self.outputs());

        for (x, y) in xs.zip(ys) {
            backprop.accumulate(self, x, y)?;

            if let Some(cost) = cost.as_mut() {
                *cost += backprop.loss(y);
            }
        }

        let mut optimizer = GradientDescent::new(learning_rate).averaged(samples);
        backprop.apply(self, &mut optimizer);

        log::trace!(samples = samples, cost:? = cost; "trained batch");
        Ok(cost)
    }
}

fn check_batch(what: &'static str, len: usize, samples: usize, width: usize) -> Result<()> {
    match samples.checked_mul(width) {
        Some(expected) if expected == len => Ok(()),
        Some(expected) => Err(MlpErr::size_mismatch(what, len, expected)),
        None => Err(MlpErr::invalid(what, format!("{samples} samples overflow"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::activations::ActFn;

    const XOR_X: [f64; 8] = [0., 0., 0., 1., 1., 0., 1., 1.];
    const XOR_Y: [f64; 4] = [0., 1., 1., 0.];

    fn sigmoid_net(shape: &[usize], weights: &[f64], biases: &[f64]) -> Network {
        let mut net = Network::configure(shape, ActFn::sigmoid()).unwrap();
        net.weights_mut().copy_from_slice(weights);
        net.biases_mut().copy_from_slice(biases);
        net
    }

    fn half_cost(net: &mut Network, x: &[f64], y: &[f64]) -> f64 {
        let out = net.predict(x).unwrap();
        out.iter().zip(y).map(|(o, t)| (t - o).powi(2)).sum::<f64>() / 2.
    }

    #[test]
    fn single_layer_gradient_by_hand() {
        let mut net = sigmoid_net(&[2, 1], &[0., 0.], &[0.]);
        let mut backprop = Backprop::new(&net, SquaredError).unwrap();

        backprop.accumulate(&mut net, &[1., 2.], &[1.]).unwrap();

        // output 0.5, error -0.5, sigmoid'(0) = 0.25
        let delta = -0.5 * 0.25;
        assert_eq!(backprop.deltas(), [delta]);
        assert_eq!(backprop.gradients().biases(), [delta]);
        assert_eq!(backprop.gradients().weights(), [delta, 2. * delta]);
        assert_eq!(backprop.loss(&[1.]), 0.25);
    }

    #[test]
    fn gradients_add_up_across_samples() {
        let mut net = sigmoid_net(&[2, 1], &[0., 0.], &[0.]);
        let mut backprop = Backprop::new(&net, SquaredError).unwrap();

        backprop.accumulate(&mut net, &[1., 0.], &[1.]).unwrap();
        backprop.accumulate(&mut net, &[0., 1.], &[0.]).unwrap();

        let (d0, d1) = (-0.5 * 0.25, 0.5 * 0.25);
        assert_eq!(backprop.gradients().biases(), [d0 + d1]);
        assert_eq!(backprop.gradients().weights(), [d0, d1]);
    }

    #[test]
    fn single_sample_gradient_matches_finite_differences() {
        let weights = [0.3, -0.8, 0.5, 0.1, -0.4, 0.9, 0.7, -0.2, 0.6];
        let biases = [0.05, -0.1, 0.2, -0.3];
        let (x, y) = ([0.4, -0.9], [0.8]);
        let h = 1e-6;

        let mut net = sigmoid_net(&[2, 3, 1], &weights, &biases);
        let mut backprop = Backprop::new(&net, SquaredError).unwrap();
        backprop.accumulate(&mut net, &x, &y).unwrap();
        let grad = backprop.gradients().clone();

        let numeric = |nudge: &dyn Fn(&mut Network, f64)| {
            let mut plus = net.clone();
            nudge(&mut plus, h);
            let mut minus = net.clone();
            nudge(&mut minus, -h);

            (half_cost(&mut plus, &x, &y) - half_cost(&mut minus, &x, &y)) / (2. * h)
        };

        for i in 0..weights.len() {
            let approx = numeric(&|net: &mut Network, h: f64| net.weights_mut()[i] += h);
            assert!((approx - grad.weights()[i]).abs() < 1e-8, "weight {i}");
        }

        for i in 0..biases.len() {
            let approx = numeric(&|net: &mut Network, h: f64| net.biases_mut()[i] += h);
            assert!((approx - grad.biases()[i]).abs() < 1e-8, "bias {i}");
        }
    }

    #[test]
    fn single_sample_update_is_a_full_learning_rate_step() {
        let shape = [2, 2, 2];
        let weights = [0.2, -0.3, 0.4, 0.1, -0.5, 0.6, 0.3, -0.7];
        let biases = [0.1, -0.2, 0.05, 0.3];
        let (x, y) = ([1., 0.5], [0., 1.]);
        let lr = 0.7;

        let mut net = sigmoid_net(&shape, &weights, &biases);
        let mut backprop = Backprop::new(&net, SquaredError).unwrap();
        backprop.accumulate(&mut net.clone(), &x, &y).unwrap();
        let grad = backprop.gradients().clone();

        net.train_batch(lr, &x, 1, &y, false).unwrap();

        for i in 0..weights.len() {
            assert_eq!(net.weights()[i], weights[i] - lr * grad.weights()[i]);
        }
        for i in 0..biases.len() {
            assert_eq!(net.biases()[i], biases[i] - lr * grad.biases()[i]);
        }
    }

    #[test]
    fn batch_update_averages_the_gradients() {
        let mut net = sigmoid_net(&[2, 1], &[0., 0.], &[0.]);
        net.train_batch(2., &[1., 0., 0., 1.], 2, &[1., 0.], false)
            .unwrap();

        let (d0, d1) = (-0.5 * 0.25, 0.5 * 0.25);
        assert_eq!(net.weights(), [-d0, -d1]);
        assert_eq!(net.biases(), [-(d0 + d1)]);
    }

    #[test]
    fn cost_is_only_tracked_on_request() {
        let mut net = sigmoid_net(&[2, 1], &[0., 0.], &[0.]);

        let cost = net.train_batch(0., &XOR_X, 4, &XOR_Y, true).unwrap();
        assert_eq!(cost, Some(4. * 0.25));

        let cost = net.train_batch(0., &XOR_X, 4, &XOR_Y, false).unwrap();
        assert_eq!(cost, None);
    }

    #[test]
    fn empty_batches_are_rejected() {
        let mut net = sigmoid_net(&[2, 1], &[0., 0.], &[0.]);

        assert!(matches!(
            net.train_batch(1., &[], 0, &[], true),
            Err(MlpErr::InvalidArgument { what: "samples", .. })
        ));
    }

    #[test]
    fn malformed_batches_leave_parameters_untouched() {
        let mut net = sigmoid_net(&[2, 1], &[0.1, 0.2], &[0.3]);

        assert!(matches!(
            net.train_batch(1., &XOR_X[..6], 4, &XOR_Y, true),
            Err(MlpErr::InvalidArgument { what: "inputs", .. })
        ));
        assert!(matches!(
            net.train_batch(1., &XOR_X, 4, &XOR_Y[..3], true),
            Err(MlpErr::InvalidArgument { what: "expected", .. })
        ));
        assert!(matches!(
            net.train_batch(1., &XOR_X, usize::MAX, &XOR_Y, true),
            Err(MlpErr::InvalidArgument { what: "inputs", .. })
        ));

        assert_eq!(net.weights(), [0.1, 0.2]);
        assert_eq!(net.biases(), [0.3]);
    }

    #[test]
    fn step_networks_do_not_learn_away_from_the_discontinuity() {
        let mut net = Network::configure(&[2, 2, 1], ActFn::step()).unwrap();
        net.weights_mut()
            .copy_from_slice(&[0.3, 0.2, -0.4, 0.6, 0.5, -0.7]);
        net.biases_mut().copy_from_slice(&[0.1, -0.15, 0.25]);
        let before = net.clone();

        for _ in 0..100 {
            net.train_batch(0.5, &XOR_X, 4, &XOR_Y, true).unwrap();
        }

        assert_eq!(net.weights(), before.weights());
        assert_eq!(net.biases(), before.biases());
    }

    #[test]
    fn step_gradient_fires_exactly_at_zero() {
        let mut net = Network::configure(&[1, 1], ActFn::step()).unwrap();
        let mut backprop = Backprop::new(&net, SquaredError).unwrap();

        // z = 0, output 0, expected 1
        backprop.accumulate(&mut net, &[1.], &[1.]).unwrap();
        assert_eq!(backprop.gradients().biases(), [-1.]);
        assert_eq!(backprop.gradients().weights(), [-1.]);
    }
}
