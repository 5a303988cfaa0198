use std::fmt;

use ndarray::{ArrayView1, ArrayViewMut1, linalg};

use super::{Layout, activations::ActFn};
use crate::{MlpErr, Result, error::try_filled};

/// A dense feed-forward network.
///
/// Information flows forward, layer by layer, when computing an output.
/// Every buffer is flat and indexed through the network's [`Layout`]: weights
/// per layer as row-major blocks (row = destination neuron, column = source
/// neuron), everything else per neuron in layer-major order.
///
/// `preactivations` and `activations` are scratch space owned by the network.
/// They hold the state of the last [`Network::forward`] call and are
/// overwritten by the next one.
#[derive(Clone, Debug)]
pub struct Network {
    layout: Layout,
    weights: Vec<f64>,
    biases: Vec<f64>,
    preactivations: Vec<f64>,
    activations: Vec<f64>,
    act_fns: Vec<ActFn>,
}

impl Network {
    /// Allocates a new `Network`.
    ///
    /// Every parameter starts at zero, so weights should be initialized before
    /// training.
    ///
    /// # Arguments
    /// * `layer_sizes` - The width of every layer, input first.
    /// * `act_fn` - The activation function of every neuron.
    ///
    /// # Returns
    /// A new `Network` or an error if the shape is invalid or a buffer could
    /// not be allocated. Nothing allocated so far survives a failure.
    pub fn configure(layer_sizes: &[usize], act_fn: ActFn) -> Result<Self> {
        let layout = Layout::new(layer_sizes)?;
        let n_weights = layout.n_weights();
        let n_neurons = layout.n_neurons();

        let net = Self {
            weights: try_filled("weights", n_weights, 0.)?,
            biases: try_filled("biases", n_neurons, 0.)?,
            preactivations: try_filled("preactivations", n_neurons, 0.)?,
            activations: try_filled("activations", n_neurons, 0.)?,
            act_fns: try_filled("activation functions", n_neurons, act_fn)?,
            layout,
        };

        log::debug!(
            layers:? = net.layout.sizes(),
            weights = n_weights,
            neurons = n_neurons;
            "configured network"
        );

        Ok(net)
    }

    /// Frees every buffer of the network.
    pub fn release(self) {
        log::debug!(layers:? = self.layout.sizes(); "releasing network");
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn layer_sizes(&self) -> &[usize] {
        self.layout.sizes()
    }

    pub fn inputs(&self) -> usize {
        self.layout.inputs()
    }

    pub fn outputs(&self) -> usize {
        self.layout.outputs()
    }

    pub fn n_weights(&self) -> usize {
        self.weights.len()
    }

    pub fn n_neurons(&self) -> usize {
        self.biases.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    pub fn biases_mut(&mut self) -> &mut [f64] {
        &mut self.biases
    }

    /// The weighted sums plus biases of the last forward pass.
    pub fn preactivations(&self) -> &[f64] {
        &self.preactivations
    }

    /// The neuron outputs of the last forward pass.
    pub fn activations(&self) -> &[f64] {
        &self.activations
    }

    pub fn act_fns(&self) -> &[ActFn] {
        &self.act_fns
    }

    /// Replaces the activation function of a single neuron.
    ///
    /// # Returns
    /// An error if `neuron` is not a valid global neuron index.
    pub fn set_act_fn(&mut self, neuron: usize, act_fn: ActFn) -> Result<()> {
        let n_neurons = self.n_neurons();
        let slot = self.act_fns.get_mut(neuron).ok_or_else(|| {
            MlpErr::invalid("neuron", format!("{neuron} out of {n_neurons} neurons"))
        })?;

        *slot = act_fn;
        Ok(())
    }

    /// The weights of a non input layer, `None` for the input layer or past the
    /// output layer.
    pub fn layer_weights(&self, layer: usize) -> Option<&[f64]> {
        self.layout
            .has_layer(layer)
            .then(|| &self.weights[self.layout.weights(layer)])
    }

    pub fn layer_biases(&self, layer: usize) -> Option<&[f64]> {
        self.layout
            .has_layer(layer)
            .then(|| &self.biases[self.layout.neurons(layer)])
    }

    pub fn layer_activations(&self, layer: usize) -> Option<&[f64]> {
        self.layout
            .has_layer(layer)
            .then(|| &self.activations[self.layout.neurons(layer)])
    }

    pub fn layer_preactivations(&self, layer: usize) -> Option<&[f64]> {
        self.layout
            .has_layer(layer)
            .then(|| &self.preactivations[self.layout.neurons(layer)])
    }

    /// Makes a forward pass through the network.
    ///
    /// Overwrites the preactivations and activations of every neuron.
    ///
    /// # Arguments
    /// * `input` - One sample, as wide as the input layer.
    /// * `output` - Where to write the output layer's activations.
    ///
    /// # Returns
    /// An error if either buffer doesn't match the network's shape.
    pub fn forward(&mut self, input: &[f64], output: &mut [f64]) -> Result<()> {
        if input.len() != self.inputs() {
            return Err(MlpErr::size_mismatch("input", input.len(), self.inputs()));
        }

        if output.len() != self.outputs() {
            return Err(MlpErr::size_mismatch("output", output.len(), self.outputs()));
        }

        let Self {
            layout,
            weights,
            biases,
            preactivations,
            activations,
            act_fns,
        } = self;

        for layer in 1..layout.depth() {
            let neurons = layout.neurons(layer);
            let w = layout.weight_view(layer, weights)?;

            let (done, pending) = activations.split_at_mut(neurons.start);
            let x = match layer {
                1 => input,
                _ => &done[layout.neurons(layer - 1)],
            };

            let z = &mut preactivations[neurons.clone()];
            z.copy_from_slice(&biases[neurons.clone()]);
            linalg::general_mat_vec_mul(
                1.,
                &w,
                &ArrayView1::from(x),
                1.,
                &mut ArrayViewMut1::from(&mut *z),
            );

            let a = &mut pending[..neurons.len()];
            for ((a, &z), act_fn) in a.iter_mut().zip(z.iter()).zip(&act_fns[neurons]) {
                *a = act_fn.f(z);
            }
        }

        let last = layout.neurons(layout.depth() - 1);
        output.copy_from_slice(&activations[last]);

        Ok(())
    }

    /// Makes a forward pass and returns a copy of the output.
    pub fn predict(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        let mut output = try_filled("output", self.outputs(), 0.)?;
        self.forward(input, &mut output)?;
        Ok(output)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, w) in self.weights.iter().enumerate() {
            write!(f, "w[{i}] = {w:.6},   ")?;
        }
        writeln!(f)?;

        for (i, b) in self.biases.iter().enumerate() {
            write!(f, "b[{i}] = {b:.6},   ")?;
        }
        writeln!(f)
    }
}
