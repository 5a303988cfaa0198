use crate::{Result, arch::Layout, error::try_filled};

/// Batch scoped accumulators, shaped like the parameters of a network.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradients {
    pub(crate) weights: Vec<f64>,
    pub(crate) biases: Vec<f64>,
}

impl Gradients {
    /// Allocates zeroed accumulators for every weight and bias of `layout`.
    pub fn zeros(layout: &Layout) -> Result<Self> {
        Ok(Self {
            weights: try_filled("weight gradients", layout.n_weights(), 0.)?,
            biases: try_filled("bias gradients", layout.n_neurons(), 0.)?,
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }
}
