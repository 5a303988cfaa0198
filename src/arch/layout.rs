use std::ops::Range;

use ndarray::{ArrayView2, ArrayViewMut2};

use crate::{MlpErr, Result, error::try_filled};

/// Where every layer lives inside the network's flat buffers.
///
/// Layer `0` is the input and owns nothing. Every other layer `l` owns a
/// `sizes[l] x sizes[l - 1]` row-major block of weights and `sizes[l]`
/// consecutive neuron slots (biases, preactivations, activations and
/// activation functions all share the same neuron indexing).
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    sizes: Vec<usize>,
    weight_offsets: Vec<usize>,
    neuron_offsets: Vec<usize>,
}

impl Layout {
    /// Creates a new `Layout`.
    ///
    /// # Arguments
    /// * `sizes` - The width of every layer, input first.
    ///
    /// # Returns
    /// An error if there are less than two layers, a layer is empty or the
    /// buffers would not be addressable.
    pub fn new(sizes: &[usize]) -> Result<Self> {
        if sizes.len() < 2 {
            return Err(MlpErr::invalid(
                "layer_sizes",
                format!("need at least 2 layers, got {}", sizes.len()),
            ));
        }

        if let Some(layer) = sizes.iter().position(|&size| size == 0) {
            return Err(MlpErr::invalid(
                "layer_sizes",
                format!("layer {layer} has no neurons"),
            ));
        }

        let mut owned = try_filled("layer_sizes", sizes.len(), 0)?;
        owned.copy_from_slice(sizes);

        let mut weight_offsets = try_filled("weight offsets", sizes.len(), 0)?;
        let mut neuron_offsets = try_filled("neuron offsets", sizes.len(), 0)?;

        for l in 1..sizes.len() {
            let block = sizes[l]
                .checked_mul(sizes[l - 1])
                .and_then(|block| block.checked_add(weight_offsets[l - 1]));
            let neurons = sizes[l].checked_add(neuron_offsets[l - 1]);

            let (Some(w), Some(n)) = (block, neurons) else {
                return Err(MlpErr::AllocationFailure {
                    what: "layout",
                    len: usize::MAX,
                    source: None,
                });
            };

            weight_offsets[l] = w;
            neuron_offsets[l] = n;
        }

        Ok(Self {
            sizes: owned,
            weight_offsets,
            neuron_offsets,
        })
    }

    /// The width of every layer, input first.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// The amount of layers, input included.
    pub fn depth(&self) -> usize {
        self.sizes.len()
    }

    pub fn inputs(&self) -> usize {
        self.sizes[0]
    }

    pub fn outputs(&self) -> usize {
        self.sizes[self.depth() - 1]
    }

    pub fn n_weights(&self) -> usize {
        self.weight_offsets[self.depth() - 1]
    }

    pub fn n_neurons(&self) -> usize {
        self.neuron_offsets[self.depth() - 1]
    }

    /// The range of the flat weight buffer owned by `layer`.
    ///
    /// # Panics
    /// If `layer` is `0` or not lower than `depth`.
    pub fn weights(&self, layer: usize) -> Range<usize> {
        self.weight_offsets[layer - 1]..self.weight_offsets[layer]
    }

    /// The global indices of the neurons of `layer`.
    ///
    /// # Panics
    /// If `layer` is `0` or not lower than `depth`.
    pub fn neurons(&self, layer: usize) -> Range<usize> {
        self.neuron_offsets[layer - 1]..self.neuron_offsets[layer]
    }

    /// Whether `layer` owns parameters, that is, it isn't the input.
    pub fn has_layer(&self, layer: usize) -> bool {
        layer > 0 && layer < self.depth()
    }

    /// Gives a view of the weights of `layer` inside a flat buffer.
    ///
    /// # Arguments
    /// * `layer` - A non input layer.
    /// * `weights` - A buffer shaped like the network's weights.
    ///
    /// # Returns
    /// A `sizes[layer] x sizes[layer - 1]` matrix.
    pub fn weight_view<'a>(
        &self,
        layer: usize,
        weights: &'a [f64],
    ) -> Result<ArrayView2<'a, f64>> {
        let dim = (self.sizes[layer], self.sizes[layer - 1]);
        Ok(ArrayView2::from_shape(dim, &weights[self.weights(layer)])?)
    }

    /// Mutable counterpart of [`Layout::weight_view`].
    pub fn weight_view_mut<'a>(
        &self,
        layer: usize,
        weights: &'a mut [f64],
    ) -> Result<ArrayViewMut2<'a, f64>> {
        let dim = (self.sizes[layer], self.sizes[layer - 1]);
        Ok(ArrayViewMut2::from_shape(dim, &mut weights[self.weights(layer)])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_of_a_three_layer_network() {
        let layout = Layout::new(&[2, 3, 1]).unwrap();

        assert_eq!(layout.depth(), 3);
        assert_eq!(layout.inputs(), 2);
        assert_eq!(layout.outputs(), 1);
        assert_eq!(layout.n_weights(), 9);
        assert_eq!(layout.n_neurons(), 4);

        assert_eq!(layout.weights(1), 0..6);
        assert_eq!(layout.weights(2), 6..9);
        assert_eq!(layout.neurons(1), 0..3);
        assert_eq!(layout.neurons(2), 3..4);
    }

    #[test]
    fn only_non_input_layers_own_parameters() {
        let layout = Layout::new(&[4, 4]).unwrap();

        assert!(!layout.has_layer(0));
        assert!(layout.has_layer(1));
        assert!(!layout.has_layer(2));
    }

    #[test]
    fn too_shallow_layouts_are_rejected() {
        assert!(matches!(
            Layout::new(&[]),
            Err(MlpErr::InvalidArgument { .. })
        ));
        assert!(matches!(
            Layout::new(&[3]),
            Err(MlpErr::InvalidArgument { .. })
        ));
    }

    #[test]
    fn empty_layers_are_rejected() {
        assert!(matches!(
            Layout::new(&[2, 0, 1]),
            Err(MlpErr::InvalidArgument { .. })
        ));
    }

    #[test]
    fn unaddressable_layouts_fail_to_allocate() {
        assert!(matches!(
            Layout::new(&[usize::MAX, 2]),
            Err(MlpErr::AllocationFailure { .. })
        ));
    }

    #[test]
    fn weight_views_are_row_major() {
        let layout = Layout::new(&[3, 2, 1]).unwrap();
        let weights: Vec<f64> = (0..8).map(f64::from).collect();

        let w1 = layout.weight_view(1, &weights).unwrap();
        assert_eq!(w1.dim(), (2, 3));
        assert_eq!(w1[[1, 0]], 3.);

        let w2 = layout.weight_view(2, &weights).unwrap();
        assert_eq!(w2.dim(), (1, 2));
        assert_eq!(w2[[0, 1]], 7.);
    }
}
