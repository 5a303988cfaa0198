use std::num::NonZeroUsize;

use log::{debug, info};
use rand::Rng;

use crate::{Result, arch::Network, dataset::Dataset};

/// Repeats full batch training steps over a dataset.
#[derive(Clone, Copy, Debug)]
pub struct Trainer {
    epochs: NonZeroUsize,
    learning_rate: f64,
    shuffle: bool,
    log_every: usize,
}

impl Trainer {
    /// Returns a new `Trainer`.
    ///
    /// # Arguments
    /// * `epochs` - The amount of training steps.
    /// * `learning_rate` - The length of every step.
    pub fn new(epochs: NonZeroUsize, learning_rate: f64) -> Self {
        Self {
            epochs,
            learning_rate,
            shuffle: false,
            log_every: (epochs.get() / 5).max(1),
        }
    }

    /// Whether to shuffle the dataset before every epoch.
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Trains `net` over the whole `dataset` once per epoch.
    ///
    /// # Arguments
    /// * `net` - The network to train.
    /// * `dataset` - The samples, each epoch is a single batch.
    /// * `rng` - Used for shuffling.
    ///
    /// # Returns
    /// The summed squared error of every epoch, measured while training it.
    pub fn train<R: Rng + ?Sized>(
        &self,
        net: &mut Network,
        dataset: &mut Dataset,
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        let epochs = self.epochs.get();
        let mut losses = Vec::with_capacity(epochs);

        for epoch in 1..=epochs {
            if self.shuffle {
                dataset.shuffle(rng);
            }

            let cost = net
                .train_batch(
                    self.learning_rate,
                    dataset.inputs(),
                    dataset.len(),
                    dataset.expected(),
                    true,
                )?
                .unwrap_or_default();

            if epoch % self.log_every == 0 {
                debug!(epoch = epoch, cost = cost; "finished epoch");
            }

            losses.push(cost);
        }

        if let Some(last) = losses.last() {
            info!(epochs = epochs, cost = *last; "training finished");
        }

        Ok(losses)
    }
}
