use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::{MlpErr, Result, arch::Network};

/// A parameter initializer that draws every value uniformly from a closed range.
#[derive(Clone, Debug)]
pub struct UniformInit {
    low: f64,
    high: f64,
    unit: Uniform<f64>,
}

impl UniformInit {
    /// Creates a new `UniformInit`.
    ///
    /// # Arguments
    /// * `range` - The bounds of the range, in any order.
    ///
    /// # Returns
    /// An error if either bound is not finite.
    pub fn new(range: [f64; 2]) -> Result<Self> {
        if let Some(bound) = range.iter().find(|bound| !bound.is_finite()) {
            return Err(MlpErr::invalid(
                "range",
                format!("bound {bound} is not finite"),
            ));
        }

        let [a, b] = range;
        Ok(Self {
            low: a.min(b),
            high: a.max(b),
            unit: Uniform::new_inclusive(0., 1.)?,
        })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    /// Draws a single value, `low + u * (high - low)` with `u` in `[0, 1]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u = self.unit.sample(rng);
        self.low + u * (self.high - self.low)
    }

    /// Overwrites every element of `params` with an independent draw.
    pub fn fill<R: Rng + ?Sized>(&self, params: &mut [f64], rng: &mut R) {
        for param in params {
            *param = self.sample(rng);
        }
    }
}

impl Network {
    /// Initializes every weight, then every bias, uniformly inside `range`.
    ///
    /// # Arguments
    /// * `range` - The bounds of the range, in any order.
    /// * `rng` - The source of randomness.
    ///
    /// # Returns
    /// An error if either bound is not finite, in which case nothing is written.
    pub fn init_weights<R: Rng + ?Sized>(&mut self, range: [f64; 2], rng: &mut R) -> Result<()> {
        let init = UniformInit::new(range)?;

        init.fill(self.weights_mut(), rng);
        init.fill(self.biases_mut(), rng);

        log::debug!(low = init.low(), high = init.high(); "initialized parameters");
        Ok(())
    }
}
