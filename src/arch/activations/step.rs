/// Below this magnitude a preactivation counts as sitting on the step.
pub const STEP_EPSILON: f64 = 1e-12;

/// The Heaviside step, `1` for strictly positive inputs and `0` otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Step;

impl Step {
    pub fn new() -> Self {
        Self
    }

    pub fn f(&self, z: f64) -> f64 {
        if z > 0. { 1. } else { 0. }
    }

    /// Pseudo-derivative: `1` only when `z` is within [`STEP_EPSILON`] of the
    /// discontinuity, `0` everywhere else. Networks made of steps are therefore
    /// not trainable by gradient descent.
    pub fn df(&self, z: f64) -> f64 {
        if z.abs() < STEP_EPSILON { 1. } else { 0. }
    }
}
