use super::{Sigmoid, Step};

/// The activation function of a single neuron.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActFn {
    Sigmoid(Sigmoid),
    Step(Step),
}

impl ActFn {
    pub fn sigmoid() -> Self {
        Self::Sigmoid(Sigmoid::new())
    }

    pub fn step() -> Self {
        Self::Step(Step::new())
    }

    pub fn f(&self, x: f64) -> f64 {
        match self {
            Self::Sigmoid(a) => a.f(x),
            Self::Step(a) => a.f(x),
        }
    }

    pub fn df(&self, x: f64) -> f64 {
        match self {
            Self::Sigmoid(a) => a.df(x),
            Self::Step(a) => a.df(x),
        }
    }
}
