use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::arch::activations::ActFn;

/// Activation function selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFnConfig {
    Sigmoid,
    Step,
}

impl From<ActFnConfig> for ActFn {
    fn from(value: ActFnConfig) -> Self {
        match value {
            ActFnConfig::Sigmoid => ActFn::sigmoid(),
            ActFnConfig::Step => ActFn::step(),
        }
    }
}

/// Inline samples, rows of `x_size` inputs followed by `y_size` outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub data: Vec<f64>,
    pub x_size: usize,
    pub y_size: usize,
}

/// Everything needed to run a training session.
///
/// Every field is optional in its JSON form, the defaults train a `2-2-1`
/// sigmoid network on the XOR gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    pub layers: Vec<usize>,
    pub act_fn: ActFnConfig,
    pub weight_range: [f64; 2],
    pub learning_rate: f64,
    pub epochs: NonZeroUsize,
    pub shuffle: bool,
    pub seed: Option<u64>,
    pub dataset: DatasetConfig,
}

impl TrainingConfig {
    /// Parses a `TrainingConfig` from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            data: vec![
                0.0, 0.0, 0.0, //
                0.0, 1.0, 1.0, //
                1.0, 0.0, 1.0, //
                1.0, 1.0, 0.0, //
            ],
            x_size: 2,
            y_size: 1,
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            layers: vec![2, 2, 1],
            act_fn: ActFnConfig::Sigmoid,
            weight_range: [-1., 1.],
            learning_rate: 0.2,
            epochs: NonZeroUsize::new(100_000).unwrap_or(NonZeroUsize::MIN),
            shuffle: false,
            seed: None,
            dataset: DatasetConfig::default(),
        }
    }
}
