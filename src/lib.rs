//! A minimal dense feed-forward network engine.
//!
//! A [`Network`] is configured from the widths of its layers, its parameters
//! are initialized uniformly at random, and it's trained one batch at a time
//! with backpropagation and gradient descent:
//!
//! ```
//! use mlpcore::{Network, arch::activations::ActFn};
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let mut net = Network::configure(&[2, 2, 1], ActFn::sigmoid())?;
//! net.init_weights([-1., 1.], &mut StdRng::seed_from_u64(0))?;
//!
//! let x = [0., 0., 0., 1., 1., 0., 1., 1.];
//! let y = [0., 1., 1., 0.];
//! let cost = net.train_batch(0.2, &x, 4, &y, true)?;
//! assert!(cost.is_some());
//!
//! let out = net.predict(&[1., 0.])?;
//! assert_eq!(out.len(), 1);
//! # Ok::<(), mlpcore::MlpErr>(())
//! ```

pub mod arch;
pub mod config;
pub mod dataset;
pub mod error;
pub mod initialization;
pub mod optimization;
pub mod training;

pub use arch::Network;
pub use error::{MlpErr, Result};
