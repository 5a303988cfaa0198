pub mod activations;
mod layout;
pub mod loss;
mod network;

pub use layout::Layout;
pub use network::Network;
