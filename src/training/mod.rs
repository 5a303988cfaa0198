mod backprop;
mod gradients;
mod trainer;

pub use backprop::Backprop;
pub use gradients::Gradients;
pub use trainer::Trainer;
