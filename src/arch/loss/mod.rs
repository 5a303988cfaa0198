mod loss_fn;
mod squared_error;

pub use loss_fn::LossFn;
pub use squared_error::SquaredError;
