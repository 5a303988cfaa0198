mod uniform;

pub use uniform::UniformInit;
