use std::{
    collections::TryReserveError,
    error::Error,
    fmt::{self, Display},
};

use ndarray::ShapeError;
use rand::distr::uniform;

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, MlpErr>;

/// The engine's error type.
#[derive(Debug)]
pub enum MlpErr {
    InvalidArgument {
        what: &'static str,
        reason: String,
    },
    AllocationFailure {
        what: &'static str,
        len: usize,
        source: Option<TryReserveError>,
    },
}

impl MlpErr {
    pub(crate) fn invalid(what: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            what,
            reason: reason.into(),
        }
    }

    pub(crate) fn size_mismatch(what: &'static str, got: usize, expected: usize) -> Self {
        Self::invalid(what, format!("got length {got}, expected {expected}"))
    }
}

impl Display for MlpErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlpErr::InvalidArgument { what, reason } => {
                write!(f, "invalid argument {what}: {reason}")
            }
            MlpErr::AllocationFailure { what, len, .. } => {
                write!(f, "failed to allocate {len} entries for {what}")
            }
        }
    }
}

impl Error for MlpErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlpErr::AllocationFailure {
                source: Some(e), ..
            } => Some(e),
            _ => None,
        }
    }
}

impl From<ShapeError> for MlpErr {
    fn from(value: ShapeError) -> Self {
        Self::invalid("layout", value.to_string())
    }
}

impl From<uniform::Error> for MlpErr {
    fn from(value: uniform::Error) -> Self {
        Self::invalid("range", value.to_string())
    }
}

/// Allocates a buffer of `len` copies of `value` without aborting on failure.
///
/// # Arguments
/// * `what` - The name of the buffer, used for reporting.
/// * `len` - The amount of elements.
/// * `value` - The value every element starts with.
///
/// # Returns
/// The buffer or an `AllocationFailure` error.
pub(crate) fn try_filled<T: Clone>(what: &'static str, len: usize, value: T) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| MlpErr::AllocationFailure {
            what,
            len,
            source: Some(e),
        })?;

    buf.resize(len, value);
    Ok(buf)
}
