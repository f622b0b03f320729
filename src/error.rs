//! Error module for the functional connectivity library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum FcError {
    /// Error for invalid arguments, e.g., a non-positive bin width or mismatched dimensions.
    InvalidParameter(String),
    /// Error for a behavioral epoch that stops before it starts.
    InvalidEpoch { start: f64, stop: f64 },
    /// Error for linear-algebra failures, e.g., a precision matrix that is not positive-definite.
    LinearAlgebra(String),
    /// Error for a sample-count list whose length does not match the number of registered graphs.
    CardinalityMismatch { counts: usize, graphs: usize },
    /// Error while parsing tabular input.
    Parse(String),
    /// Error for local I/O operations.
    Io(String),
    /// Error while talking to a remote archive.
    Remote(String),
}

impl fmt::Display for FcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FcError::InvalidParameter(e) => write!(f, "Invalid parameter: {}", e),
            FcError::InvalidEpoch { start, stop } => write!(
                f,
                "Invalid epoch: stop time {} is before start time {}",
                stop, start
            ),
            FcError::LinearAlgebra(e) => write!(f, "Linear algebra error: {}", e),
            FcError::CardinalityMismatch { counts, graphs } => write!(
                f,
                "Cardinality mismatch: {} sample counts for {} graphs",
                counts, graphs
            ),
            FcError::Parse(e) => write!(f, "Parse error: {}", e),
            FcError::Io(e) => write!(f, "I/O error: {}", e),
            FcError::Remote(e) => write!(f, "Remote archive error: {}", e),
        }
    }
}

impl Error for FcError {}
