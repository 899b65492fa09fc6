//! Error types for the sequence encoding and the motif sampler.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// The given character is not a valid symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSymbol(pub char);

impl Display for InvalidSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "invalid symbol: {:?}", self.0)
    }
}

impl Error for InvalidSymbol {}

/// Invalid data was passed to initialize the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidData;

impl Display for InvalidData {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("invalid data")
    }
}

impl Error for InvalidData {}

/// The sampler could not be started with the given parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SamplerError {
    /// Fewer than two sequences were given.
    NotEnoughSequences(usize),
    /// The motif length is zero or longer than the shortest sequence.
    InvalidMotifLength {
        /// The requested motif length.
        width: usize,
        /// The length of the shortest sequence.
        shortest: usize,
    },
}

impl Display for SamplerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SamplerError::NotEnoughSequences(n) => {
                write!(f, "at least 2 sequences are required, got {}", n)
            }
            SamplerError::InvalidMotifLength { width, shortest } => write!(
                f,
                "invalid motif length: {} (shortest sequence has length {})",
                width, shortest
            ),
        }
    }
}

impl Error for SamplerError {}
