//! Error types raised while building arbitraries or parsing size tokens.

use thiserror::Error;

/// Errors reported synchronously when a combinator is constructed.
///
/// These are never produced during generation or shrinking: a successfully
/// built arbitrary is always usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArbitraryError {
    /// A bounded range whose minimum exceeds its maximum
    #[error(
        "maximum value should be equal or greater than the minimum one (got min={min}, max={max})"
    )]
    InvalidRange { min: String, max: String },

    /// Length bounds in the wrong order
    #[error(
        "{label} expects min_length to be lower than or equal to max_length \
         (got min_length={min_length}, max_length={max_length})"
    )]
    InvalidLengthBounds {
        label: &'static str,
        min_length: usize,
        max_length: usize,
    },

    /// A weighted-entry set with no entries at all
    #[error("{label} expects at least one weighted arbitrary")]
    NoEntries { label: &'static str },

    /// A weighted-entry set whose weights sum to zero
    #[error("{label} expects the sum of weights to be strictly superior to 0")]
    ZeroTotalWeight { label: &'static str },
}

impl ArbitraryError {
    /// Create an invalid range error from any displayable bounds
    pub fn invalid_range(min: impl ToString, max: impl ToString) -> Self {
        Self::InvalidRange {
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}

/// Errors produced when parsing a size token from text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SizeParseError {
    #[error("unknown size '{0}' (expected xsmall, small, medium, large or xlarge)")]
    UnknownSize(String),

    #[error("unknown relative size '{0}' (expected -4..-1, =, +1..+4)")]
    UnknownRelativeSize(String),

    #[error("invalid depth size '{0}' (expected a size token or a strictly positive number)")]
    InvalidDepthSize(String),
}
