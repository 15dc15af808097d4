/// Error types for option and identifier operations.
use thiserror::Error;

/// Error type for option store operations.
///
/// Both `set` and `get` report every malformed input through the single
/// invalid-argument condition: wrong buffer length, out-of-range value,
/// unrecognized option identifier, or an undersized read buffer. A failed
/// call never changes store state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    /// Caller input malformed; the store is unchanged.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Result type alias for option store operations
pub type Result<T> = std::result::Result<T, OptionError>;

impl OptionError {
    /// Create an invalid-argument error with a short context message
    pub(crate) const fn invalid(msg: &'static str) -> Self {
        Self::InvalidArgument(msg)
    }
}
