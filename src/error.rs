/// Errors returned by grid diagram construction, moves and energy updates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The arrays handed to a constructor do not describe a grid diagram.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A row or column index is outside `[0, size)` (or `[0, size]` where an
    /// insertion point is expected).
    #[error("index {index} out of range for grid of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    /// A move or invariant kind that cannot be used in this position.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The registry has no diagram under this name.
    #[error("link `{0}` not found in registry")]
    NotFound(String),

    /// The registry could not be read or is corrupt.
    #[error("link registry unavailable: {0}")]
    RegistryUnavailable(String),
}

impl GridError {
    pub(crate) fn out_of_range(index: usize, size: usize) -> Self {
        Self::IndexOutOfRange { index, size }
    }
}
