//! The one error type shared by every container in the crate.

use std::collections::TryReserveError;

use thiserror::Error;

/// Things that can go wrong when poking at a container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The key (or element, or handle) asked for isn't in the container.
    #[error("element does not exist")]
    NotFound,

    /// Positional access past the end of a sequence.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Storage for a new node couldn't be reserved. The container is left
    /// exactly as it was before the call.
    #[error("failed to allocate node storage")]
    AllocationFailure(#[from] TryReserveError),
}

pub type Result<T> = std::result::Result<T, Error>;
