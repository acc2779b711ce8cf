use thiserror::Error;

/// An error that can occur when operating on a vector.
///
/// Every operation that returns a `VecError` leaves the vector in the state it was in before the
/// call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VecError {
    /// Memory could not be allocated or reallocated, a size computation overflowed, or a
    /// fixed-capacity vector ran out of room.
    #[error("out of memory")]
    OutOfMemory,

    /// An element was removed from an empty vector.
    #[error("vector is empty")]
    Underflow,

    /// The buffer handed to a fixed-capacity vector is misaligned or too small for the requested
    /// capacity.
    #[error("invalid fixed buffer")]
    InvalidBuffer,
}

#[cfg(test)]
mod tests {
    use super::VecError;

    #[test]
    fn display() {
        assert_eq!(VecError::OutOfMemory.to_string(), "out of memory");
        assert_eq!(VecError::Underflow.to_string(), "vector is empty");
        assert_eq!(VecError::InvalidBuffer.to_string(), "invalid fixed buffer");
    }
}
