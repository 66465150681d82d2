//! Checkpoint state returned by buffer reads
//!
//! A buffer read hands out a batch together with a `CheckpointState`. Once the
//! batch has been passed to every sink, the worker returns the state to the
//! buffer via `checkpoint`, releasing the capacity the batch was holding.

/// Acknowledgement token for a batch read from a buffer
///
/// Consumed by `Buffer::checkpoint`; the token cannot be replayed.
#[derive(Debug, PartialEq, Eq)]
pub struct CheckpointState {
    num_records_to_check: usize,
}

impl CheckpointState {
    /// Create a checkpoint state covering `num_records_to_check` records
    pub fn new(num_records_to_check: usize) -> Self {
        Self {
            num_records_to_check,
        }
    }

    /// Number of records covered by this checkpoint
    #[inline]
    pub fn records_to_check(&self) -> usize {
        self.num_records_to_check
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_to_check() {
        assert_eq!(CheckpointState::new(8).records_to_check(), 8);
        assert_eq!(CheckpointState::new(0).records_to_check(), 0);
    }
}
