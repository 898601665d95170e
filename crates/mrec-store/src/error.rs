use mrec_record::RecordError;
use mrec_types::Cid;

/// Errors from block store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested block was not found.
    #[error("block not found: {0}")]
    NotFound(Cid),

    /// Bytes handed to `put_raw` do not hash to the given identifier.
    #[error("hash mismatch for {cid}: computed {computed}")]
    HashMismatch { cid: Cid, computed: Cid },

    /// A record was stored before it was encoded.
    #[error("{0} has not been encoded")]
    NotEncoded(String),

    /// Decoding or resolving a stored block failed.
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
