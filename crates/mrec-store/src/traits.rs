use mrec_record::Record;
use mrec_types::Cid;

use crate::error::{StoreError, StoreResult};

/// Content-addressed block store.
///
/// All implementations must satisfy these invariants:
/// - Blocks are immutable once written. The same bytes always produce the
///   same identifier, so writing twice is a no-op.
/// - `put_raw` verifies the bytes against the identifier before storing.
/// - The store never interprets block contents.
pub trait BlockStore: Send + Sync {
    /// Read a block by identifier. Returns `Ok(None)` if it does not exist.
    fn get(&self, cid: &Cid) -> StoreResult<Option<Vec<u8>>>;

    /// Store already-verified bytes under `cid`.
    fn put_raw(&self, cid: &Cid, bytes: &[u8]) -> StoreResult<()>;

    /// Check whether a block exists.
    fn has(&self, cid: &Cid) -> StoreResult<bool>;

    /// Delete a block. Returns `true` if it existed.
    ///
    /// Intended for garbage collection only; deleting a linked block breaks
    /// every record that points at it.
    fn delete(&self, cid: &Cid) -> StoreResult<bool>;

    /// Store an encoded record and return its identifier.
    fn put(&self, record: &Record) -> StoreResult<Cid> {
        let (Some(cid), Some(bytes)) = (record.cid(), record.raw_data()) else {
            return Err(StoreError::NotEncoded(record.to_string()));
        };
        self.put_raw(cid, bytes)?;
        Ok(cid.clone())
    }

    /// Read a block, failing with `NotFound` when it is absent.
    fn require(&self, cid: &Cid) -> StoreResult<Vec<u8>> {
        self.get(cid)?.ok_or_else(|| StoreError::NotFound(cid.clone()))
    }

    /// Read multiple blocks.
    ///
    /// Default implementation calls `get()` for each identifier.
    fn get_batch(&self, cids: &[Cid]) -> StoreResult<Vec<Option<Vec<u8>>>> {
        cids.iter().map(|cid| self.get(cid)).collect()
    }

    /// Store multiple encoded records and return their identifiers.
    fn put_batch(&self, records: &[&Record]) -> StoreResult<Vec<Cid>> {
        records.iter().map(|record| self.put(record)).collect()
    }
}
