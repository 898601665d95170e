use std::collections::HashMap;
use std::sync::RwLock;

use mrec_crypto::ContentHasher;
use mrec_record::RecordError;
use mrec_types::Cid;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::BlockStore;

/// In-memory, HashMap-based block store.
///
/// Intended for tests and embedding. Blocks are held behind a `RwLock` for
/// safe concurrent access and cloned on read.
pub struct InMemoryBlockStore {
    blocks: RwLock<HashMap<Cid, Vec<u8>>>,
}

impl InMemoryBlockStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.blocks.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored blocks.
    pub fn total_bytes(&self) -> usize {
        self.blocks
            .read()
            .expect("lock poisoned")
            .values()
            .map(Vec::len)
            .sum()
    }

    /// Return a sorted list of all identifiers in the store.
    pub fn all_cids(&self) -> Vec<Cid> {
        let map = self.blocks.read().expect("lock poisoned");
        let mut cids: Vec<Cid> = map.keys().cloned().collect();
        cids.sort();
        cids
    }
}

impl Default for InMemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore for InMemoryBlockStore {
    fn get(&self, cid: &Cid) -> StoreResult<Option<Vec<u8>>> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map.get(cid).cloned())
    }

    fn put_raw(&self, cid: &Cid, bytes: &[u8]) -> StoreResult<()> {
        let hasher = ContentHasher::for_cid(cid).map_err(RecordError::from)?;
        let computed = hasher.cid(cid.codec(), bytes);
        if &computed != cid {
            warn!(%cid, %computed, "refusing block with mismatched hash");
            return Err(StoreError::HashMismatch {
                cid: cid.clone(),
                computed,
            });
        }
        let mut map = self.blocks.write().expect("lock poisoned");
        // Idempotent: the same identifier always maps to the same bytes.
        if !map.contains_key(cid) {
            debug!(%cid, size = bytes.len(), "block stored");
            map.insert(cid.clone(), bytes.to_vec());
        }
        Ok(())
    }

    fn has(&self, cid: &Cid) -> StoreResult<bool> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map.contains_key(cid))
    }

    fn delete(&self, cid: &Cid) -> StoreResult<bool> {
        let mut map = self.blocks.write().expect("lock poisoned");
        Ok(map.remove(cid).is_some())
    }
}

impl std::fmt::Debug for InMemoryBlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlockStore")
            .field("block_count", &self.len())
            .finish()
    }
}
