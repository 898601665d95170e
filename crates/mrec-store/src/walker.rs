//! Path resolution across blocks.
//!
//! [`Record::resolve`](mrec_record::Record::resolve) stops at the first link
//! and hands back the remaining path. The walker picks up there: it loads
//! the linked block, decodes it through the registry, and keeps going.

use mrec_record::{Record, Resolved, SchemaRegistry, Value};
use mrec_types::Cid;
use tracing::{debug, trace};

use crate::error::StoreResult;
use crate::traits::BlockStore;

/// Where a walk ended.
#[derive(Debug)]
pub enum Walked {
    /// The path ended exactly on a block.
    Block { cid: Cid, record: Record },
    /// A value inside a block, or a link the path did not continue through.
    Value(Value),
}

impl Walked {
    /// Flatten into an interchange value.
    pub fn into_value(self) -> Value {
        match self {
            Walked::Block { record, .. } => record.to_value(),
            Walked::Value(value) => value,
        }
    }
}

/// Follows links through a [`BlockStore`], decoding each block with the
/// kind named by its identifier's codec.
pub struct DagWalker<'a, S: BlockStore + ?Sized> {
    store: &'a S,
    registry: &'a SchemaRegistry,
}

impl<'a, S: BlockStore + ?Sized> DagWalker<'a, S> {
    pub fn new(store: &'a S, registry: &'a SchemaRegistry) -> Self {
        Self { store, registry }
    }

    /// Load and verify one block.
    pub fn load(&self, cid: &Cid) -> StoreResult<Record> {
        let bytes = self.store.require(cid)?;
        trace!(%cid, size = bytes.len(), "loading block");
        Ok(self.registry.decode_block(&bytes, cid)?)
    }

    /// Resolve `path` starting at the block `root`.
    pub fn resolve(&self, root: &Cid, path: &[&str]) -> StoreResult<Walked> {
        let mut cid = root.clone();
        let mut segments: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        let mut hops = 0usize;
        loop {
            let record = self.load(&cid)?;
            if segments.is_empty() {
                debug!(root = %root, hops, "walk ended on a block");
                return Ok(Walked::Block { cid, record });
            }
            let borrowed: Vec<&str> = segments.iter().map(String::as_str).collect();
            match record.resolve(&borrowed)? {
                Resolved::Link { cid: next, rest } if !rest.is_empty() => {
                    trace!(from = %cid, to = %next, remaining = rest.len(), "following link");
                    cid = next;
                    segments = rest;
                    hops += 1;
                }
                other => {
                    debug!(root = %root, hops, "walk ended on a value");
                    return Ok(Walked::Value(other.into_value()));
                }
            }
        }
    }

    /// Resolve a slash-separated path such as `stakeholders/stakeholders/0/stakeholder/id`.
    pub fn resolve_path(&self, root: &Cid, path: &str) -> StoreResult<Walked> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.resolve(root, &segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory::InMemoryBlockStore;
    use mrec_crypto::ContentHasher;
    use mrec_record::json::map_from_json;
    use mrec_record::{RawMap, RecordError};
    use mrec_types::codec;
    use serde_json::json;

    struct Graph {
        store: InMemoryBlockStore,
        registry: SchemaRegistry,
        kernel: Cid,
        content: Cid,
    }

    fn put(
        store: &InMemoryBlockStore,
        registry: &SchemaRegistry,
        kind: &str,
        data: serde_json::Value,
    ) -> Cid {
        let record = registry
            .encode(kind, 1, map_from_json(&data).unwrap())
            .unwrap();
        store.put(&record).unwrap()
    }

    fn link(cid: &Cid) -> serde_json::Value {
        json!({ "/": cid.to_string() })
    }

    fn terms() -> Cid {
        ContentHasher::SHA2_256.cid(codec::RAW, b"terms")
    }

    fn graph() -> Graph {
        let store = InMemoryBlockStore::new();
        let registry = mrec_schemas::registry().unwrap();
        let put = |kind: &str, data| put(&store, &registry, kind, data);

        let alice = put("entity", json!({ "id": "alice", "name": "Alice" }));
        let stakeholders = put(
            "stakeholders",
            json!({ "stakeholders": [
                { "type": "Creator", "stakeholder": link(&alice), "sharing": 100 }
            ]}),
        );
        let rights = put(
            "rights",
            json!({ "rights": [{
                "holder": link(&alice),
                "type": "License",
                "terms": link(&terms()),
                "period": { "to": "2030-01-01T00:00:00+08:00" },
            }]}),
        );
        let content = put(
            "content",
            json!({
                "type": "article",
                "version": 1,
                "fingerprint": "hash://sha256/00",
                "title": "Walks",
            }),
        );

        let mut data = RawMap::new();
        data.insert("id".into(), Value::Bytes(vec![3; 32]));
        data.insert("timestamp".into(), "2021-06-01T12:00:00Z".into());
        data.insert("version".into(), 1u8.into());
        data.insert("rights".into(), Value::Link(rights));
        data.insert("stakeholders".into(), Value::Link(stakeholders));
        data.insert("content".into(), Value::Link(content.clone()));
        let kernel = registry.encode("iscn", 1, data).unwrap();
        let kernel = store.put(&kernel).unwrap();

        Graph {
            store,
            registry,
            kernel,
            content,
        }
    }

    #[test]
    fn follows_links_across_blocks() {
        let g = graph();
        let walker = DagWalker::new(&g.store, &g.registry);
        let name = walker
            .resolve_path(&g.kernel, "stakeholders/stakeholders/0/stakeholder/name")
            .unwrap()
            .into_value();
        assert_eq!(name, Value::from("Alice"));

        let to = walker
            .resolve_path(&g.kernel, "rights/rights/0/period/to")
            .unwrap()
            .into_value();
        assert_eq!(to, Value::from("2030-01-01T00:00:00+08:00"));
    }

    #[test]
    fn terminal_link_is_not_followed() {
        let g = graph();
        let walker = DagWalker::new(&g.store, &g.registry);
        let walked = walker.resolve(&g.kernel, &["content"]).unwrap();
        assert_eq!(walked.into_value(), Value::Link(g.content.clone()));
    }

    #[test]
    fn empty_path_returns_the_block() {
        let g = graph();
        let walker = DagWalker::new(&g.store, &g.registry);
        match walker.resolve(&g.content, &[]).unwrap() {
            Walked::Block { cid, record } => {
                assert_eq!(cid, g.content);
                assert_eq!(record.get_str("title").unwrap(), "Walks");
            }
            other => panic!("expected a block, got {other:?}"),
        }
    }

    #[test]
    fn missing_block_is_not_found() {
        let g = graph();
        let alice = walker_alice(&g);
        g.store.delete(&alice).unwrap();
        let walker = DagWalker::new(&g.store, &g.registry);
        assert!(matches!(
            walker.resolve_path(&g.kernel, "stakeholders/stakeholders/0/stakeholder/id"),
            Err(StoreError::NotFound(cid)) if cid == alice
        ));
    }

    fn walker_alice(g: &Graph) -> Cid {
        let walker = DagWalker::new(&g.store, &g.registry);
        match walker
            .resolve_path(&g.kernel, "stakeholders/stakeholders/0/stakeholder")
            .unwrap()
            .into_value()
        {
            Value::Link(cid) => cid,
            other => panic!("expected a link, got {other:?}"),
        }
    }

    #[test]
    fn unknown_key_in_linked_block() {
        let g = graph();
        let walker = DagWalker::new(&g.store, &g.registry);
        assert!(matches!(
            walker.resolve_path(&g.kernel, "content/nope"),
            Err(StoreError::Record(RecordError::PathResolution(_)))
        ));
    }

    #[test]
    fn raw_blocks_cannot_be_walked_into() {
        let g = graph();
        g.store.put_raw(&terms(), b"terms").unwrap();
        let walker = DagWalker::new(&g.store, &g.registry);
        assert!(matches!(
            walker.resolve_path(&g.kernel, "rights/rights/0/terms/anything"),
            Err(StoreError::Record(RecordError::SchemaNotRegistered(_)))
        ));
    }
}
