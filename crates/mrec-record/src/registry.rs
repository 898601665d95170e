//! Schema registry and the top-level encode/decode entry points.
//!
//! A kind name maps to a 1-indexed list of version constructors. Entries
//! are only ever appended: reordering or removing a version would make
//! already-published blocks undecodable.
//!
//! Pass a [`SchemaRegistry`] handle explicitly where possible. For hosts that
//! need a process-wide table, [`install`] publishes one exactly once; all
//! registration must happen before that call, after which the table is
//! read-only and may be shared across threads.

use std::collections::HashMap;

use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use mrec_crypto::ContentHasher;
use mrec_types::Cid;

use crate::canonical;
use crate::config::EngineConfig;
use crate::error::{RecordError, RecordResult};
use crate::field::{parse_version, CONTEXT_KEY};
use crate::record::{Constructor, Record};
use crate::value::RawMap;

#[derive(Debug)]
struct KindEntry {
    codec: u64,
    versions: Vec<Constructor>,
}

/// Summary of one registered kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KindInfo {
    pub name: String,
    pub codec: u64,
    pub versions: usize,
}

/// Kind name → versioned record constructors.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    config: EngineConfig,
    kinds: HashMap<String, KindEntry>,
    by_codec: HashMap<u64, String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register `kind` with its constructors; `versions[0]` builds v1.
    pub fn register(
        &mut self,
        kind: &str,
        codec: u64,
        versions: Vec<Constructor>,
    ) -> RecordResult<()> {
        if versions.is_empty() {
            return Err(RecordError::Invariant(format!(
                "\"{kind}\" registered without any version"
            )));
        }
        if self.kinds.contains_key(kind) {
            return Err(RecordError::AlreadyRegistered(kind.to_string()));
        }
        if let Some(existing) = self.by_codec.get(&codec) {
            return Err(RecordError::AlreadyRegistered(format!(
                "codec 0x{codec:x} (used by \"{existing}\")"
            )));
        }
        debug!(kind, codec, versions = versions.len(), "registered kind");
        self.by_codec.insert(codec, kind.to_string());
        self.kinds
            .insert(kind.to_string(), KindEntry { codec, versions });
        Ok(())
    }

    /// Registered kinds sorted by name.
    pub fn kinds(&self) -> Vec<KindInfo> {
        let mut out: Vec<KindInfo> = self
            .kinds
            .iter()
            .map(|(name, entry)| KindInfo {
                name: name.clone(),
                codec: entry.codec,
                versions: entry.versions.len(),
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// The kind registered under a codec tag.
    pub fn kind_for_codec(&self, codec: u64) -> Option<&str> {
        self.by_codec.get(&codec).map(String::as_str)
    }

    /// Number of versions registered for `kind`.
    pub fn version_count(&self, kind: &str) -> RecordResult<usize> {
        self.entry(kind).map(|e| e.versions.len())
    }

    fn entry(&self, kind: &str) -> RecordResult<&KindEntry> {
        self.kinds
            .get(kind)
            .ok_or_else(|| RecordError::SchemaNotRegistered(kind.to_string()))
    }

    /// An empty record of `kind` at `version`, hashing with the configured
    /// algorithm.
    pub fn instantiate(&self, kind: &str, version: u64) -> RecordResult<Record> {
        let entry = self.entry(kind)?;
        let constructor = usize::try_from(version)
            .ok()
            .and_then(|v| v.checked_sub(1))
            .and_then(|i| entry.versions.get(i))
            .ok_or_else(|| RecordError::VersionNotImplemented {
                kind: kind.to_string(),
                version,
            })?;
        let mut record = constructor()?;
        record.set_hasher(ContentHasher::new(self.config.hash));
        Ok(record)
    }

    /// Build, validate, and finalize a record from caller data.
    pub fn encode(&self, kind: &str, version: u64, data: RawMap) -> RecordResult<Record> {
        let mut record = self.instantiate(kind, version)?;
        record.set_data(data)?;
        record.encode()?;
        Ok(record)
    }

    /// Decode canonical bytes of `kind` and verify they hash to `expected`.
    ///
    /// The hash function is taken from `expected`, so blocks produced under
    /// another configuration still verify.
    pub fn decode(&self, kind: &str, raw: &[u8], expected: &Cid) -> RecordResult<Record> {
        if raw.len() > self.config.max_block_size {
            return Err(RecordError::BlockTooLarge {
                size: raw.len(),
                max: self.config.max_block_size,
            });
        }
        let map = canonical::from_bytes(raw)?;
        let version = map
            .get(CONTEXT_KEY)
            .ok_or_else(|| RecordError::MissingRequiredField {
                key: CONTEXT_KEY.to_string(),
            })
            .and_then(parse_version)?;

        let mut record = self.instantiate(kind, version)?;
        record.set_hasher(ContentHasher::for_cid(expected)?);
        record.decode(map)?;
        let computed = record.encode()?;
        if computed != expected {
            warn!(
                kind,
                computed = %computed,
                expected = %expected,
                "content identifier mismatch"
            );
            return Err(RecordError::CidIntegrityMismatch {
                computed: computed.to_string(),
                expected: expected.to_string(),
            });
        }
        Ok(record)
    }

    /// Decode a block whose kind is named by the codec of `expected`.
    pub fn decode_block(&self, raw: &[u8], expected: &Cid) -> RecordResult<Record> {
        let kind = self.kind_for_codec(expected.codec()).ok_or_else(|| {
            RecordError::SchemaNotRegistered(format!("codec 0x{:x}", expected.codec()))
        })?;
        self.decode(kind, raw, expected)
    }
}

static GLOBAL: OnceCell<SchemaRegistry> = OnceCell::new();

/// Publish the process-wide registry. Succeeds once.
pub fn install(registry: SchemaRegistry) -> RecordResult<()> {
    GLOBAL
        .set(registry)
        .map_err(|_| RecordError::AlreadyRegistered("global schema registry".to_string()))
}

/// The process-wide registry, if [`install`] has run.
pub fn global() -> RecordResult<&'static SchemaRegistry> {
    GLOBAL.get().ok_or_else(|| {
        RecordError::Invariant("global schema registry is not installed".to_string())
    })
}

/// [`SchemaRegistry::encode`] against the installed registry.
pub fn encode(kind: &str, version: u64, data: RawMap) -> RecordResult<Record> {
    global()?.encode(kind, version, data)
}

/// [`SchemaRegistry::decode`] against the installed registry.
pub fn decode(kind: &str, raw: &[u8], expected: &Cid) -> RecordResult<Record> {
    global()?.decode(kind, raw, expected)
}
