//! Statement fingerprints.
//!
//! A fingerprint is the masked canonical rendering of a statement plus a
//! deterministic uuid-v5 of that text. Two statements that differ only in
//! literal values share a fingerprint, which is what groups structurally
//! identical queries for aggregation. [`FingerprintCache`] wraps parsing
//! and fingerprinting behind an LRU keyed by trimmed statement text, since
//! production logs repeat the same statements heavily.

use std::num::NonZeroUsize;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::parsing::{Statement, parse_sql};

/// Default capacity for the fingerprint cache.
const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// The masked canonical text of a statement and its stable id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub text: String,
    pub id: Uuid,
}

impl Fingerprint {
    /// Fingerprints a parsed statement. The id is a uuid v5 (SHA-1 based)
    /// of the masked rendering, stable across runs and processes.
    pub fn of(statement: &Statement) -> Self {
        let text = statement.render(true);
        let id = Uuid::new_v5(&Uuid::NAMESPACE_OID, text.as_bytes());
        Fingerprint { text, id }
    }
}

/// An LRU cache from raw statement text to fingerprints, so repeated log
/// lines skip re-parsing. Only clean parses are cached; inputs with parse
/// errors are re-parsed every time so the errors surface to each caller.
pub struct FingerprintCache {
    cache: LruCache<String, Vec<Fingerprint>>,
}

impl FingerprintCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).expect("nonzero"));
        FingerprintCache {
            cache: LruCache::new(capacity),
        }
    }

    /// Parses and fingerprints every statement in `sql`, one fingerprint
    /// per statement in source order.
    pub fn fingerprint(&mut self, sql: &str) -> (Vec<Fingerprint>, Vec<Error>) {
        let normalized = sql.trim().to_string();
        if let Some(hit) = self.cache.get(&normalized) {
            return (hit.clone(), Vec::new());
        }
        let (program, errors) = parse_sql(sql);
        let fingerprints: Vec<Fingerprint> =
            program.statements.iter().map(Fingerprint::of).collect();
        if errors.is_empty() {
            self.cache.put(normalized, fingerprints.clone());
        }
        (fingerprints, errors)
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl Default for FingerprintCache {
    fn default() -> Self {
        Self::new()
    }
}
