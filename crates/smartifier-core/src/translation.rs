//! Translation table from vertex references to smart graph attribute values.
//!
//! Attribute values are interned once and addressed by index; the key index
//! maps a fully qualified vertex reference (`collection/key`) to the interned
//! attribute. The table also carries a rough estimate of its own memory
//! footprint so a fill pass can stop at a configured limit. The estimate only
//! needs to correlate with real RAM use, not match it.

use std::collections::HashMap;
use std::mem;

/// Fixed per-entry overhead charged for hash map bookkeeping.
const MAP_ENTRY_OVERHEAD: usize = 32;

/// Interned smart graph attribute values plus the vertex reference index.
///
/// Filled single-threaded during a vertex read pass, then shared read-only
/// with the edge workers for lock-free lookups.
#[derive(Debug, Default)]
pub struct TranslationTable {
    attrs: Vec<String>,
    attr_index: HashMap<String, u32>,
    key_index: HashMap<String, u32>,
    mem_usage: usize,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern an attribute value, returning its index.
    pub fn intern(&mut self, att: &str) -> u32 {
        if let Some(&id) = self.attr_index.get(att) {
            return id;
        }
        let id = self.attrs.len() as u32;
        self.attrs.push(att.to_string());
        self.attr_index.insert(att.to_string(), id);
        self.mem_usage += mem::size_of::<(String, u32)>()
            + att.len()
            + 1
            + mem::size_of::<String>()
            + att.len()
            + 1
            + MAP_ENTRY_OVERHEAD;
        id
    }

    /// Record a vertex reference (`collection/key`) for an interned attribute.
    ///
    /// The first recording wins; duplicates are ignored.
    pub fn record_vertex(&mut self, reference: String, id: u32) {
        debug_assert!((id as usize) < self.attrs.len());
        if self.key_index.contains_key(&reference) {
            return;
        }
        self.mem_usage +=
            mem::size_of::<(String, u32)>() + reference.len() + 1 + MAP_ENTRY_OVERHEAD;
        self.key_index.insert(reference, id);
    }

    /// Look up the attribute value for a vertex reference.
    pub fn resolve(&self, reference: &str) -> Option<&str> {
        self.key_index
            .get(reference)
            .map(|&id| self.attrs[id as usize].as_str())
    }

    /// The interned attribute value at `id`.
    pub fn attr(&self, id: u32) -> &str {
        &self.attrs[id as usize]
    }

    /// Approximate memory footprint in bytes.
    pub fn mem_usage(&self) -> usize {
        self.mem_usage
    }

    /// Number of recorded vertex references.
    pub fn len(&self) -> usize {
        self.key_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_index.is_empty()
    }

    /// Drop all entries and reset the memory estimate, keeping allocations out
    /// of the next batch.
    pub fn clear(&mut self) {
        self.attrs.clear();
        self.attr_index.clear();
        self.key_index.clear();
        self.mem_usage = 0;
    }
}
