//! URI Interning Pool
//!
//! Deduplicating storage for namespace URIs. Each distinct URI is stored
//! once and addressed by its insertion index, which never changes for the
//! life of the pool.
//!
//! Storage is `Arc<[u8]>` so the same allocation backs both the index
//! vector and the reverse lookup map, and so lookups can hand out cheap
//! clones across threads.

use std::collections::HashMap;
use std::sync::Arc;

/// Namespace URI pool
///
/// - `uris`: URI for each index
/// - `lookup`: URI content -> index
/// - `predefined`: number of leading entries registered up front
#[derive(Debug, Default)]
pub struct UriPool {
    uris: Vec<Arc<[u8]>>,
    lookup: HashMap<Arc<[u8]>, u32>,
    predefined: usize,
}

impl UriPool {
    /// Create a new empty pool
    pub fn new() -> Self {
        UriPool {
            uris: Vec::with_capacity(32),
            lookup: HashMap::with_capacity(32),
            predefined: 0,
        }
    }

    /// Index of an already interned URI
    #[inline]
    pub fn find(&self, uri: &[u8]) -> Option<u32> {
        self.lookup.get(uri).copied()
    }

    /// Intern a URI, returning its index and whether it was newly added.
    pub fn insert(&mut self, uri: &[u8]) -> (u32, bool) {
        if let Some(index) = self.find(uri) {
            return (index, false);
        }

        let index = self.uris.len() as u32;
        let stored: Arc<[u8]> = Arc::from(uri);
        self.uris.push(Arc::clone(&stored));
        self.lookup.insert(stored, index);
        (index, true)
    }

    /// Intern a list of URIs as the fixed leading entries of the pool.
    pub fn insert_predefined(&mut self, uris: &[&str]) -> Vec<u32> {
        let indices = uris.iter().map(|uri| self.insert(uri.as_bytes()).0).collect();
        self.predefined = self.predefined.max(self.uris.len());
        indices
    }

    /// Get a URI by index
    #[inline]
    pub fn get(&self, index: u32) -> Option<&Arc<[u8]>> {
        self.uris.get(index as usize)
    }

    /// Number of distinct URIs stored
    #[inline]
    pub fn len(&self) -> usize {
        self.uris.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    /// Number of entries registered through [`UriPool::insert_predefined`]
    /// before any document URI was seen.
    pub fn predefined_count(&self) -> usize {
        self.predefined
    }
}
