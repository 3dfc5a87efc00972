//! Namespace Registry
//!
//! Interns namespace URIs into [`NsId`] handles. Two flavours share the
//! [`NamespaceStore`] capability and are chosen when the parser is built:
//!
//! - [`NamespaceRegistry`]: one parse at a time, no locking
//! - [`SharedNamespaceRegistry`]: many parses on many threads, guarded by
//!   a `parking_lot::RwLock`
//!
//! Once interned, a URI keeps its identity for the life of the registry.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

use super::context::NamespaceContext;
use super::pool::UriPool;

/// Well-known namespace URIs
pub mod uri {
    pub const XML: &[u8] = b"http://www.w3.org/XML/1998/namespace";
    pub const XMLNS: &[u8] = b"http://www.w3.org/2000/xmlns/";
}

/// Interned namespace identity.
///
/// Comparison is by identity. Two ids from the same registry are equal
/// exactly when their URIs are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NsId(u32);

impl NsId {
    /// No namespace is bound, or the URI was empty.
    pub const UNKNOWN: NsId = NsId(u32::MAX);

    #[inline]
    pub(crate) const fn from_index(index: u32) -> Self {
        NsId(index)
    }

    #[inline]
    pub fn is_unknown(self) -> bool {
        self == NsId::UNKNOWN
    }

    /// Registry index, None for the sentinel
    #[inline]
    pub fn index(self) -> Option<usize> {
        if self.is_unknown() {
            None
        } else {
            Some(self.0 as usize)
        }
    }
}

impl Default for NsId {
    fn default() -> Self {
        NsId::UNKNOWN
    }
}

impl fmt::Display for NsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index() {
            Some(index) => write!(f, "ns{}", index),
            None => f.write_str("???"),
        }
    }
}

/// Storage capability behind a [`NamespaceContext`].
///
/// All methods take `&self`; flavours provide their own interior mutability.
pub trait NamespaceStore {
    /// Intern a URI. The same URI always yields the same id; an empty URI
    /// yields [`NsId::UNKNOWN`].
    fn intern(&self, uri: &[u8]) -> NsId;

    /// URI of an interned id
    fn uri(&self, id: NsId) -> Option<Arc<[u8]>>;

    /// Number of interned URIs
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of an id issued by this store
    fn index(&self, id: NsId) -> Option<usize> {
        id.index().filter(|&index| index < self.len())
    }

    /// Id for a registry index, or the sentinel when out of range
    fn identifier(&self, index: usize) -> NsId {
        if index < self.len() {
            NsId::from_index(index as u32)
        } else {
            NsId::UNKNOWN
        }
    }

    /// Short display name: `ns<index>`, or `???` for ids this store does not know
    fn short_name(&self, id: NsId) -> String {
        match self.index(id) {
            Some(index) => format!("ns{}", index),
            None => "???".to_string(),
        }
    }
}

fn log_new_uri(index: u32, uri: &[u8]) {
    debug!("namespace registry: ns{} = '{}'", index, uri.escape_ascii());
}

/// Single-threaded registry
#[derive(Debug, Default)]
pub struct NamespaceRegistry {
    pool: RefCell<UriPool>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        NamespaceRegistry {
            pool: RefCell::new(UriPool::new()),
        }
    }

    /// Create a registry whose first identities are `uris`, in order
    pub fn with_predefined(uris: &[&str]) -> Self {
        let registry = Self::new();
        registry.add_predefined(uris);
        registry
    }

    /// Pre-intern a static URI list
    pub fn add_predefined(&self, uris: &[&str]) -> Vec<NsId> {
        self.pool
            .borrow_mut()
            .insert_predefined(uris)
            .into_iter()
            .map(NsId::from_index)
            .collect()
    }

    /// Number of identities fixed by [`NamespaceRegistry::add_predefined`]
    pub fn predefined_count(&self) -> usize {
        self.pool.borrow().predefined_count()
    }

    /// Create a namespace context backed by this registry
    pub fn create_context(&self) -> NamespaceContext<'_, Self> {
        NamespaceContext::new(self)
    }
}

impl NamespaceStore for NamespaceRegistry {
    fn intern(&self, uri: &[u8]) -> NsId {
        if uri.is_empty() {
            return NsId::UNKNOWN;
        }
        let (index, added) = self.pool.borrow_mut().insert(uri);
        if added {
            log_new_uri(index, uri);
        }
        NsId::from_index(index)
    }

    fn uri(&self, id: NsId) -> Option<Arc<[u8]>> {
        let index = id.index()?;
        self.pool.borrow().get(index as u32).cloned()
    }

    fn len(&self) -> usize {
        self.pool.borrow().len()
    }
}

/// Thread-safe registry for parses running in parallel
///
/// Lookups take the read lock; only a URI seen for the first time takes
/// the write lock.
#[derive(Debug, Default)]
pub struct SharedNamespaceRegistry {
    pool: RwLock<UriPool>,
}

impl SharedNamespaceRegistry {
    pub fn new() -> Self {
        SharedNamespaceRegistry {
            pool: RwLock::new(UriPool::new()),
        }
    }

    /// Create a registry whose first identities are `uris`, in order
    pub fn with_predefined(uris: &[&str]) -> Self {
        let registry = Self::new();
        registry.add_predefined(uris);
        registry
    }

    /// Pre-intern a static URI list
    pub fn add_predefined(&self, uris: &[&str]) -> Vec<NsId> {
        self.pool
            .write()
            .insert_predefined(uris)
            .into_iter()
            .map(NsId::from_index)
            .collect()
    }

    pub fn predefined_count(&self) -> usize {
        self.pool.read().predefined_count()
    }

    /// Create a namespace context backed by this registry
    pub fn create_context(&self) -> NamespaceContext<'_, Self> {
        NamespaceContext::new(self)
    }
}

impl NamespaceStore for SharedNamespaceRegistry {
    fn intern(&self, uri: &[u8]) -> NsId {
        if uri.is_empty() {
            return NsId::UNKNOWN;
        }
        if let Some(index) = self.pool.read().find(uri) {
            return NsId::from_index(index);
        }

        // Another thread may have inserted it between the two locks.
        let (index, added) = self.pool.write().insert(uri);
        if added {
            log_new_uri(index, uri);
        }
        NsId::from_index(index)
    }

    fn uri(&self, id: NsId) -> Option<Arc<[u8]>> {
        let index = id.index()?;
        self.pool.read().get(index as u32).cloned()
    }

    fn len(&self) -> usize {
        self.pool.read().len()
    }
}
