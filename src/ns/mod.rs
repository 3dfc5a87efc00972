//! Namespace resolution
//!
//! - Pool: deduplicating URI storage
//! - Registry: URI -> [`NsId`] interning, single-threaded or shared
//! - Context: per-parse prefix bindings
//! - Parser: the namespace-resolving layer over the core parser

pub mod context;
pub mod parser;
pub mod pool;
pub mod registry;

pub use context::NamespaceContext;
pub use parser::{NamespaceResolver, NsAttribute, NsElement, NsHandler, NsParser};
pub use registry::{NamespaceRegistry, NamespaceStore, NsId, SharedNamespaceRegistry};
