//! sheetsax - Layered streaming XML parsing for document ingestion
//!
//! Layers, each wrapping the one below:
//! 1. Core: [`SaxParser`] drives a [`SaxHandler`] with raw prefixes, names
//!    and values. Text and attribute values borrow the input unless they
//!    contain escapes.
//! 2. Namespaces: [`NsParser`] resolves prefixes to [`NsId`]s, scopes
//!    `xmlns` bindings to their element, rejects duplicate attributes and
//!    checks close tags against the element they close.
//! 3. Tokens: [`TokenParser`] maps namespaces and names to [`Token`]s and
//!    batches each element's attributes into one `start_element` call.
//!
//! ```
//! use sheetsax::{parse_ns_events, NamespaceRegistry, ParserConfig};
//!
//! let registry = NamespaceRegistry::new();
//! let mut context = registry.create_context();
//! let events = parse_ns_events(
//!     b"<a xmlns=\"urn:x\"><b>text</b></a>",
//!     ParserConfig::default(),
//!     &mut context,
//! )
//! .unwrap();
//! assert_eq!(events[1].to_string(), "start_element({ns0}b)");
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod ns;
pub mod parallel;
pub mod sax;
pub mod token;

pub use config::ParserConfig;
pub use crate::core::{Attribute, Doctype, DoctypeKeyword, Element, SaxHandler, SaxParser, Span};
pub use error::{Error, Result};
pub use ns::{
    NamespaceContext, NamespaceRegistry, NamespaceStore, NsAttribute, NsElement, NsHandler,
    NsId, NsParser, SharedNamespaceRegistry,
};
pub use parallel::parse_parts;
pub use sax::{parse_events, parse_ns_events, parse_token_events, Event};
pub use token::{Token, TokenAttribute, TokenElement, TokenHandler, TokenParser, TokenTable};
