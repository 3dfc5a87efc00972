//! Core XML parsing primitives
//!
//! This module contains the building blocks of the lowest parser layer:
//! - Scanner: byte cursor with memchr-accelerated delimiter search
//! - Scratch: reusable buffer for values that contain escapes
//! - Span: stable or transient view of a value
//! - Entities: escape sequence decoding
//! - Parser: SaxHandler-driven streaming parser

pub mod entities;
pub mod parser;
pub mod scanner;
pub mod scratch;
pub mod span;

pub use parser::{
    parse, Attribute, Doctype, DoctypeKeyword, Element, SaxHandler, SaxParser,
};
pub use scratch::ScratchBuffer;
pub use span::Span;
