//! Token dispatch
//!
//! - Table: name -> [`Token`] lookup built from a static name list
//! - Parser: the token-dispatch layer over the namespace layer

pub mod parser;
pub mod table;

pub use parser::{TokenAttribute, TokenDispatcher, TokenElement, TokenHandler, TokenParser};
pub use table::{NsTokenMap, Token, TokenTable};
