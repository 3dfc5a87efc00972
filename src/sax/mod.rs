//! SAX event collection
//!
//! Collecting handlers for every parser layer:
//!
//! ```text
//! SaxParser   ---> SaxCollector   ---> Event[]
//! NsParser    ---> NsCollector    ---> Event[]
//! TokenParser ---> TokenCollector ---> Event[]
//! ```
//!
//! ## Event Types
//!
//! - `StartDeclaration` / `EndDeclaration` - `<?name ... ?>`
//! - `DeclarationAttribute` - declaration attribute (namespace layer)
//! - `StartElement` / `EndElement` - element tags, self-closing tags give both
//! - `Attribute` - attribute with its value and transience
//! - `Characters` - text and CDATA content
//!
//! Events own their bytes. Collecting copies every name and value, so the
//! handlers in this module are meant for tests, tooling and small
//! documents; hot paths implement the layer traits directly.

pub mod collector;
pub mod events;

pub use collector::{
    parse_events, parse_ns_events, parse_token_events, NsCollector, SaxCollector, TokenCollector,
};
pub use events::{Event, Name};
