//! SAX Event Types
//!
//! Owned copies of the events emitted by each parser layer. Unlike the
//! borrowed callback arguments they remain valid after the parse, which
//! makes them suitable for assertions and for handing to code that runs
//! later.

use std::fmt;

use crate::ns::registry::NsId;
use crate::token::table::Token;

/// Element or attribute name as seen by one layer
///
/// - core layer: `prefix` and `local` only
/// - namespace layer: `ns` is resolved
/// - token layer: `ns_token` and `token` are set and `prefix` is empty
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Name {
    pub ns: Option<NsId>,
    pub ns_token: Option<Token>,
    pub token: Option<Token>,
    pub prefix: Vec<u8>,
    pub local: Vec<u8>,
}

impl Name {
    /// Unresolved name as written in the document
    pub fn raw(prefix: &[u8], local: &[u8]) -> Self {
        Name {
            prefix: prefix.to_vec(),
            local: local.to_vec(),
            ..Default::default()
        }
    }

    /// Name with its namespace resolved
    pub fn resolved(ns: NsId, prefix: &[u8], local: &[u8]) -> Self {
        Name {
            ns: Some(ns),
            ..Name::raw(prefix, local)
        }
    }

    /// Tokenized name
    pub fn tokenized(ns: NsId, ns_token: Token, token: Token, local: &[u8]) -> Self {
        Name {
            ns: Some(ns),
            ns_token: Some(ns_token),
            token: Some(token),
            prefix: Vec::new(),
            local: local.to_vec(),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = self.ns {
            write!(f, "{{{}}}", ns)?;
        }
        if !self.prefix.is_empty() {
            write!(f, "{}:", String::from_utf8_lossy(&self.prefix))?;
        }
        f.write_str(&String::from_utf8_lossy(&self.local))?;
        if let (Some(ns_token), Some(token)) = (self.ns_token, self.token) {
            write!(f, "[{}{}]", ns_token, token)?;
        }
        Ok(())
    }
}

/// A SAX parsing event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `<?name`
    StartDeclaration(Vec<u8>),

    /// `?>` of the declaration with this name
    EndDeclaration(Vec<u8>),

    /// Attribute of a declaration, as reported by the namespace layer
    DeclarationAttribute { name: Vec<u8>, value: Vec<u8> },

    StartElement(Name),

    EndElement(Name),

    Attribute {
        name: Name,
        value: Vec<u8>,
        /// The value arrived in a scratch buffer rather than the input
        transient: bool,
    },

    /// Character data or CDATA content
    Characters {
        text: Vec<u8>,
        transient: bool,
    },
}

impl Event {
    /// Check if this is a start element event
    #[inline]
    pub fn is_start_element(&self) -> bool {
        matches!(self, Event::StartElement(_))
    }

    /// Check if this is an end element event
    #[inline]
    pub fn is_end_element(&self) -> bool {
        matches!(self, Event::EndElement(_))
    }

    #[inline]
    pub fn is_characters(&self) -> bool {
        matches!(self, Event::Characters { .. })
    }

    /// Get the element name if this is a start or end element
    pub fn element_name(&self) -> Option<&Name> {
        match self {
            Event::StartElement(name) | Event::EndElement(name) => Some(name),
            _ => None,
        }
    }

    /// Whether the event's value arrived transient
    pub fn is_transient(&self) -> bool {
        match self {
            Event::Attribute { transient, .. } | Event::Characters { transient, .. } => *transient,
            _ => false,
        }
    }
}

fn lossy(bytes: &[u8]) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Compact one-line form, e.g. `attribute(x,"1")`
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::StartDeclaration(name) => write!(f, "start_declaration({})", lossy(name)),
            Event::EndDeclaration(name) => write!(f, "end_declaration({})", lossy(name)),
            Event::DeclarationAttribute { name, value } => {
                write!(f, "declaration_attribute({},\"{}\")", lossy(name), lossy(value))
            }
            Event::StartElement(name) => write!(f, "start_element({})", name),
            Event::EndElement(name) => write!(f, "end_element({})", name),
            Event::Attribute { name, value, .. } => {
                write!(f, "attribute({},\"{}\")", name, lossy(value))
            }
            Event::Characters { text, .. } => write!(f, "characters(\"{}\")", lossy(text)),
        }
    }
}
