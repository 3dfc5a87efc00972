//! Token tables
//!
//! Maps names to small integers for `match`-based dispatch. A table is
//! built once from an application-supplied name list; the position of a
//! name in the list is its token. Position 0 is reserved for
//! [`Token::UNKNOWN`] and never matched.

use std::collections::HashMap;
use std::fmt;

use crate::ns::registry::{NamespaceStore, NsId};

/// Index of a name in a [`TokenTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Token(pub u32);

impl Token {
    /// The name is not in the table.
    pub const UNKNOWN: Token = Token(0);

    #[inline]
    pub fn is_unknown(self) -> bool {
        self == Token::UNKNOWN
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Immutable name -> token lookup
///
/// Built once and shared read-only; safe to keep in a `static`.
#[derive(Debug, Clone)]
pub struct TokenTable {
    names: Vec<Box<str>>,
    lookup: HashMap<Box<[u8]>, Token>,
}

impl TokenTable {
    /// Build a table from an ordered name list. Entry 0 is a placeholder.
    pub fn new(names: &[&str]) -> Self {
        let mut lookup: HashMap<Box<[u8]>, Token> = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate().skip(1) {
            // First occurrence wins.
            lookup
                .entry(Box::from(name.as_bytes()))
                .or_insert(Token(index as u32));
        }

        TokenTable {
            names: names.iter().map(|&name| Box::from(name)).collect(),
            lookup,
        }
    }

    /// Token for a name, [`Token::UNKNOWN`] when absent
    #[inline]
    pub fn token(&self, name: &[u8]) -> Token {
        self.lookup.get(name).copied().unwrap_or(Token::UNKNOWN)
    }

    /// Name of a token, "" when out of range
    pub fn name(&self, token: Token) -> &str {
        self.names.get(token.index()).map_or("", |name| &**name)
    }

    /// Whether the token names an entry of this table
    #[inline]
    pub fn is_valid(&self, token: Token) -> bool {
        !token.is_unknown() && token.index() < self.names.len()
    }

    /// Number of entries, including the placeholder
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate `(token, name)` over the real entries
    pub fn iter(&self) -> impl Iterator<Item = (Token, &str)> + '_ {
        self.names
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, name)| (Token(index as u32), &**name))
    }
}

/// Namespace identity -> token map for one namespace store
///
/// Built from a [`TokenTable`] of namespace URIs by interning every URI
/// into the store, so lookups during a parse are by identity only.
#[derive(Debug, Clone, Default)]
pub struct NsTokenMap {
    tokens: HashMap<NsId, Token>,
}

impl NsTokenMap {
    pub fn new<S: NamespaceStore + ?Sized>(uris: &TokenTable, store: &S) -> Self {
        let mut tokens = HashMap::with_capacity(uris.len());
        for (token, uri) in uris.iter() {
            let id = store.intern(uri.as_bytes());
            if !id.is_unknown() {
                tokens.entry(id).or_insert(token);
            }
        }
        NsTokenMap { tokens }
    }

    /// Token for a namespace, [`Token::UNKNOWN`] when unmapped
    #[inline]
    pub fn token(&self, ns: NsId) -> Token {
        self.tokens.get(&ns).copied().unwrap_or(Token::UNKNOWN)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
