//! Token-dispatch parser layer
//!
//! [`TokenDispatcher`] sits on top of the namespace layer and maps
//! namespaces and local names to [`Token`]s. Attributes are batched: the
//! handler receives them all at once with the element's `start_element`.
//!
//! Transient attribute values are copied into the dispatcher's own buffer
//! as they arrive, since the parser's scratch buffer is reused for the next
//! value. The batch is valid until `start_element` returns.

use std::ops::Range;

use smallvec::SmallVec;

use super::table::{NsTokenMap, Token, TokenTable};
use crate::config::ParserConfig;
use crate::core::scratch::ScratchBuffer;
use crate::core::span::Span;
use crate::error::Result;
use crate::ns::context::NamespaceContext;
use crate::ns::parser::{NsAttribute, NsElement, NsHandler, NsParser};
use crate::ns::registry::{NamespaceStore, NsId};

/// Attribute delivered as part of a [`TokenElement`]
#[derive(Debug, Clone, Copy)]
pub struct TokenAttribute<'a, 's> {
    pub ns: NsId,
    pub ns_token: Token,
    pub name: Token,
    /// Local name as written
    pub raw_name: &'a [u8],
    /// Stable values borrow the input; transient ones the dispatcher's buffer
    pub value: Span<'a, 's>,
}

impl TokenAttribute<'_, '_> {
    #[inline]
    pub fn is_transient(&self) -> bool {
        self.value.is_transient()
    }
}

/// Element start or end with tokenized names
#[derive(Debug, Clone, Copy)]
pub struct TokenElement<'a, 's> {
    pub ns: NsId,
    pub ns_token: Token,
    pub name: Token,
    /// Local name as written
    pub raw_name: &'a [u8],
    pub begin: usize,
    pub end: usize,
    /// Attributes in source order. Always empty for `end_element`.
    pub attrs: &'s [TokenAttribute<'a, 's>],
}

impl<'a, 's> TokenElement<'a, 's> {
    /// First attribute with the given namespace and name tokens
    pub fn attr(&self, ns_token: Token, name: Token) -> Option<&'s TokenAttribute<'a, 's>> {
        self.attrs
            .iter()
            .find(|attr| attr.ns_token == ns_token && attr.name == name)
    }
}

/// Trait for handling tokenized parse events
pub trait TokenHandler<'a> {
    fn start_element(&mut self, elem: &TokenElement<'a, '_>) -> Result<()>;

    fn end_element(&mut self, elem: &TokenElement<'a, '_>) -> Result<()>;

    fn characters(&mut self, text: Span<'a, '_>) -> Result<()>;
}

impl<'a, H: TokenHandler<'a> + ?Sized> TokenHandler<'a> for &mut H {
    fn start_element(&mut self, elem: &TokenElement<'a, '_>) -> Result<()> {
        (**self).start_element(elem)
    }

    fn end_element(&mut self, elem: &TokenElement<'a, '_>) -> Result<()> {
        (**self).end_element(elem)
    }

    fn characters(&mut self, text: Span<'a, '_>) -> Result<()> {
        (**self).characters(text)
    }
}

#[derive(Debug, Clone)]
enum PendingValue<'a> {
    Stable(&'a [u8]),
    /// Range in `TokenDispatcher::values`
    Copied(Range<usize>),
}

#[derive(Debug, Clone)]
struct PendingAttribute<'a> {
    ns: NsId,
    ns_token: Token,
    name: Token,
    raw_name: &'a [u8],
    value: PendingValue<'a>,
}

/// Namespace-layer handler that tokenizes and forwards to a [`TokenHandler`]
pub struct TokenDispatcher<'a, 't, 'h, H: ?Sized> {
    tokens: &'t TokenTable,
    ns_tokens: &'t NsTokenMap,
    handler: &'h mut H,
    pending: SmallVec<[PendingAttribute<'a>; 8]>,
    values: ScratchBuffer,
}

impl<'a, 't, 'h, H: TokenHandler<'a> + ?Sized> TokenDispatcher<'a, 't, 'h, H> {
    pub fn new(tokens: &'t TokenTable, ns_tokens: &'t NsTokenMap, handler: &'h mut H) -> Self {
        TokenDispatcher {
            tokens,
            ns_tokens,
            handler,
            pending: SmallVec::new(),
            values: ScratchBuffer::with_capacity(256),
        }
    }
}

impl<'a, H: TokenHandler<'a> + ?Sized> NsHandler<'a> for TokenDispatcher<'a, '_, '_, H> {
    fn start_element(&mut self, elem: &NsElement<'a>) -> Result<()> {
        // The batch borrows `values`; it must be gone before the reset.
        let result = {
            let values = self.values.get();
            let attrs: SmallVec<[TokenAttribute<'a, '_>; 8]> = self
                .pending
                .iter()
                .map(|pending| TokenAttribute {
                    ns: pending.ns,
                    ns_token: pending.ns_token,
                    name: pending.name,
                    raw_name: pending.raw_name,
                    value: match &pending.value {
                        PendingValue::Stable(bytes) => Span::Stable(*bytes),
                        PendingValue::Copied(range) => Span::Transient(&values[range.clone()]),
                    },
                })
                .collect();

            let token_elem = TokenElement {
                ns: elem.ns,
                ns_token: self.ns_tokens.token(elem.ns),
                name: self.tokens.token(elem.name),
                raw_name: elem.name,
                begin: elem.begin,
                end: elem.end,
                attrs: attrs.as_slice(),
            };
            self.handler.start_element(&token_elem)
        };

        self.pending.clear();
        self.values.reset();
        result
    }

    fn end_element(&mut self, elem: &NsElement<'a>) -> Result<()> {
        self.handler.end_element(&TokenElement {
            ns: elem.ns,
            ns_token: self.ns_tokens.token(elem.ns),
            name: self.tokens.token(elem.name),
            raw_name: elem.name,
            begin: elem.begin,
            end: elem.end,
            attrs: &[],
        })
    }

    fn characters(&mut self, text: Span<'a, '_>) -> Result<()> {
        self.handler.characters(text)
    }

    fn attribute(&mut self, attr: &NsAttribute<'a, '_>) -> Result<()> {
        let value = match attr.value {
            Span::Stable(bytes) => PendingValue::Stable(bytes),
            Span::Transient(bytes) => {
                let start = self.values.size();
                self.values.append(bytes);
                PendingValue::Copied(start..self.values.size())
            }
        };

        self.pending.push(PendingAttribute {
            ns: attr.ns,
            ns_token: self.ns_tokens.token(attr.ns),
            name: self.tokens.token(attr.name),
            raw_name: attr.name,
            value,
        });
        Ok(())
    }
}

/// Token-dispatch parser over one input buffer
pub struct TokenParser<'a, 'c, 'r, 't, S: NamespaceStore + ?Sized> {
    inner: NsParser<'a, 'c, 'r, S>,
    tokens: &'t TokenTable,
    ns_tokens: NsTokenMap,
}

impl<'a, 'c, 'r, 't, S: NamespaceStore + ?Sized> TokenParser<'a, 'c, 'r, 't, S> {
    /// Create a parser. Every URI of `ns_tokens` is interned into the
    /// context's store.
    pub fn new(
        input: &'a [u8],
        config: ParserConfig,
        tokens: &'t TokenTable,
        ns_tokens: &TokenTable,
        context: &'c mut NamespaceContext<'r, S>,
    ) -> Self {
        let ns_tokens = NsTokenMap::new(ns_tokens, context.store());
        TokenParser {
            inner: NsParser::new(input, config, context),
            tokens,
            ns_tokens,
        }
    }

    pub fn ns_tokens(&self) -> &NsTokenMap {
        &self.ns_tokens
    }

    /// Parse the whole document
    pub fn parse<H: TokenHandler<'a> + ?Sized>(&mut self, handler: &mut H) -> Result<()> {
        let mut dispatcher = TokenDispatcher::new(self.tokens, &self.ns_tokens, handler);
        self.inner.parse(&mut dispatcher)
    }
}
