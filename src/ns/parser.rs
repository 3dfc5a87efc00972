//! Namespace-resolving parser layer
//!
//! [`NamespaceResolver`] sits between the core parser and an [`NsHandler`].
//! It consumes `xmlns` and `xmlns:*` attributes, resolves element and
//! attribute prefixes to [`NsId`]s, rejects duplicate attributes and checks
//! every close tag against the element it closes.
//!
//! Bindings are scoped to the element that declared them. Each open
//! element keeps a frame with the range of keys it pushed, and exactly
//! those keys are popped when it closes.

use log::trace;

use super::context::NamespaceContext;
use super::registry::{NamespaceStore, NsId};
use crate::config::ParserConfig;
use crate::core::parser::{Attribute, Doctype, Element, SaxHandler, SaxParser};
use crate::core::span::Span;
use crate::error::{Error, Result};

/// Element with its prefix resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NsElement<'a> {
    pub ns: NsId,
    pub prefix: &'a [u8],
    pub name: &'a [u8],
    /// Offset of the opening '<'
    pub begin: usize,
    /// Offset just past the closing '>'
    pub end: usize,
}

/// Attribute with its prefix resolved
#[derive(Debug, Clone, Copy)]
pub struct NsAttribute<'a, 's> {
    pub ns: NsId,
    pub prefix: &'a [u8],
    pub name: &'a [u8],
    pub value: Span<'a, 's>,
}

/// Trait for handling namespace-qualified parse events
pub trait NsHandler<'a> {
    /// Called for `<!DOCTYPE ...>` (optional)
    fn doctype(&mut self, _doctype: &Doctype<'a>) -> Result<()> {
        Ok(())
    }

    fn start_declaration(&mut self, _name: &'a [u8]) -> Result<()> {
        Ok(())
    }

    fn end_declaration(&mut self, _name: &'a [u8]) -> Result<()> {
        Ok(())
    }

    /// Attribute of a declaration, forwarded without namespace resolution
    fn declaration_attribute(&mut self, _attr: &Attribute<'a, '_>) -> Result<()> {
        Ok(())
    }

    fn start_element(&mut self, elem: &NsElement<'a>) -> Result<()>;

    fn end_element(&mut self, elem: &NsElement<'a>) -> Result<()>;

    fn characters(&mut self, text: Span<'a, '_>) -> Result<()>;

    /// Called for each non-`xmlns` attribute, before the owning element's
    /// `start_element`
    fn attribute(&mut self, attr: &NsAttribute<'a, '_>) -> Result<()>;
}

impl<'a, H: NsHandler<'a> + ?Sized> NsHandler<'a> for &mut H {
    fn doctype(&mut self, doctype: &Doctype<'a>) -> Result<()> {
        (**self).doctype(doctype)
    }

    fn start_declaration(&mut self, name: &'a [u8]) -> Result<()> {
        (**self).start_declaration(name)
    }

    fn end_declaration(&mut self, name: &'a [u8]) -> Result<()> {
        (**self).end_declaration(name)
    }

    fn declaration_attribute(&mut self, attr: &Attribute<'a, '_>) -> Result<()> {
        (**self).declaration_attribute(attr)
    }

    fn start_element(&mut self, elem: &NsElement<'a>) -> Result<()> {
        (**self).start_element(elem)
    }

    fn end_element(&mut self, elem: &NsElement<'a>) -> Result<()> {
        (**self).end_element(elem)
    }

    fn characters(&mut self, text: Span<'a, '_>) -> Result<()> {
        (**self).characters(text)
    }

    fn attribute(&mut self, attr: &NsAttribute<'a, '_>) -> Result<()> {
        (**self).attribute(attr)
    }
}

/// One open element
#[derive(Debug, Clone, Copy)]
struct Frame<'a> {
    ns: NsId,
    name: &'a [u8],
    /// Start of this element's keys in `NamespaceResolver::keys`
    keys_from: usize,
}

/// Core-layer handler that resolves namespaces and forwards to an [`NsHandler`]
pub struct NamespaceResolver<'a, 'c, 'r, S: NamespaceStore + ?Sized, H: ?Sized> {
    context: &'c mut NamespaceContext<'r, S>,
    handler: &'c mut H,
    frames: Vec<Frame<'a>>,
    /// Keys pushed by open elements, then by the element being opened
    keys: Vec<&'a [u8]>,
    /// Start of the keys of the element being opened
    pending_from: usize,
    /// (namespace, local name) of attributes seen on the element being opened
    seen: Vec<(NsId, &'a [u8])>,
    in_declaration: bool,
}

impl<'a, 'c, 'r, S, H> NamespaceResolver<'a, 'c, 'r, S, H>
where
    S: NamespaceStore + ?Sized,
    H: NsHandler<'a> + ?Sized,
{
    pub fn new(context: &'c mut NamespaceContext<'r, S>, handler: &'c mut H) -> Self {
        NamespaceResolver {
            context,
            handler,
            frames: Vec::with_capacity(16),
            keys: Vec::new(),
            pending_from: 0,
            seen: Vec::with_capacity(8),
            in_declaration: false,
        }
    }

    /// Number of currently open elements
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Pop every binding still held, innermost first.
    ///
    /// Leaves the context as it was before the parse when a parse is
    /// aborted with elements open.
    pub fn unwind(&mut self) {
        while let Some(key) = self.keys.pop() {
            self.context.pop(key);
        }
        self.frames.clear();
        self.seen.clear();
        self.pending_from = 0;
        self.in_declaration = false;
    }

    fn resolve(&self, elem: &Element<'a>) -> NsElement<'a> {
        NsElement {
            ns: self.context.get(elem.prefix),
            prefix: elem.prefix,
            name: elem.name,
            begin: elem.begin,
            end: elem.end,
        }
    }
}

impl<'a, S, H> SaxHandler<'a> for NamespaceResolver<'a, '_, '_, S, H>
where
    S: NamespaceStore + ?Sized,
    H: NsHandler<'a> + ?Sized,
{
    fn doctype(&mut self, doctype: &Doctype<'a>) -> Result<()> {
        self.handler.doctype(doctype)
    }

    fn start_declaration(&mut self, name: &'a [u8]) -> Result<()> {
        self.in_declaration = true;
        self.handler.start_declaration(name)
    }

    fn end_declaration(&mut self, name: &'a [u8]) -> Result<()> {
        self.in_declaration = false;
        self.handler.end_declaration(name)
    }

    fn start_element(&mut self, elem: &Element<'a>) -> Result<()> {
        // All xmlns attributes of this element have been pushed already.
        let resolved = self.resolve(elem);
        self.frames.push(Frame {
            ns: resolved.ns,
            name: resolved.name,
            keys_from: self.pending_from,
        });
        self.pending_from = self.keys.len();
        self.seen.clear();

        trace!(
            "frame push: {}:{} (depth {})",
            self.context.short_name(resolved.ns),
            resolved.name.escape_ascii(),
            self.frames.len()
        );
        self.handler.start_element(&resolved)
    }

    fn end_element(&mut self, elem: &Element<'a>) -> Result<()> {
        let resolved = self.resolve(elem);
        let Some(frame) = self.frames.pop() else {
            return Err(Error::malformed("unexpected closing element.", elem.begin));
        };
        if frame.ns != resolved.ns || frame.name != resolved.name {
            return Err(Error::malformed(
                format!(
                    "mis-matching closing element. expected '{}:{}' but found '{}:{}'.",
                    self.context.short_name(frame.ns),
                    frame.name.escape_ascii(),
                    self.context.short_name(resolved.ns),
                    resolved.name.escape_ascii()
                ),
                elem.begin,
            ));
        }

        // Pop exactly the bindings this element made.
        for key in self.keys.drain(frame.keys_from..).rev() {
            self.context.pop(key);
        }
        self.pending_from = self.keys.len();

        trace!(
            "frame pop: {}:{} (depth {})",
            self.context.short_name(resolved.ns),
            resolved.name.escape_ascii(),
            self.frames.len()
        );
        self.handler.end_element(&resolved)
    }

    fn characters(&mut self, text: Span<'a, '_>) -> Result<()> {
        self.handler.characters(text)
    }

    fn attribute(&mut self, attr: &Attribute<'a, '_>) -> Result<()> {
        if self.in_declaration {
            return self.handler.declaration_attribute(attr);
        }

        if attr.prefix.is_empty() && attr.name == b"xmlns" {
            // Default namespace: xmlns="uri"
            self.context.push(b"", attr.value.as_bytes());
            self.keys.push(attr.prefix);
            return Ok(());
        }
        if attr.prefix == b"xmlns" {
            // Prefixed namespace: xmlns:name="uri"
            self.context.push(attr.name, attr.value.as_bytes());
            self.keys.push(attr.name);
            return Ok(());
        }

        // An empty prefix resolves to the default namespace, as for elements.
        let ns = self.context.get(attr.prefix);
        if self.seen.contains(&(ns, attr.name)) {
            return Err(Error::malformed_unpositioned(format!(
                "duplicate attribute '{}:{}'.",
                self.context.short_name(ns),
                attr.name.escape_ascii()
            )));
        }
        self.seen.push((ns, attr.name));

        self.handler.attribute(&NsAttribute {
            ns,
            prefix: attr.prefix,
            name: attr.name,
            value: attr.value,
        })
    }
}

/// Namespace-resolving parser over one input buffer
pub struct NsParser<'a, 'c, 'r, S: NamespaceStore + ?Sized> {
    parser: SaxParser<'a>,
    context: &'c mut NamespaceContext<'r, S>,
}

impl<'a, 'c, 'r, S: NamespaceStore + ?Sized> NsParser<'a, 'c, 'r, S> {
    pub fn new(
        input: &'a [u8],
        config: ParserConfig,
        context: &'c mut NamespaceContext<'r, S>,
    ) -> Self {
        NsParser {
            parser: SaxParser::with_config(input, config),
            context,
        }
    }

    pub fn context(&self) -> &NamespaceContext<'r, S> {
        self.context
    }

    /// Parse the whole document.
    ///
    /// On error, bindings made by the document are popped again so the
    /// context can be reused.
    pub fn parse<H: NsHandler<'a> + ?Sized>(&mut self, handler: &mut H) -> Result<()> {
        let mut resolver = NamespaceResolver::new(&mut *self.context, handler);
        let result = self.parser.parse(&mut resolver);
        if result.is_err() {
            resolver.unwind();
        }
        result
    }
}
