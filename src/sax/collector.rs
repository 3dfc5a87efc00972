//! SAX Collectors
//!
//! Handlers for each parser layer that record owned [`Event`]s in document
//! order.

use super::events::{Event, Name};
use crate::config::ParserConfig;
use crate::core::parser::{Attribute, Element, SaxHandler, SaxParser};
use crate::core::span::Span;
use crate::error::Result;
use crate::ns::context::NamespaceContext;
use crate::ns::parser::{NsAttribute, NsElement, NsHandler, NsParser};
use crate::ns::registry::NamespaceStore;
use crate::token::parser::{TokenElement, TokenHandler, TokenParser};
use crate::token::table::TokenTable;

macro_rules! collector_common {
    ($collector:ident) => {
        impl $collector {
            /// Create a new collector
            pub fn new() -> Self {
                Self {
                    events: Vec::with_capacity(256),
                }
            }

            /// Create with estimated capacity
            pub fn with_capacity(events: usize) -> Self {
                Self {
                    events: Vec::with_capacity(events),
                }
            }

            /// Get the collected events as a slice
            pub fn events(&self) -> &[Event] {
                &self.events
            }

            /// Take the collected events
            pub fn take_events(&mut self) -> Vec<Event> {
                std::mem::take(&mut self.events)
            }

            pub fn into_events(self) -> Vec<Event> {
                self.events
            }

            /// Get number of collected events
            pub fn event_count(&self) -> usize {
                self.events.len()
            }
        }

        impl Default for $collector {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

fn characters(text: Span<'_, '_>) -> Event {
    Event::Characters {
        text: text.to_vec(),
        transient: text.is_transient(),
    }
}

/// Collector for the core layer
///
/// Declaration attributes are recorded as plain [`Event::Attribute`]s,
/// which is how the core layer reports them.
pub struct SaxCollector {
    events: Vec<Event>,
}

collector_common!(SaxCollector);

impl<'a> SaxHandler<'a> for SaxCollector {
    fn start_declaration(&mut self, name: &'a [u8]) -> Result<()> {
        self.events.push(Event::StartDeclaration(name.to_vec()));
        Ok(())
    }

    fn end_declaration(&mut self, name: &'a [u8]) -> Result<()> {
        self.events.push(Event::EndDeclaration(name.to_vec()));
        Ok(())
    }

    fn start_element(&mut self, elem: &Element<'a>) -> Result<()> {
        self.events
            .push(Event::StartElement(Name::raw(elem.prefix, elem.name)));
        Ok(())
    }

    fn end_element(&mut self, elem: &Element<'a>) -> Result<()> {
        self.events
            .push(Event::EndElement(Name::raw(elem.prefix, elem.name)));
        Ok(())
    }

    fn characters(&mut self, text: Span<'a, '_>) -> Result<()> {
        self.events.push(characters(text));
        Ok(())
    }

    fn attribute(&mut self, attr: &Attribute<'a, '_>) -> Result<()> {
        self.events.push(Event::Attribute {
            name: Name::raw(attr.prefix, attr.name),
            value: attr.value.to_vec(),
            transient: attr.is_transient(),
        });
        Ok(())
    }
}

/// Collector for the namespace layer
pub struct NsCollector {
    events: Vec<Event>,
}

collector_common!(NsCollector);

impl<'a> NsHandler<'a> for NsCollector {
    fn start_declaration(&mut self, name: &'a [u8]) -> Result<()> {
        self.events.push(Event::StartDeclaration(name.to_vec()));
        Ok(())
    }

    fn end_declaration(&mut self, name: &'a [u8]) -> Result<()> {
        self.events.push(Event::EndDeclaration(name.to_vec()));
        Ok(())
    }

    fn declaration_attribute(&mut self, attr: &Attribute<'a, '_>) -> Result<()> {
        self.events.push(Event::DeclarationAttribute {
            name: attr.name.to_vec(),
            value: attr.value.to_vec(),
        });
        Ok(())
    }

    fn start_element(&mut self, elem: &NsElement<'a>) -> Result<()> {
        self.events.push(Event::StartElement(Name::resolved(
            elem.ns,
            elem.prefix,
            elem.name,
        )));
        Ok(())
    }

    fn end_element(&mut self, elem: &NsElement<'a>) -> Result<()> {
        self.events.push(Event::EndElement(Name::resolved(
            elem.ns,
            elem.prefix,
            elem.name,
        )));
        Ok(())
    }

    fn characters(&mut self, text: Span<'a, '_>) -> Result<()> {
        self.events.push(characters(text));
        Ok(())
    }

    fn attribute(&mut self, attr: &NsAttribute<'a, '_>) -> Result<()> {
        self.events.push(Event::Attribute {
            name: Name::resolved(attr.ns, attr.prefix, attr.name),
            value: attr.value.to_vec(),
            transient: attr.value.is_transient(),
        });
        Ok(())
    }
}

/// Collector for the token layer
///
/// A batched start element is recorded as its [`Event::StartElement`]
/// followed by one [`Event::Attribute`] per attribute, in source order.
pub struct TokenCollector {
    events: Vec<Event>,
}

collector_common!(TokenCollector);

fn token_name(elem: &TokenElement<'_, '_>) -> Name {
    Name::tokenized(elem.ns, elem.ns_token, elem.name, elem.raw_name)
}

impl<'a> TokenHandler<'a> for TokenCollector {
    fn start_element(&mut self, elem: &TokenElement<'a, '_>) -> Result<()> {
        self.events.push(Event::StartElement(token_name(elem)));
        for attr in elem.attrs {
            self.events.push(Event::Attribute {
                name: Name::tokenized(attr.ns, attr.ns_token, attr.name, attr.raw_name),
                value: attr.value.to_vec(),
                transient: attr.is_transient(),
            });
        }
        Ok(())
    }

    fn end_element(&mut self, elem: &TokenElement<'a, '_>) -> Result<()> {
        self.events.push(Event::EndElement(token_name(elem)));
        Ok(())
    }

    fn characters(&mut self, text: Span<'a, '_>) -> Result<()> {
        self.events.push(characters(text));
        Ok(())
    }
}

/// Parse input with the core layer and return its events
pub fn parse_events(input: &[u8], config: ParserConfig) -> Result<Vec<Event>> {
    let mut collector = SaxCollector::new();
    SaxParser::with_config(input, config).parse(&mut collector)?;
    Ok(collector.into_events())
}

/// Parse input with the namespace layer and return its events
pub fn parse_ns_events<S: NamespaceStore + ?Sized>(
    input: &[u8],
    config: ParserConfig,
    context: &mut NamespaceContext<'_, S>,
) -> Result<Vec<Event>> {
    let mut collector = NsCollector::new();
    NsParser::new(input, config, context).parse(&mut collector)?;
    Ok(collector.into_events())
}

/// Parse input with the token layer and return its events
pub fn parse_token_events<S: NamespaceStore + ?Sized>(
    input: &[u8],
    config: ParserConfig,
    tokens: &TokenTable,
    ns_tokens: &TokenTable,
    context: &mut NamespaceContext<'_, S>,
) -> Result<Vec<Event>> {
    let mut collector = TokenCollector::new();
    TokenParser::new(input, config, tokens, ns_tokens, context).parse(&mut collector)?;
    Ok(collector.into_events())
}
