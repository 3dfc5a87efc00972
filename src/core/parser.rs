//! Streaming SAX parser with SaxHandler trait
//!
//! Walks a single in-memory buffer and drives a handler through the
//! structural grammar: declarations, elements, attributes, comments, CDATA,
//! DOCTYPE and character data. Element close tags are matched by nesting
//! depth only; name matching is left to the namespace layer.
//!
//! Parsing stops as soon as the root element closes. Bytes after it are
//! never looked at.

use log::trace;

use super::entities::decode_into;
use super::scanner::{is_alpha, Scanner};
use super::scratch::ScratchBuffer;
use super::span::Span;
use crate::config::ParserConfig;
use crate::error::Result;

const UTF8_BOM: &[u8] = &[0xef, 0xbb, 0xbf];

/// An element start or end tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    /// Namespace prefix, empty when the name is unqualified
    pub prefix: &'a [u8],
    /// Local name
    pub name: &'a [u8],
    /// Offset of the opening '<'
    pub begin: usize,
    /// Offset just past the closing '>'
    pub end: usize,
}

/// An attribute of an element or a declaration.
#[derive(Debug, Clone, Copy)]
pub struct Attribute<'a, 's> {
    /// Namespace prefix, empty when the name is unqualified
    pub prefix: &'a [u8],
    pub name: &'a [u8],
    /// Value with escapes decoded
    pub value: Span<'a, 's>,
}

impl Attribute<'_, '_> {
    /// Whether the value lives in the scratch buffer.
    #[inline]
    pub fn is_transient(&self) -> bool {
        self.value.is_transient()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoctypeKeyword {
    Public,
    System,
}

/// A `<!DOCTYPE ...>` declaration. Parsed only far enough to skip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Doctype<'a> {
    pub keyword: DoctypeKeyword,
    pub root_element: &'a [u8],
    /// Formal public identifier
    pub fpi: &'a [u8],
    pub uri: Option<&'a [u8]>,
}

/// Trait for handling parse events
///
/// Implement this trait to receive XML parsing events. Names always borrow
/// the input; text and attribute values are [`Span`]s that may point into
/// the parser's scratch buffer. Returning an error aborts the parse.
pub trait SaxHandler<'a> {
    /// Called for `<!DOCTYPE ...>` (optional, default does nothing)
    fn doctype(&mut self, _doctype: &Doctype<'a>) -> Result<()> {
        Ok(())
    }

    /// Called when a `<?name ...?>` declaration starts
    fn start_declaration(&mut self, _name: &'a [u8]) -> Result<()> {
        Ok(())
    }

    /// Called after the last attribute of a declaration
    fn end_declaration(&mut self, _name: &'a [u8]) -> Result<()> {
        Ok(())
    }

    /// Called when an element starts, after all of its attributes
    fn start_element(&mut self, elem: &Element<'a>) -> Result<()>;

    /// Called when an element ends. Self-closing elements get this
    /// immediately after `start_element`.
    fn end_element(&mut self, elem: &Element<'a>) -> Result<()>;

    /// Called for character data and CDATA sections inside the root element
    fn characters(&mut self, text: Span<'a, '_>) -> Result<()>;

    /// Called for each attribute in source order, before the owning
    /// element's `start_element` (or between the declaration's start and end)
    fn attribute(&mut self, attr: &Attribute<'a, '_>) -> Result<()>;
}

impl<'a, H: SaxHandler<'a> + ?Sized> SaxHandler<'a> for &mut H {
    fn doctype(&mut self, doctype: &Doctype<'a>) -> Result<()> {
        (**self).doctype(doctype)
    }

    fn start_declaration(&mut self, name: &'a [u8]) -> Result<()> {
        (**self).start_declaration(name)
    }

    fn end_declaration(&mut self, name: &'a [u8]) -> Result<()> {
        (**self).end_declaration(name)
    }

    fn start_element(&mut self, elem: &Element<'a>) -> Result<()> {
        (**self).start_element(elem)
    }

    fn end_element(&mut self, elem: &Element<'a>) -> Result<()> {
        (**self).end_element(elem)
    }

    fn characters(&mut self, text: Span<'a, '_>) -> Result<()> {
        (**self).characters(text)
    }

    fn attribute(&mut self, attr: &Attribute<'a, '_>) -> Result<()> {
        (**self).attribute(attr)
    }
}

/// Streaming parser over one input buffer
pub struct SaxParser<'a> {
    input: &'a [u8],
    scanner: Scanner<'a>,
    config: ParserConfig,
    /// Reused for every value that contains escapes
    scratch: ScratchBuffer,
    root_elem_open: bool,
}

impl<'a> SaxParser<'a> {
    /// Create a lenient parser for the input
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, ParserConfig::default())
    }

    pub fn with_config(input: &'a [u8], config: ParserConfig) -> Self {
        Self {
            input,
            scanner: Scanner::new(input),
            config,
            scratch: ScratchBuffer::with_capacity(64),
            root_elem_open: true,
        }
    }

    /// Offset reached by the last parse
    pub fn position(&self) -> usize {
        self.scanner.position()
    }

    /// Parse the whole document, calling handler methods for each token
    pub fn parse<H: SaxHandler<'a> + ?Sized>(&mut self, handler: &mut H) -> Result<()> {
        self.scanner = Scanner::new(self.input);
        self.root_elem_open = true;
        self.scratch.reset();

        self.header(handler)?;
        self.scanner.skip_blank();
        self.body(handler)?;

        if self.scanner.depth() > 0 {
            return Err(self.scanner.error(format!(
                "xml stream ended prematurely with {} element(s) still open.",
                self.scanner.depth()
            )));
        }
        Ok(())
    }

    /// Skip the UTF-8 byte order mark and, when configured, require the
    /// `<?xml ...?>` declaration.
    fn header<H: SaxHandler<'a> + ?Sized>(&mut self, handler: &mut H) -> Result<()> {
        self.skip_bom()?;
        self.scanner.skip_blank();
        if self.scanner.peek() != Some(b'<') {
            return Err(self.scanner.error("xml file must begin with '<'."));
        }

        if self.config.strict_declaration {
            if self.scanner.next_checked()? != b'?' {
                return Err(self.scanner.error("xml file must begin with '<?'."));
            }
            self.declaration(Some(b"xml"), handler)?;
        }
        Ok(())
    }

    /// Only 8-bit encodings are scanned, so the UTF-8 BOM is the only one accepted.
    fn skip_bom(&mut self) -> Result<()> {
        if self.scanner.remains() < 4 {
            return Ok(());
        }
        if self.scanner.peek() == Some(b'<') {
            return Ok(());
        }
        if self.scanner.starts_with(UTF8_BOM) && self.scanner.peek_at(3) == Some(b'<') {
            self.scanner.advance(UTF8_BOM.len());
            return Ok(());
        }
        Err(self
            .scanner
            .error("unsupported encoding. only 8 bit encodings are supported"))
    }

    fn body<H: SaxHandler<'a> + ?Sized>(&mut self, handler: &mut H) -> Result<()> {
        while let Some(c) = self.scanner.peek() {
            if c == b'<' {
                self.element(handler)?;
                if !self.root_elem_open {
                    // Root element closed. Stop parsing.
                    return Ok(());
                }
            } else if self.scanner.depth() > 0 {
                self.characters(handler)?;
            } else {
                // Content outside the root element is skipped.
                let next = self.scanner.find_byte(b'<').unwrap_or(self.input.len());
                self.scanner.set_position(next);
            }
        }
        Ok(())
    }

    fn element<H: SaxHandler<'a> + ?Sized>(&mut self, handler: &mut H) -> Result<()> {
        let begin = self.scanner.position();
        match self.scanner.next_checked()? {
            b'/' => self.element_close(begin, handler),
            b'!' => self.special_tag(handler),
            b'?' => self.declaration(None, handler),
            c if is_alpha(c) => self.element_open(begin, handler),
            _ => Err(self.scanner.error("expected an alphabet.")),
        }
    }

    fn element_open<H: SaxHandler<'a> + ?Sized>(
        &mut self,
        begin: usize,
        handler: &mut H,
    ) -> Result<()> {
        let (prefix, name) = self.scanner.read_qname()?;

        loop {
            self.scanner.skip_blank();
            match self.scanner.cur_checked()? {
                b'/' => {
                    // Self-closing element: <element/>
                    if self.scanner.next_checked()? != b'>' {
                        return Err(self
                            .scanner
                            .error("expected '/>' to self-close the element."));
                    }
                    self.scanner.advance(1);
                    let elem = Element {
                        prefix,
                        name,
                        begin,
                        end: self.scanner.position(),
                    };
                    trace!(
                        "element_open: ns='{}', name='{}' (self-closing)",
                        prefix.escape_ascii(),
                        name.escape_ascii()
                    );
                    handler.start_element(&elem)?;
                    handler.end_element(&elem)?;
                    if self.scanner.depth() == 0 {
                        self.root_elem_open = false;
                    }
                    return Ok(());
                }
                b'>' => {
                    // End of opening element: <element>
                    self.scanner.advance(1);
                    let elem = Element {
                        prefix,
                        name,
                        begin,
                        end: self.scanner.position(),
                    };
                    self.scanner.nest_up();
                    trace!(
                        "element_open: ns='{}', name='{}'",
                        prefix.escape_ascii(),
                        name.escape_ascii()
                    );
                    return handler.start_element(&elem);
                }
                _ => self.attribute(handler)?,
            }
        }
    }

    fn element_close<H: SaxHandler<'a> + ?Sized>(
        &mut self,
        begin: usize,
        handler: &mut H,
    ) -> Result<()> {
        self.scanner.nest_down()?;
        self.scanner.next_check()?;
        let (prefix, name) = self.scanner.read_qname()?;
        self.scanner.skip_blank();
        if self.scanner.cur_checked()? != b'>' {
            return Err(self.scanner.error("expected '>' to close the element."));
        }
        self.scanner.advance(1);

        let elem = Element {
            prefix,
            name,
            begin,
            end: self.scanner.position(),
        };
        trace!(
            "element_close: ns='{}', name='{}'",
            prefix.escape_ascii(),
            name.escape_ascii()
        );
        handler.end_element(&elem)?;

        if self.scanner.depth() == 0 {
            self.root_elem_open = false;
        }
        Ok(())
    }

    /// `<!--`, `<![CDATA[` or `<!DOCTYPE`. The cursor is on the '!'.
    fn special_tag<H: SaxHandler<'a> + ?Sized>(&mut self, handler: &mut H) -> Result<()> {
        if self.scanner.remains() < 2 {
            return Err(self.scanner.error("special tag too short."));
        }

        match self.scanner.next_checked()? {
            b'-' => {
                if self.scanner.next_checked()? != b'-' {
                    return Err(self.scanner.error("comment expected."));
                }
                self.scanner.advance(1);
                if self.scanner.remains() < 3 {
                    return Err(self.scanner.error("malformed comment."));
                }
                self.comment()
            }
            b'[' => {
                self.scanner.expects_next("CDATA[")?;
                self.cdata(handler)
            }
            b'D' => {
                self.scanner.expects_next("OCTYPE")?;
                self.scanner.skip_blank();
                self.doctype(handler)
            }
            _ => Err(self.scanner.error("failed to parse special tag.")),
        }
    }

    /// Skip a comment body. The cursor is on the first byte after `<!--`.
    fn comment(&mut self) -> Result<()> {
        let Some(dashes) = self.scanner.find_seq(b"--") else {
            self.scanner.set_position(self.input.len());
            return Err(self
                .scanner
                .error("malformed comment: closing '-->' was not found."));
        };

        self.scanner.set_position(dashes + 2);
        if self.scanner.peek() != Some(b'>') {
            return Err(self
                .scanner
                .error("'--' should not occur in comment other than in the closing tag."));
        }
        self.scanner.advance(1);
        Ok(())
    }

    /// Emit a CDATA body verbatim. The cursor is on the first byte after `<![CDATA[`.
    fn cdata<H: SaxHandler<'a> + ?Sized>(&mut self, handler: &mut H) -> Result<()> {
        let start = self.scanner.position();
        let Some(end) = self.scanner.find_seq(b"]]>") else {
            return Err(self.scanner.error("malformed CDATA section."));
        };

        self.scanner.set_position(end + 3);
        if self.scanner.depth() == 0 {
            // Outside the root element, like plain text.
            return Ok(());
        }
        handler.characters(Span::Stable(self.scanner.slice(start, end)))
    }

    fn doctype<H: SaxHandler<'a> + ?Sized>(&mut self, handler: &mut H) -> Result<()> {
        const TOO_SHORT: &str = "DOCTYPE section too short.";

        let root_element = self.scanner.read_name()?;
        self.scanner.skip_blank();

        if self.scanner.remains() < 6 {
            return Err(self.scanner.error(TOO_SHORT));
        }
        let keyword = if self.scanner.starts_with(b"PUBLIC") {
            DoctypeKeyword::Public
        } else if self.scanner.starts_with(b"SYSTEM") {
            DoctypeKeyword::System
        } else {
            return Err(self.scanner.error("malformed DOCTYPE section."));
        };
        self.scanner.advance(6);
        self.scanner.require_char(TOO_SHORT)?;
        self.scanner.skip_blank();
        self.scanner.require_char(TOO_SHORT)?;

        let fpi = self.literal()?;

        self.scanner.require_char(TOO_SHORT)?;
        self.scanner.skip_blank();
        self.scanner.require_char(TOO_SHORT)?;

        let uri = if self.scanner.peek() == Some(b'>') {
            None
        } else {
            let uri = self.literal()?;
            self.scanner.require_char(TOO_SHORT)?;
            self.scanner.skip_blank();
            self.scanner.require_char(TOO_SHORT)?;
            if self.scanner.peek() != Some(b'>') {
                return Err(self.scanner.error(
                    "malformed DOCTYPE section - closing '>' expected but not found.",
                ));
            }
            Some(uri)
        };

        let doctype = Doctype {
            keyword,
            root_element,
            fpi,
            uri,
        };
        trace!(
            "doctype: root='{}', fpi='{}'",
            root_element.escape_ascii(),
            fpi.escape_ascii()
        );
        self.scanner.advance(1);
        handler.doctype(&doctype)
    }

    /// `<?name attr="value"* ?>`. The cursor is on the '?'.
    fn declaration<H: SaxHandler<'a> + ?Sized>(
        &mut self,
        name_check: Option<&'static [u8]>,
        handler: &mut H,
    ) -> Result<()> {
        self.scanner.next_check()?;

        let name = self.scanner.read_name()?;
        if let Some(expected) = name_check {
            if name != expected {
                return Err(self.scanner.error(format!(
                    "declaration name of '{}' was expected, but '{}' was found instead.",
                    expected.escape_ascii(),
                    name.escape_ascii()
                )));
            }
        }
        trace!("declaration: start name='{}'", name.escape_ascii());

        handler.start_declaration(name)?;
        self.scanner.skip_blank();

        while self.scanner.cur_checked()? != b'?' {
            self.attribute(handler)?;
            self.scanner.skip_blank();
        }
        if self.scanner.next_checked()? != b'>' {
            return Err(self.scanner.error("declaration must end with '?>'."));
        }

        handler.end_declaration(name)?;
        self.scanner.advance(1);
        trace!("declaration: end name='{}'", name.escape_ascii());
        Ok(())
    }

    /// Character data up to the next '<'. Zero-copy unless an escape occurs.
    fn characters<H: SaxHandler<'a> + ?Sized>(&mut self, handler: &mut H) -> Result<()> {
        let start = self.scanner.position();
        let Some(boundary) = self.scanner.find_text_boundary() else {
            self.scanner.set_position(self.input.len());
            return handler.characters(Span::Stable(self.scanner.slice(start, self.input.len())));
        };

        if self.input[boundary] == b'<' {
            self.scanner.set_position(boundary);
            return handler.characters(Span::Stable(self.scanner.slice(start, boundary)));
        }

        // Text span with one or more encoded characters.
        self.scratch.reset();
        self.scratch.append(self.scanner.slice(start, boundary));
        self.scanner.set_position(boundary);
        loop {
            self.parse_encoded_char()?;
            let run_start = self.scanner.position();
            match self.scanner.find_text_boundary() {
                Some(p) => {
                    self.scratch.append(self.scanner.slice(run_start, p));
                    self.scanner.set_position(p);
                    if self.input[p] == b'<' {
                        break;
                    }
                }
                None => {
                    self.scratch.append(self.scanner.slice(run_start, self.input.len()));
                    self.scanner.set_position(self.input.len());
                    break;
                }
            }
        }

        if self.scratch.is_empty() {
            let pos = self.scanner.position();
            handler.characters(Span::Stable(self.scanner.slice(pos, pos)))
        } else {
            handler.characters(Span::Transient(self.scratch.get()))
        }
    }

    /// Decode `&name;` into the scratch buffer. The cursor is on the '&' and
    /// ends up on the byte after ';'.
    fn parse_encoded_char(&mut self) -> Result<()> {
        self.scanner.advance(1);
        let name_start = self.scanner.position();
        let Some(semicolon) = self.scanner.find_byte(b';') else {
            return Err(self.scanner.error(
                "error parsing encoded character: terminating character is not found.",
            ));
        };
        if semicolon == name_start {
            return Err(self.scanner.error("empty encoded character."));
        }

        decode_into(self.scanner.slice(name_start, semicolon), &mut self.scratch);
        self.scanner.set_position(semicolon + 1);
        Ok(())
    }

    /// `name[:name]="value"`. The value is decoded.
    fn attribute<H: SaxHandler<'a> + ?Sized>(&mut self, handler: &mut H) -> Result<()> {
        let (prefix, name) = self.scanner.read_qname()?;

        if self.scanner.peek() != Some(b'=') {
            return Err(self.scanner.error(format!(
                "Attribute must begin with 'name=..'. (ns='{}', name='{}')",
                prefix.escape_ascii(),
                name.escape_ascii()
            )));
        }
        self.scanner.next_check()?;

        let value = match self.value()? {
            Some(stable) => Span::Stable(stable),
            None => Span::Transient(self.scratch.get()),
        };
        trace!(
            "attribute: ns='{}', name='{}', value='{}'",
            prefix.escape_ascii(),
            name.escape_ascii(),
            value.as_bytes().escape_ascii()
        );
        handler.attribute(&Attribute {
            prefix,
            name,
            value,
        })
    }

    /// Double-quoted attribute value.
    ///
    /// Returns the input slice when the value has no escapes; otherwise the
    /// decoded value is left in the scratch buffer and None is returned.
    fn value(&mut self) -> Result<Option<&'a [u8]>> {
        if self.scanner.peek() != Some(b'"') {
            return Err(self.scanner.error("value must be quoted"));
        }
        self.scanner.next_check()?;
        let start = self.scanner.position();

        let Some(p) = self.scanner.find_byte2(b'"', b'&') else {
            return Err(self.missing_quote());
        };
        if self.input[p] == b'"' {
            self.scanner.set_position(p + 1);
            return Ok(Some(self.scanner.slice(start, p)));
        }

        // This value contains one or more encoded characters.
        self.scratch.reset();
        self.scratch.append(self.scanner.slice(start, p));
        self.scanner.set_position(p);
        loop {
            self.parse_encoded_char()?;
            let run_start = self.scanner.position();
            let Some(p) = self.scanner.find_byte2(b'"', b'&') else {
                return Err(self.missing_quote());
            };
            self.scratch.append(self.scanner.slice(run_start, p));
            self.scanner.set_position(p);
            if self.input[p] == b'"' {
                self.scanner.advance(1);
                return Ok(None);
            }
        }
    }

    /// Double-quoted literal without escape decoding (DOCTYPE identifiers).
    fn literal(&mut self) -> Result<&'a [u8]> {
        if self.scanner.peek() != Some(b'"') {
            return Err(self.scanner.error("value must be quoted"));
        }
        self.scanner.next_check()?;
        let start = self.scanner.position();
        let Some(end) = self.scanner.find_byte(b'"') else {
            return Err(self.missing_quote());
        };
        self.scanner.set_position(end + 1);
        Ok(self.scanner.slice(start, end))
    }

    fn missing_quote(&mut self) -> crate::error::Error {
        self.scanner.set_position(self.input.len());
        self.scanner.error("closing quote of a value was not found.")
    }
}

/// Parse `input` with a fresh [`SaxParser`].
pub fn parse<'a, H: SaxHandler<'a> + ?Sized>(
    input: &'a [u8],
    config: ParserConfig,
    handler: &mut H,
) -> Result<()> {
    SaxParser::with_config(input, config).parse(handler)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test handler that records events as strings
    #[derive(Default)]
    struct TestHandler {
        events: Vec<String>,
        doctypes: Vec<(DoctypeKeyword, String, String, Option<String>)>,
    }

    fn s(b: &[u8]) -> String {
        String::from_utf8_lossy(b).into_owned()
    }

    impl<'a> SaxHandler<'a> for TestHandler {
        fn doctype(&mut self, doctype: &Doctype<'a>) -> Result<()> {
            self.doctypes.push((
                doctype.keyword,
                s(doctype.root_element),
                s(doctype.fpi),
                doctype.uri.map(s),
            ));
            Ok(())
        }

        fn start_declaration(&mut self, name: &'a [u8]) -> Result<()> {
            self.events.push(format!("decl({})", s(name)));
            Ok(())
        }

        fn end_declaration(&mut self, name: &'a [u8]) -> Result<()> {
            self.events.push(format!("/decl({})", s(name)));
            Ok(())
        }

        fn start_element(&mut self, elem: &Element<'a>) -> Result<()> {
            self.events.push(format!("<{}:{}>", s(elem.prefix), s(elem.name)));
            Ok(())
        }

        fn end_element(&mut self, elem: &Element<'a>) -> Result<()> {
            self.events.push(format!("</{}:{}>", s(elem.prefix), s(elem.name)));
            Ok(())
        }

        fn characters(&mut self, text: Span<'a, '_>) -> Result<()> {
            let marker = if text.is_transient() { "~" } else { "" };
            self.events.push(format!("{}'{}'", marker, s(text.as_bytes())));
            Ok(())
        }

        fn attribute(&mut self, attr: &Attribute<'a, '_>) -> Result<()> {
            let marker = if attr.is_transient() { "~" } else { "" };
            self.events.push(format!(
                "@{}:{}={}\"{}\"",
                s(attr.prefix),
                s(attr.name),
                marker,
                s(attr.value.as_bytes())
            ));
            Ok(())
        }
    }

    fn run(input: &[u8]) -> Result<Vec<String>> {
        let mut handler = TestHandler::default();
        SaxParser::new(input).parse(&mut handler)?;
        Ok(handler.events)
    }

    fn run_strict(input: &[u8]) -> Result<Vec<String>> {
        let mut handler = TestHandler::default();
        SaxParser::with_config(input, ParserConfig::strict()).parse(&mut handler)?;
        Ok(handler.events)
    }

    #[test]
    fn test_declaration_and_elements() {
        let events =
            run_strict(b"<?xml version=\"1.0\"?><a><b x=\"1\">hello &amp; world</b></a>").unwrap();
        assert_eq!(
            events,
            vec![
                "decl(xml)",
                "@:version=\"1.0\"",
                "/decl(xml)",
                "<:a>",
                "@:x=\"1\"",
                "<:b>",
                "~'hello & world'",
                "</:b>",
                "</:a>",
            ]
        );
    }

    #[test]
    fn test_strict_requires_declaration() {
        let err = run_strict(b"<a/>").unwrap_err();
        assert!(err.is_malformed());
        assert_eq!(err.offset(), Some(1));
    }

    #[test]
    fn test_strict_requires_xml_name() {
        let err = run_strict(b"<?xsl version=\"1.0\"?><a/>").unwrap_err();
        assert!(err.message().unwrap().contains("'xml' was expected"));
    }

    #[test]
    fn test_lenient_accepts_declaration_in_body() {
        let events = run(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?><a/>").unwrap();
        assert_eq!(events[0], "decl(xml)");
        assert_eq!(events[2], "@:encoding=\"UTF-8\"");
        assert_eq!(&events[4..], ["<:a>", "</:a>"]);
    }

    #[test]
    fn test_self_closing() {
        let events = run(b"<root><child/></root>").unwrap();
        assert_eq!(events, vec!["<:root>", "<:child>", "</:child>", "</:root>"]);
    }

    #[test]
    fn test_prefixed_names() {
        let events = run(b"<x:a r:id=\"rId1\"></x:a>").unwrap();
        assert_eq!(events, vec!["@r:id=\"rId1\"", "<x:a>", "</x:a>"]);
    }

    #[test]
    fn test_close_tag_allows_blank() {
        let events = run(b"<a></a  >").unwrap();
        assert_eq!(events, vec!["<:a>", "</:a>"]);
    }

    #[test]
    fn test_bom_is_skipped() {
        let events = run(b"\xef\xbb\xbf<a/>").unwrap();
        assert_eq!(events, vec!["<:a>", "</:a>"]);
    }

    #[test]
    fn test_other_leading_bytes_rejected() {
        let err = run(b"\xfe\xff<a/>").unwrap_err();
        assert_eq!(err.offset(), Some(0));
        assert!(run(b"abc<a/>").is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(run(b"").is_err());
    }

    #[test]
    fn test_stops_at_root_close() {
        let events = run(b"<a>x</a><b>ignored<").unwrap();
        assert_eq!(events, vec!["<:a>", "'x'", "</:a>"]);

        let events = run(b"<a/>trailing garbage <<<").unwrap();
        assert_eq!(events, vec!["<:a>", "</:a>"]);
    }

    #[test]
    fn test_unclosed_root() {
        let err = run(b"<a><b></b>").unwrap_err();
        assert!(err.message().unwrap().contains("prematurely"));
    }

    #[test]
    fn test_unexpected_close() {
        let err = run(b"</a>").unwrap_err();
        assert!(err.message().unwrap().contains("unexpected closing element"));
    }

    #[test]
    fn test_close_name_not_checked_here() {
        // Name matching belongs to the namespace layer.
        let events = run(b"<a><b></a></b>").unwrap();
        assert_eq!(events, vec!["<:a>", "<:b>", "</:a>", "</:b>"]);
    }

    #[test]
    fn test_comment_skipped() {
        let events = run(b"<a><!-- a comment - with dash --><b/></a>").unwrap();
        assert_eq!(events, vec!["<:a>", "<:b>", "</:b>", "</:a>"]);
    }

    #[test]
    fn test_comment_double_dash() {
        let err = run(b"<a><!-- bad -- comment --></a>").unwrap_err();
        assert!(err.message().unwrap().contains("'--'"));
    }

    #[test]
    fn test_unterminated_comment() {
        assert!(run(b"<a><!-- never closed </a>").is_err());
    }

    #[test]
    fn test_cdata() {
        let events = run(b"<a><![CDATA[<not>parsed</not> &amp;]]></a>").unwrap();
        assert_eq!(events, vec!["<:a>", "'<not>parsed</not> &amp;'", "</:a>"]);
    }

    #[test]
    fn test_cdata_with_brackets() {
        let events = run(b"<a><![CDATA[x]]]]></a>").unwrap();
        assert_eq!(events[1], "'x]]'");
    }

    #[test]
    fn test_unterminated_cdata() {
        assert!(run(b"<a><![CDATA[abc</a>").is_err());
    }

    #[test]
    fn test_doctype() {
        let input: &[u8] = b"<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\"><html/>";
        let mut handler = TestHandler::default();
        SaxParser::new(input).parse(&mut handler).unwrap();
        assert_eq!(handler.events, vec!["<:html>", "</:html>"]);
        assert_eq!(
            handler.doctypes,
            vec![(
                DoctypeKeyword::Public,
                "html".to_string(),
                "-//W3C//DTD XHTML 1.0 Strict//EN".to_string(),
                Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd".to_string()),
            )]
        );
    }

    #[test]
    fn test_doctype_without_uri() {
        let input: &[u8] = b"<!DOCTYPE note SYSTEM \"note.dtd\"><note/>";
        let mut handler = TestHandler::default();
        SaxParser::new(input).parse(&mut handler).unwrap();
        assert_eq!(handler.doctypes[0].0, DoctypeKeyword::System);
        assert_eq!(handler.doctypes[0].3, None);
    }

    #[test]
    fn test_doctype_errors() {
        assert!(run(b"<!DOCTYPE note OTHER \"x\"><note/>").is_err());
        assert!(run(b"<!DOCTYPE note SYSTEM \"note.dtd><note/>").is_err());
        assert!(run(b"<!DOCTYPE note SYSTEM \"a\" \"b\" x><note/>").is_err());
    }

    #[test]
    fn test_text_outside_root_skipped() {
        let events = run(b"<?xml version=\"1.0\"?>\n\n<a>x</a>").unwrap();
        assert_eq!(&events[3..], ["<:a>", "'x'", "</:a>"]);
    }

    #[test]
    fn test_cdata_outside_root_skipped() {
        let events = run(b"<![CDATA[outside]]><a><![CDATA[in]]></a>").unwrap();
        assert_eq!(events, vec!["<:a>", "'in'", "</:a>"]);
    }

    #[test]
    fn test_text_escapes() {
        let events = run(b"<a>&lt;tag&gt; &quot;q&quot; &apos;</a>").unwrap();
        assert_eq!(events[1], "~'<tag> \"q\" ''");
    }

    #[test]
    fn test_unknown_entity_fallback() {
        let events = run(b"<a>AT&T;x</a>").unwrap();
        assert_eq!(events[1], "~'ATTx'");
    }

    #[test]
    fn test_numeric_reference() {
        let events = run(b"<a>&#65;&#x42;</a>").unwrap();
        assert_eq!(events[1], "~'AB'");
    }

    #[test]
    fn test_escape_errors() {
        assert!(run(b"<a>&;</a>").is_err());
        assert!(run(b"<a>no terminator &amp</a>").is_err());
    }

    #[test]
    fn test_attribute_escapes() {
        let events = run(b"<a v=\"x &lt; y\" w=\"plain\"/>").unwrap();
        assert_eq!(events[0], "@:v=~\"x < y\"");
        assert_eq!(events[1], "@:w=\"plain\"");
    }

    #[test]
    fn test_attribute_errors() {
        // '=' must follow the name immediately
        assert!(run(b"<a v =\"1\"/>").is_err());
        // single quotes are not accepted
        assert!(run(b"<a v='1'/>").is_err());
        assert!(run(b"<a v=\"1/>").is_err());
        assert!(run(b"<a v=\"&amp;1/>").is_err());
        assert!(run(b"<a 1v=\"1\"/>").is_err());
    }

    #[test]
    fn test_attribute_order_and_duplicates_at_core_layer() {
        let events = run(b"<a n=\"1\" m=\"2\" n=\"3\"/>").unwrap();
        assert_eq!(&events[..3], ["@:n=\"1\"", "@:m=\"2\"", "@:n=\"3\""]);
    }

    #[test]
    fn test_invalid_first_char() {
        let err = run(b"<a><1b/></a>").unwrap_err();
        assert!(err.message().unwrap().contains("alphabet"));
    }

    #[test]
    fn test_bad_self_close() {
        assert!(run(b"<a/ >").is_err());
    }

    #[test]
    fn test_processing_instruction_in_body() {
        let events = run(b"<a><?mso-application progid=\"Excel.Sheet\"?></a>").unwrap();
        assert_eq!(
            events,
            vec![
                "<:a>",
                "decl(mso-application)",
                "@:progid=\"Excel.Sheet\"",
                "/decl(mso-application)",
                "</:a>",
            ]
        );
    }

    #[test]
    fn test_handler_error_aborts() {
        struct Abort;
        impl<'a> SaxHandler<'a> for Abort {
            fn start_element(&mut self, elem: &Element<'a>) -> Result<()> {
                if elem.name == b"stop" {
                    return Err(crate::error::Error::handler("stop"));
                }
                Ok(())
            }
            fn end_element(&mut self, _elem: &Element<'a>) -> Result<()> {
                Ok(())
            }
            fn characters(&mut self, _text: Span<'a, '_>) -> Result<()> {
                Ok(())
            }
            fn attribute(&mut self, _attr: &Attribute<'a, '_>) -> Result<()> {
                Ok(())
            }
        }

        let err = SaxParser::new(b"<a><stop/></a>").parse(&mut Abort).unwrap_err();
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_element_positions() {
        struct Positions(Vec<(usize, usize)>);
        impl<'a> SaxHandler<'a> for Positions {
            fn start_element(&mut self, elem: &Element<'a>) -> Result<()> {
                self.0.push((elem.begin, elem.end));
                Ok(())
            }
            fn end_element(&mut self, elem: &Element<'a>) -> Result<()> {
                self.0.push((elem.begin, elem.end));
                Ok(())
            }
            fn characters(&mut self, _text: Span<'a, '_>) -> Result<()> {
                Ok(())
            }
            fn attribute(&mut self, _attr: &Attribute<'a, '_>) -> Result<()> {
                Ok(())
            }
        }

        let mut handler = Positions(Vec::new());
        SaxParser::new(b"<ab>x</ab>").parse(&mut handler).unwrap();
        assert_eq!(handler.0, vec![(0, 4), (5, 10)]);
    }
}
