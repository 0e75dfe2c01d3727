//! Forward-only element cursors over a quick-xml event stream.
//!
//! An [`XmlStream`] wraps a `quick_xml::Reader` and tracks element depth.
//! Cursors are scoped views over that single stream:
//!
//! - [`XmlStream::descendants`] yields every element with a given local name
//!   below the current position,
//! - [`Element::children`] yields the direct children of an element.
//!
//! Every yielded [`Element`] mutably borrows its cursor, so a child cursor can
//! only exist while its parent element is current. Content the caller does not
//! descend into is skipped on the next call to the parent cursor; nothing is
//! buffered.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::errors::{ClrdepsError, Result};

/// Start tag of an element with its attributes decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementStart {
    name: String,
    attributes: Vec<(String, String)>,
}

impl ElementStart {
    fn from_tag(tag: &BytesStart<'_>) -> std::result::Result<Self, String> {
        let name = String::from_utf8(tag.local_name().as_ref().to_vec())
            .map_err(|err| format!("element name is not valid UTF-8: {err}"))?;

        let mut attributes = Vec::new();
        for attr in tag.attributes() {
            let attr = attr.map_err(|err| format!("invalid attribute on <{name}>: {err}"))?;
            let key = String::from_utf8(attr.key.local_name().as_ref().to_vec())
                .map_err(|err| format!("attribute name on <{name}> is not valid UTF-8: {err}"))?;
            let value = attr
                .unescape_value()
                .map_err(|err| format!("invalid value for attribute `{key}` on <{name}>: {err}"))?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Self { name, attributes })
    }

    /// Local element name.
    pub fn local_name(&self) -> &str {
        &self.name
    }

    /// Attribute value by local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

enum RawEvent {
    Open(std::result::Result<ElementStart, String>, bool),
    Close,
    Eof,
    Ignored,
    Failed(String),
}

enum StreamEvent {
    Open(ElementStart),
    Close,
    Eof,
}

/// Depth-tracking event source shared by all cursors of one document.
pub struct XmlStream<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    source: String,
    depth: usize,
    pending_close: bool,
    seen_root: bool,
}

impl<R: BufRead> XmlStream<R> {
    /// Wraps a UTF-8 byte stream. `source` labels errors (usually the report path).
    pub fn new(input: R, source: impl Into<String>) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
            source: source.into(),
            depth: 0,
            pending_close: false,
            seen_root: false,
        }
    }

    /// Label used in error messages.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Cursor over every element named `name` below the current position.
    pub fn descendants<'s>(&'s mut self, name: &'s str) -> DescendantCursor<'s, R> {
        let scope_depth = self.depth;
        DescendantCursor {
            stream: self,
            name,
            scope_depth,
            finished: false,
        }
    }

    /// Builds a malformed-report error at the current stream position.
    pub fn malformed(&self, message: impl Into<String>) -> ClrdepsError {
        ClrdepsError::malformed_at(
            self.source.clone(),
            message,
            self.reader.buffer_position() as u64,
        )
    }

    fn next_event(&mut self) -> Result<StreamEvent> {
        if self.pending_close {
            self.pending_close = false;
            self.depth -= 1;
            return Ok(StreamEvent::Close);
        }

        loop {
            let raw = match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(tag)) => RawEvent::Open(ElementStart::from_tag(&tag), false),
                Ok(Event::Empty(tag)) => RawEvent::Open(ElementStart::from_tag(&tag), true),
                Ok(Event::End(_)) => RawEvent::Close,
                Ok(Event::Eof) => RawEvent::Eof,
                Ok(_) => RawEvent::Ignored,
                Err(err) => RawEvent::Failed(format!("XML syntax error: {err}")),
            };
            self.buf.clear();

            match raw {
                RawEvent::Open(Ok(start), empty) => {
                    self.depth += 1;
                    self.seen_root = true;
                    self.pending_close = empty;
                    return Ok(StreamEvent::Open(start));
                }
                RawEvent::Open(Err(message), _) | RawEvent::Failed(message) => {
                    return Err(self.malformed(message));
                }
                RawEvent::Close => {
                    self.depth = self.depth.saturating_sub(1);
                    return Ok(StreamEvent::Close);
                }
                RawEvent::Eof => return self.end_of_document(),
                RawEvent::Ignored => continue,
            }
        }
    }

    fn end_of_document(&self) -> Result<StreamEvent> {
        if self.depth > 0 {
            return Err(self.malformed(format!(
                "unexpected end of document with {} unclosed element(s)",
                self.depth
            )));
        }
        if !self.seen_root {
            return Err(self.malformed("document has no root element"));
        }
        Ok(StreamEvent::Eof)
    }
}

/// An element yielded by a cursor. Borrow it to read attributes or descend.
pub struct Element<'s, R: BufRead> {
    stream: &'s mut XmlStream<R>,
    start: ElementStart,
    depth: usize,
}

impl<'s, R: BufRead> Element<'s, R> {
    /// Local element name.
    pub fn local_name(&self) -> &str {
        self.start.local_name()
    }

    /// Attribute value by local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.start.attr(name)
    }

    /// Attribute value that the report format requires.
    pub fn required_attr(&self, name: &str) -> Result<&str> {
        match self.start.attr(name) {
            Some(value) => Ok(value),
            None => Err(self.stream.malformed(format!(
                "missing required attribute `{}` on <{}>",
                name,
                self.start.local_name()
            ))),
        }
    }

    /// Start tag data.
    pub fn start(&self) -> &ElementStart {
        &self.start
    }

    /// Cursor over the direct children of this element.
    pub fn children(&mut self) -> ChildCursor<'_, R> {
        ChildCursor {
            stream: &mut *self.stream,
            parent_depth: self.depth,
            finished: false,
        }
    }
}

/// Yields the direct children of one element, skipping their content unless
/// the caller descends into it.
pub struct ChildCursor<'s, R: BufRead> {
    stream: &'s mut XmlStream<R>,
    parent_depth: usize,
    finished: bool,
}

impl<'s, R: BufRead> ChildCursor<'s, R> {
    /// Advances to the next child element, or `None` once the parent closed.
    pub fn next(&mut self) -> Result<Option<Element<'_, R>>> {
        if self.finished || self.stream.depth < self.parent_depth {
            self.finished = true;
            return Ok(None);
        }

        loop {
            match self.stream.next_event()? {
                StreamEvent::Open(start) if self.stream.depth == self.parent_depth + 1 => {
                    let depth = self.stream.depth;
                    return Ok(Some(Element {
                        stream: &mut *self.stream,
                        start,
                        depth,
                    }));
                }
                StreamEvent::Open(_) => continue,
                StreamEvent::Close if self.stream.depth < self.parent_depth => {
                    self.finished = true;
                    return Ok(None);
                }
                StreamEvent::Close => continue,
                StreamEvent::Eof => {
                    self.finished = true;
                    return Ok(None);
                }
            }
        }
    }
}

/// Yields every element with a given local name inside a scope, in document order.
pub struct DescendantCursor<'s, R: BufRead> {
    stream: &'s mut XmlStream<R>,
    name: &'s str,
    scope_depth: usize,
    finished: bool,
}

impl<'s, R: BufRead> DescendantCursor<'s, R> {
    /// Advances to the next matching element, or `None` at the end of the scope.
    pub fn next(&mut self) -> Result<Option<Element<'_, R>>> {
        if self.finished {
            return Ok(None);
        }

        loop {
            match self.stream.next_event()? {
                StreamEvent::Open(start) if start.local_name() == self.name => {
                    let depth = self.stream.depth;
                    return Ok(Some(Element {
                        stream: &mut *self.stream,
                        start,
                        depth,
                    }));
                }
                StreamEvent::Open(_) => continue,
                StreamEvent::Close if self.stream.depth < self.scope_depth => {
                    self.finished = true;
                    return Ok(None);
                }
                StreamEvent::Close => continue,
                StreamEvent::Eof => {
                    self.finished = true;
                    return Ok(None);
                }
            }
        }
    }
}
