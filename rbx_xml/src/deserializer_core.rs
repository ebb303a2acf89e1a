//! A thin wrapper over `xml-rs`'s `EventReader`, giving the rest of the
//! crate a one-token-of-lookahead reader plus the "expect this shape or
//! error" helpers every tag handler in `deserializer.rs`/`types/` needs.

use std::io::Read;

use xml::{
    common::Position,
    reader::{EventReader, ParserConfig, XmlEvent},
};

use crate::error::{DecodeError, DecodeErrorCause};

pub use xml::reader::XmlEvent as XmlReadEvent;
pub use xml::attribute::OwnedAttribute;

pub struct XmlEventReader<R: Read> {
    inner: EventReader<R>,
    peeked: Option<XmlEvent>,
}

impl<R: Read> XmlEventReader<R> {
    pub fn from_source(source: R) -> Self {
        let config = ParserConfig::new()
            .trim_whitespace(true)
            .coalesce_characters(true)
            .cdata_to_characters(true);

        XmlEventReader {
            inner: config.create_reader(source),
            peeked: None,
        }
    }

    pub fn error(&self, cause: DecodeErrorCause) -> DecodeError {
        DecodeError::new(cause, self.inner.position())
    }

    fn pull(&mut self) -> Result<XmlEvent, DecodeError> {
        self.inner
            .next()
            .map_err(|source| self.error(DecodeErrorCause::Xml(source)))
    }

    pub fn expect_next(&mut self) -> Result<XmlEvent, DecodeError> {
        match self.peeked.take() {
            Some(event) => Ok(event),
            None => self.pull(),
        }
    }

    pub fn expect_peek(&mut self) -> Result<&XmlEvent, DecodeError> {
        if self.peeked.is_none() {
            let event = self.pull()?;
            self.peeked = Some(event);
        }

        Ok(self.peeked.as_ref().unwrap())
    }

    /// Consumes a `<name attr="...">` start tag and returns its attributes.
    pub fn expect_start_with_name(&mut self, expected: &str) -> Result<Vec<OwnedAttribute>, DecodeError> {
        match self.expect_next()? {
            XmlEvent::StartElement {
                name, attributes, ..
            } => {
                if name.local_name == expected {
                    Ok(attributes)
                } else {
                    Err(self.error(DecodeErrorCause::UnexpectedTag {
                        expected: expected.to_owned(),
                        found: name.local_name,
                    }))
                }
            }
            other => Err(self.error(DecodeErrorCause::UnexpectedXmlEvent(format!("{:?}", other)))),
        }
    }

    pub fn expect_end_with_name(&mut self, expected: &str) -> Result<(), DecodeError> {
        match self.expect_next()? {
            XmlEvent::EndElement { name } if name.local_name == expected => Ok(()),
            other => Err(self.error(DecodeErrorCause::UnexpectedXmlEvent(format!("{:?}", other)))),
        }
    }

    /// Reads the text content of the tag currently open, leaving its closing
    /// tag unconsumed. Tags with no character data (like `<null/>`) read back
    /// as an empty string.
    pub fn read_characters(&mut self) -> Result<String, DecodeError> {
        match self.expect_peek()? {
            XmlEvent::Characters(_) => match self.expect_next()? {
                XmlEvent::Characters(content) => Ok(content),
                _ => unreachable!(),
            },
            _ => Ok(String::new()),
        }
    }

    /// Reads a simple `<Tag>text</Tag>` element start-to-finish, returning
    /// its text content. Used for the scalar subtags inside composite values
    /// like `Vector3`'s `<X>`/`<Y>`/`<Z>`.
    pub fn read_tag_contents(&mut self, expected_name: &str) -> Result<String, DecodeError> {
        self.expect_start_with_name(expected_name)?;
        let contents = self.read_characters()?;
        self.expect_end_with_name(expected_name)?;
        Ok(contents)
    }

    /// Consumes events until the currently-peeked start tag's matching end
    /// tag has been read, discarding everything in between.
    pub fn eat_unknown_tag(&mut self) -> Result<(), DecodeError> {
        let mut depth = 0usize;

        loop {
            match self.expect_next()? {
                XmlEvent::StartElement { .. } => depth += 1,
                XmlEvent::EndElement { .. } => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                XmlEvent::EndDocument => {
                    return Err(self.error(DecodeErrorCause::UnexpectedEof));
                }
                _ => {}
            }
        }

        Ok(())
    }
}
