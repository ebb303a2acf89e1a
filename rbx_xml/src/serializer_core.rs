//! A thin wrapper over `xml-rs`'s `EventWriter`, matching the shape of
//! `deserializer_core::XmlEventReader`.

use std::{fmt::Display, io::Write};

use xml::{
    emitter::EmitterConfig,
    writer::EventWriter,
};

pub use xml::writer::XmlEvent as XmlWriteEvent;

use crate::error::EncodeError;

pub struct XmlEventWriter<W: Write> {
    inner: EventWriter<W>,
}

impl<W: Write> XmlEventWriter<W> {
    pub fn from_output(output: W) -> Self {
        let inner = EmitterConfig::new()
            .perform_indent(true)
            .write_document_declaration(false)
            .create_writer(output);

        XmlEventWriter { inner }
    }

    pub fn write<'a, E: Into<XmlWriteEvent<'a>>>(&mut self, event: E) -> Result<(), EncodeError> {
        self.inner.write(event.into()).map_err(Into::into)
    }

    pub fn write_characters<T: Display>(&mut self, value: T) -> Result<(), EncodeError> {
        self.write(XmlWriteEvent::characters(&value.to_string()))
    }

    /// Writes a complete `<name>text</name>` leaf element.
    pub fn write_tag_characters<T: Display>(&mut self, name: &str, value: T) -> Result<(), EncodeError> {
        self.write(XmlWriteEvent::start_element(name))?;
        self.write_characters(value)?;
        self.write(XmlWriteEvent::end_element())
    }
}
