use std::{
    io,
    num::{ParseFloatError, ParseIntError},
};

use thiserror::Error;
use xml::common::TextPosition;

/// An opaque error produced while decoding an XML model/place document.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct DecodeError {
    source: Box<LocatedDecodeError>,
}

impl DecodeError {
    pub(crate) fn new(cause: DecodeErrorCause, position: TextPosition) -> Self {
        DecodeError {
            source: Box::new(LocatedDecodeError { position, cause }),
        }
    }
}

#[derive(Debug, Error)]
#[error("{cause} (line {}, column {})", position.row, position.column)]
struct LocatedDecodeError {
    position: TextPosition,
    #[source]
    cause: DecodeErrorCause,
}

#[derive(Debug, Error)]
pub(crate) enum DecodeErrorCause {
    #[error(transparent)]
    Xml(#[from] xml::reader::Error),

    #[error(transparent)]
    ParseFloat(#[from] ParseFloatError),

    #[error(transparent)]
    ParseInt(#[from] ParseIntError),

    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    #[error("the document ended before a matching closing tag was found")]
    UnexpectedEof,

    #[error("expected the <roblox> root tag to declare version=\"4\"")]
    WrongDocVersion,

    #[error("missing required attribute {0:?}")]
    MissingAttribute(&'static str),

    #[error("expected tag {expected:?}, found {found:?}")]
    UnexpectedTag { expected: String, found: String },

    #[error("unexpected XML event: {0}")]
    UnexpectedXmlEvent(String),

    #[error("an instance's Name property must be a string")]
    NameMustBeString,

    #[error("{what} was malformed: {reason}")]
    Malformed {
        what: &'static str,
        reason: &'static str,
    },
}

/// A non-fatal issue discovered while decoding, returned alongside the
/// produced document rather than aborting it.
#[derive(Debug, Error)]
pub enum DecodeWarning {
    #[error("property {class_name}.{prop_name} referenced referent {referent:?}, which was never declared by an <Item>")]
    UnresolvedReference {
        class_name: String,
        prop_name: String,
        referent: String,
    },

    #[error("property {class_name}.{prop_name} referenced SharedString key {key:?}, which was not present in <SharedStrings>")]
    UnresolvedSharedString {
        class_name: String,
        prop_name: String,
        key: String,
    },
}

/// An opaque error produced while encoding an XML model/place document.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct EncodeError {
    source: Box<EncodeErrorKind>,
}

impl From<EncodeErrorKind> for EncodeError {
    fn from(kind: EncodeErrorKind) -> Self {
        EncodeError {
            source: Box::new(kind),
        }
    }
}

impl From<xml::writer::Error> for EncodeError {
    fn from(source: xml::writer::Error) -> Self {
        EncodeErrorKind::Xml(source).into()
    }
}

impl From<io::Error> for EncodeError {
    fn from(source: io::Error) -> Self {
        EncodeErrorKind::Io(source).into()
    }
}

#[derive(Debug, Error)]
pub(crate) enum EncodeErrorKind {
    #[error(transparent)]
    Xml(#[from] xml::writer::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(
        "property type mismatch: expected {type_name}.{prop_name} to be of type {expected}, \
        but it was of type {actual} on a previous instance"
    )]
    PropTypeMismatch {
        type_name: String,
        prop_name: String,
        expected: String,
        actual: String,
    },
}
