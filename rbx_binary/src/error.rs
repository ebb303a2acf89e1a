use std::io;

use rbx_types::Ref;
use thiserror::Error;

/// An opaque error produced by [`crate::to_writer`] or [`crate::from_reader`].
///
/// The concrete cause is intentionally not part of the public API (it's
/// boxed behind this struct) so new failure kinds can be added without a
/// breaking change.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error {
    source: Box<InnerError>,
}

impl From<InnerError> for Error {
    fn from(inner: InnerError) -> Self {
        Self {
            source: Box::new(inner),
        }
    }
}

impl From<io::Error> for Error {
    fn from(source: io::Error) -> Self {
        InnerError::Io { source }.into()
    }
}

#[derive(Debug, Error)]
pub(crate) enum InnerError {
    #[error(transparent)]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("not a Roblox binary file: bad magic header")]
    InvalidMagic,

    #[error("unsupported binary format version {version}")]
    UnsupportedVersion { version: u16 },

    #[error("file ended before the END chunk was read")]
    TruncatedInput,

    #[error("the END chunk's footer did not read back as `</roblox>`")]
    MalformedFooter,

    #[error(
        "property type mismatch: expected {type_name}.{prop_name} to be of type \
        {valid_type_names}, but it was of type {actual_type_name} on instance {instance_full_name}"
    )]
    PropTypeMismatch {
        type_name: String,
        prop_name: String,
        valid_type_names: &'static str,
        actual_type_name: String,
        instance_full_name: String,
    },

    #[error("unsupported property type: {type_name}.{prop_name} is of type {prop_type}")]
    UnsupportedPropType {
        type_name: String,
        prop_name: String,
        prop_type: String,
    },

    #[error("the instance with referent {referent:?} was not present in the dom")]
    InvalidInstanceId { referent: Ref },
}

/// A non-fatal issue discovered while decoding, collected into
/// [`crate::DecodeResult::warnings`] instead of aborting the decode.
#[derive(Debug, Error)]
pub enum DecodeWarning {
    #[error("PROP chunk for {class_name}.{prop_name} had an unrecognized data_type {data_type}; its values were skipped")]
    UnknownPropType {
        class_name: String,
        prop_name: String,
        data_type: u8,
    },

    #[error("property {class_name}.{prop_name} on instance {referent:?} could not be decoded as the column's declared type; the instance's default was kept")]
    InvalidProperty {
        class_name: String,
        prop_name: String,
        referent: Ref,
    },

    #[error("a Reference property on instance {referent:?} pointed at an id that was never declared by an INST chunk; it was decoded as a null reference")]
    UnresolvedReference { referent: Ref },

    #[error("{count} bytes of trailing data after the END chunk were discarded")]
    TrailingData { count: usize },

    #[error("a PRNT entry would have made instance {referent:?} its own ancestor; its parent link was left unset")]
    IgnoredParentCycle { referent: Ref },
}
