//! `Faces` and `Axes`: bitmask values, written as their underlying integer.

use std::io::{Read, Write};

use rbx_types::{Axes, Faces, Variant};

use crate::{
    deserializer_core::XmlEventReader,
    error::{DecodeError, DecodeErrorCause},
    serializer_core::XmlEventWriter,
};

pub(crate) fn read_faces<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let text = reader.read_characters()?;
    let bits: u8 = text.parse().map_err(|err| reader.error(DecodeErrorCause::ParseInt(err)))?;
    let value = Faces::from_bits(bits).ok_or_else(|| {
        reader.error(DecodeErrorCause::Malformed {
            what: "Faces",
            reason: "unknown bit set in bitmask",
        })
    })?;
    Ok(Variant::Faces(value))
}

pub(crate) fn write_faces<W: Write>(writer: &mut XmlEventWriter<W>, value: Faces) -> Result<(), crate::error::EncodeError> {
    writer.write_characters(value.bits())
}

pub(crate) fn read_axes<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let text = reader.read_characters()?;
    let bits: u8 = text.parse().map_err(|err| reader.error(DecodeErrorCause::ParseInt(err)))?;
    let value = Axes::from_bits(bits).ok_or_else(|| {
        reader.error(DecodeErrorCause::Malformed {
            what: "Axes",
            reason: "unknown bit set in bitmask",
        })
    })?;
    Ok(Variant::Axes(value))
}

pub(crate) fn write_axes<W: Write>(writer: &mut XmlEventWriter<W>, value: Axes) -> Result<(), crate::error::EncodeError> {
    writer.write_characters(value.bits())
}
