//! `Enum`, serialized to XML as a `token`: the raw `u32` id, no name lookup.

use std::io::{Read, Write};

use rbx_types::{Enum, Variant};

use crate::{
    deserializer_core::XmlEventReader,
    error::{DecodeError, DecodeErrorCause},
    serializer_core::XmlEventWriter,
};

pub(crate) fn read_enum<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let text = reader.read_characters()?;
    let value: u32 = text.parse().map_err(|err| reader.error(DecodeErrorCause::ParseInt(err)))?;
    Ok(Variant::Enum(Enum::from_u32(value)))
}

pub(crate) fn write_enum<W: Write>(writer: &mut XmlEventWriter<W>, value: Enum) -> Result<(), crate::error::EncodeError> {
    writer.write_characters(value.to_u32())
}
