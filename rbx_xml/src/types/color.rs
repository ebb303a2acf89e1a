//! `Color3` (three floats, same subtag shape as `Vector3`) and `Color3uint8`
//! (packed as a single 0xRRGGBB integer, matching the binary format).

use std::io::{Read, Write};

use rbx_types::{Color3, Color3uint8, Variant};

use crate::{
    deserializer_core::XmlEventReader,
    error::{DecodeError, EncodeError},
    serializer_core::XmlEventWriter,
};

use super::vectors::{read_vector3, write_vector3};
use rbx_types::Vector3;

pub(crate) fn read_color3<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    match read_vector3(reader)? {
        Variant::Vector3(Vector3 { x, y, z }) => Ok(Variant::Color3(Color3::new(x, y, z))),
        _ => unreachable!(),
    }
}

pub(crate) fn write_color3<W: Write>(writer: &mut XmlEventWriter<W>, value: Color3) -> Result<(), EncodeError> {
    write_vector3(writer, Vector3::new(value.r, value.g, value.b))
}

pub(crate) fn read_color3uint8<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let text = reader.read_characters()?;
    let packed: u32 = text
        .parse()
        .map_err(|err| reader.error(crate::error::DecodeErrorCause::ParseInt(err)))?;

    let r = ((packed >> 16) & 0xFF) as u8;
    let g = ((packed >> 8) & 0xFF) as u8;
    let b = (packed & 0xFF) as u8;

    Ok(Variant::Color3uint8(Color3uint8::new(r, g, b)))
}

pub(crate) fn write_color3uint8<W: Write>(
    writer: &mut XmlEventWriter<W>,
    value: Color3uint8,
) -> Result<(), EncodeError> {
    let packed = ((value.r as u32) << 16) | ((value.g as u32) << 8) | (value.b as u32);
    writer.write_characters(packed)
}
