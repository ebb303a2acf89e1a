//! Scalar and string-ish leaf types: the ones whose entire value is the
//! tag's text content.

use std::io::{Read, Write};

use rbx_types::{BinaryString, Content, ProtectedString, Variant};

use crate::{
    deserializer_core::XmlEventReader,
    error::{DecodeError, DecodeErrorCause, EncodeError},
    serializer_core::{XmlEventWriter, XmlWriteEvent},
};

pub(crate) fn read_string<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    Ok(Variant::String(reader.read_characters()?))
}

pub(crate) fn write_string<W: Write>(writer: &mut XmlEventWriter<W>, value: &str) -> Result<(), EncodeError> {
    writer.write_characters(value)
}

pub(crate) fn read_bool<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let text = reader.read_characters()?;
    match text.as_str() {
        "true" => Ok(Variant::Bool(true)),
        "false" => Ok(Variant::Bool(false)),
        _ => Err(reader.error(DecodeErrorCause::Malformed {
            what: "bool",
            reason: "expected \"true\" or \"false\"",
        })),
    }
}

pub(crate) fn write_bool<W: Write>(writer: &mut XmlEventWriter<W>, value: bool) -> Result<(), EncodeError> {
    writer.write(XmlWriteEvent::characters(if value { "true" } else { "false" }))
}

pub(crate) fn read_int32<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let text = reader.read_characters()?;
    let value: i32 = text.parse().map_err(|err| reader.error(DecodeErrorCause::ParseInt(err)))?;
    Ok(Variant::Int32(value))
}

pub(crate) fn read_int64<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let text = reader.read_characters()?;
    let value: i64 = text.parse().map_err(|err| reader.error(DecodeErrorCause::ParseInt(err)))?;
    Ok(Variant::Int64(value))
}

pub(crate) fn read_float32<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let text = reader.read_characters()?;
    let value: f32 = text.parse().map_err(|err| reader.error(DecodeErrorCause::ParseFloat(err)))?;
    Ok(Variant::Float32(value))
}

pub(crate) fn read_float64<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let text = reader.read_characters()?;
    let value: f64 = text.parse().map_err(|err| reader.error(DecodeErrorCause::ParseFloat(err)))?;
    Ok(Variant::Float64(value))
}

pub(crate) fn write_number<W: Write, T: std::fmt::Display>(
    writer: &mut XmlEventWriter<W>,
    value: T,
) -> Result<(), EncodeError> {
    writer.write_characters(value)
}

pub(crate) fn read_binary_string<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let text = reader.read_characters()?;
    let bytes: BinaryString =
        base64::decode(text.trim()).map_err(|err| reader.error(DecodeErrorCause::Base64(err)))?;
    Ok(Variant::BinaryString(bytes))
}

pub(crate) fn write_binary_string<W: Write>(writer: &mut XmlEventWriter<W>, value: &[u8]) -> Result<(), EncodeError> {
    writer.write_characters(base64::encode(value))
}

pub(crate) fn read_protected_string<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let text = reader.read_characters()?;
    Ok(Variant::ProtectedString(ProtectedString(text)))
}

pub(crate) fn write_protected_string<W: Write>(writer: &mut XmlEventWriter<W>, value: &str) -> Result<(), EncodeError> {
    writer.write(XmlWriteEvent::cdata(value))
}

pub(crate) fn read_content<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let value = match reader.expect_peek()? {
        crate::deserializer_core::XmlReadEvent::StartElement { name, .. } => match name.local_name.as_str() {
            "null" => {
                reader.eat_unknown_tag()?;
                Content::none()
            }
            "url" => {
                let uri = reader.read_tag_contents("url")?;
                Content::from_uri(uri)
            }
            other => {
                return Err(reader.error(DecodeErrorCause::UnexpectedTag {
                    expected: "url or null".to_owned(),
                    found: other.to_owned(),
                }));
            }
        },
        _ => Content::none(),
    };

    Ok(Variant::Content(value))
}

pub(crate) fn write_content<W: Write>(writer: &mut XmlEventWriter<W>, value: &Content) -> Result<(), EncodeError> {
    match &value.0 {
        Some(uri) => writer.write_tag_characters("url", uri),
        None => {
            writer.write(XmlWriteEvent::start_element("null"))?;
            writer.write(XmlWriteEvent::end_element())
        }
    }
}

pub(crate) fn read_brick_color<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let text = reader.read_characters()?;
    let value: u32 = text.parse().map_err(|err| reader.error(DecodeErrorCause::ParseInt(err)))?;
    Ok(Variant::BrickColor(rbx_types::BrickColor(value)))
}

pub(crate) fn write_brick_color<W: Write>(writer: &mut XmlEventWriter<W>, value: u32) -> Result<(), EncodeError> {
    writer.write_characters(value)
}
