//! Per-kind XML codecs, dispatched by tag name.
//!
//! `Ref` and `SharedString` are deliberately not handled here: both need
//! access to the document-wide resolver state (`referents`/the shared string
//! table) that only `deserializer.rs`/`serializer.rs` carry, so those two
//! kinds are read and written directly by the top-level codec instead of
//! going through [`read_value_xml`]/[`write_value_xml`].

mod cframe;
mod color;
mod enumeration;
mod faces_axes;
mod numbers;
mod physical_properties;
mod sequence;
mod vectors;

use std::io::{Read, Write};

use rbx_types::Variant;

use crate::{
    core::type_name_for,
    deserializer_core::XmlEventReader,
    error::{DecodeError, DecodeErrorCause, EncodeError},
    serializer_core::{XmlEventWriter, XmlWriteEvent},
};

/// Lowercases a tag name and folds the two historical aliases Roblox's XML
/// format still accepts on read (`cframe`/`coordinateframe`, `object`/`ref`)
/// onto a single spelling, so the match in [`read_value_xml`] only needs to
/// know one name per kind.
pub(crate) fn normalize_tag_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
        "coordinateframe" => "cframe".to_owned(),
        "object" => "ref".to_owned(),
        _ => lower,
    }
}

/// Reads the value of a non-`Ref`, non-`SharedString` property whose opening
/// tag (with its `name` attribute) has already been consumed by the caller.
/// `tag_name` should already be normalized via [`normalize_tag_name`].
pub(crate) fn read_value_xml<R: Read>(reader: &mut XmlEventReader<R>, tag_name: &str) -> Result<Variant, DecodeError> {
    match tag_name {
        "string" => numbers::read_string(reader),
        "binarystring" => numbers::read_binary_string(reader),
        "protectedstring" => numbers::read_protected_string(reader),
        "content" => numbers::read_content(reader),
        "bool" => numbers::read_bool(reader),
        "int" => numbers::read_int32(reader),
        "int64" => numbers::read_int64(reader),
        "float" => numbers::read_float32(reader),
        "double" => numbers::read_float64(reader),
        "brickcolor" => numbers::read_brick_color(reader),
        "token" => enumeration::read_enum(reader),
        "udim" => vectors::read_udim(reader),
        "udim2" => vectors::read_udim2(reader),
        "ray" => vectors::read_ray(reader),
        "faces" => faces_axes::read_faces(reader),
        "axes" => faces_axes::read_axes(reader),
        "color3" => color::read_color3(reader),
        "color3uint8" => color::read_color3uint8(reader),
        "vector2" => vectors::read_vector2(reader),
        "vector2int16" => vectors::read_vector2int16(reader),
        "vector3" => vectors::read_vector3(reader),
        "vector3int16" => vectors::read_vector3int16(reader),
        "cframe" => cframe::read_cframe(reader),
        "numbersequence" => sequence::read_number_sequence(reader),
        "colorsequence" => sequence::read_color_sequence(reader),
        "numberrange" => vectors::read_number_range(reader),
        "rect2d" => vectors::read_rect(reader),
        "physicalproperties" => physical_properties::read_physical_properties(reader),
        other => Err(reader.error(DecodeErrorCause::UnexpectedTag {
            expected: "a known property type tag".to_owned(),
            found: other.to_owned(),
        })),
    }
}

/// Writes a complete `<Tag name="...">...</Tag>` element for a non-`Ref`,
/// non-`SharedString` value.
pub(crate) fn write_value_xml<W: Write>(
    writer: &mut XmlEventWriter<W>,
    name: &str,
    value: &Variant,
) -> Result<(), EncodeError> {
    let tag = type_name_for(value.ty());
    writer.write(XmlWriteEvent::start_element(tag).attr("name", name))?;

    match value {
        Variant::String(value) => numbers::write_string(writer, value)?,
        Variant::BinaryString(value) => numbers::write_binary_string(writer, value)?,
        Variant::ProtectedString(value) => numbers::write_protected_string(writer, &value.0)?,
        Variant::Content(value) => numbers::write_content(writer, value)?,
        Variant::Bool(value) => numbers::write_bool(writer, *value)?,
        Variant::Int32(value) => numbers::write_number(writer, *value)?,
        Variant::Int64(value) => numbers::write_number(writer, *value)?,
        Variant::Float32(value) => numbers::write_number(writer, *value)?,
        Variant::Float64(value) => numbers::write_number(writer, *value)?,
        Variant::BrickColor(value) => numbers::write_brick_color(writer, value.0)?,
        Variant::Enum(value) => enumeration::write_enum(writer, *value)?,
        Variant::UDim(value) => vectors::write_udim(writer, *value)?,
        Variant::UDim2(value) => vectors::write_udim2(writer, *value)?,
        Variant::Ray(value) => vectors::write_ray(writer, *value)?,
        Variant::Faces(value) => faces_axes::write_faces(writer, *value)?,
        Variant::Axes(value) => faces_axes::write_axes(writer, *value)?,
        Variant::Color3(value) => color::write_color3(writer, *value)?,
        Variant::Color3uint8(value) => color::write_color3uint8(writer, *value)?,
        Variant::Vector2(value) => vectors::write_vector2(writer, *value)?,
        Variant::Vector2int16(value) => vectors::write_vector2int16(writer, *value)?,
        Variant::Vector3(value) => vectors::write_vector3(writer, *value)?,
        Variant::Vector3int16(value) => vectors::write_vector3int16(writer, *value)?,
        Variant::CFrame(value) => cframe::write_cframe(writer, *value)?,
        Variant::NumberSequence(value) => sequence::write_number_sequence(writer, value)?,
        Variant::ColorSequence(value) => sequence::write_color_sequence(writer, value)?,
        Variant::NumberRange(value) => vectors::write_number_range(writer, *value)?,
        Variant::Rect(value) => vectors::write_rect(writer, *value)?,
        Variant::PhysicalProperties(value) => physical_properties::write_physical_properties(writer, *value)?,
        Variant::Ref(_) | Variant::SharedString(_) => unreachable!(
            "Ref and SharedString are written by the top-level serializer, not write_value_xml"
        ),
    }

    writer.write(XmlWriteEvent::end_element())
}
