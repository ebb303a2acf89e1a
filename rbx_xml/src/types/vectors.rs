//! `Vector2`/`Vector3` and the types built out of one or two of them:
//! `UDim`, `UDim2`, `Ray`, `Rect2D`, `NumberRange`.

use std::io::{Read, Write};

use rbx_types::{NumberRange, Ray, Rect, UDim, UDim2, Variant, Vector2, Vector2int16, Vector3, Vector3int16};

use crate::{
    deserializer_core::XmlEventReader,
    error::{DecodeError, EncodeError},
    serializer_core::{XmlEventWriter, XmlWriteEvent},
};

fn read_f32_tag<R: Read>(reader: &mut XmlEventReader<R>, tag: &str) -> Result<f32, DecodeError> {
    let text = reader.read_tag_contents(tag)?;
    let value: f32 = text
        .parse()
        .map_err(|err| reader.error(crate::error::DecodeErrorCause::ParseFloat(err)))?;
    Ok(value)
}

fn read_i16_tag<R: Read>(reader: &mut XmlEventReader<R>, tag: &str) -> Result<i16, DecodeError> {
    let text = reader.read_tag_contents(tag)?;
    let value: i16 = text
        .parse()
        .map_err(|err| reader.error(crate::error::DecodeErrorCause::ParseInt(err)))?;
    Ok(value)
}

fn read_i32_tag<R: Read>(reader: &mut XmlEventReader<R>, tag: &str) -> Result<i32, DecodeError> {
    let text = reader.read_tag_contents(tag)?;
    let value: i32 = text
        .parse()
        .map_err(|err| reader.error(crate::error::DecodeErrorCause::ParseInt(err)))?;
    Ok(value)
}

pub(crate) fn read_vector2<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let x = read_f32_tag(reader, "X")?;
    let y = read_f32_tag(reader, "Y")?;
    Ok(Variant::Vector2(Vector2::new(x, y)))
}

pub(crate) fn write_vector2<W: Write>(writer: &mut XmlEventWriter<W>, value: Vector2) -> Result<(), EncodeError> {
    writer.write_tag_characters("X", value.x)?;
    writer.write_tag_characters("Y", value.y)
}

pub(crate) fn read_vector3<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let x = read_f32_tag(reader, "X")?;
    let y = read_f32_tag(reader, "Y")?;
    let z = read_f32_tag(reader, "Z")?;
    Ok(Variant::Vector3(Vector3::new(x, y, z)))
}

pub(crate) fn write_vector3<W: Write>(writer: &mut XmlEventWriter<W>, value: Vector3) -> Result<(), EncodeError> {
    writer.write_tag_characters("X", value.x)?;
    writer.write_tag_characters("Y", value.y)?;
    writer.write_tag_characters("Z", value.z)
}

pub(crate) fn read_vector2int16<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let x = read_i16_tag(reader, "X")?;
    let y = read_i16_tag(reader, "Y")?;
    Ok(Variant::Vector2int16(Vector2int16::new(x, y)))
}

pub(crate) fn write_vector2int16<W: Write>(
    writer: &mut XmlEventWriter<W>,
    value: Vector2int16,
) -> Result<(), EncodeError> {
    writer.write_tag_characters("X", value.x)?;
    writer.write_tag_characters("Y", value.y)
}

pub(crate) fn read_vector3int16<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let x = read_i16_tag(reader, "X")?;
    let y = read_i16_tag(reader, "Y")?;
    let z = read_i16_tag(reader, "Z")?;
    Ok(Variant::Vector3int16(Vector3int16::new(x, y, z)))
}

pub(crate) fn write_vector3int16<W: Write>(
    writer: &mut XmlEventWriter<W>,
    value: Vector3int16,
) -> Result<(), EncodeError> {
    writer.write_tag_characters("X", value.x)?;
    writer.write_tag_characters("Y", value.y)?;
    writer.write_tag_characters("Z", value.z)
}

pub(crate) fn read_udim<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let scale = read_f32_tag(reader, "S")?;
    let offset = read_i32_tag(reader, "O")?;
    Ok(Variant::UDim(UDim::new(scale, offset)))
}

pub(crate) fn write_udim<W: Write>(writer: &mut XmlEventWriter<W>, value: UDim) -> Result<(), EncodeError> {
    writer.write_tag_characters("S", value.scale)?;
    writer.write_tag_characters("O", value.offset)
}

pub(crate) fn read_udim2<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let xs = read_f32_tag(reader, "XS")?;
    let xo = read_i32_tag(reader, "XO")?;
    let ys = read_f32_tag(reader, "YS")?;
    let yo = read_i32_tag(reader, "YO")?;
    Ok(Variant::UDim2(UDim2::new(
        UDim::new(xs, xo),
        UDim::new(ys, yo),
    )))
}

pub(crate) fn write_udim2<W: Write>(writer: &mut XmlEventWriter<W>, value: UDim2) -> Result<(), EncodeError> {
    writer.write_tag_characters("XS", value.x.scale)?;
    writer.write_tag_characters("XO", value.x.offset)?;
    writer.write_tag_characters("YS", value.y.scale)?;
    writer.write_tag_characters("YO", value.y.offset)
}

pub(crate) fn read_ray<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    reader.expect_start_with_name("origin")?;
    let origin = match read_vector3(reader)? {
        Variant::Vector3(v) => v,
        _ => unreachable!(),
    };
    reader.expect_end_with_name("origin")?;

    reader.expect_start_with_name("direction")?;
    let direction = match read_vector3(reader)? {
        Variant::Vector3(v) => v,
        _ => unreachable!(),
    };
    reader.expect_end_with_name("direction")?;

    Ok(Variant::Ray(Ray::new(origin, direction)))
}

pub(crate) fn write_ray<W: Write>(writer: &mut XmlEventWriter<W>, value: Ray) -> Result<(), EncodeError> {
    writer.write(XmlWriteEvent::start_element("origin"))?;
    write_vector3(writer, value.origin)?;
    writer.write(XmlWriteEvent::end_element())?;

    writer.write(XmlWriteEvent::start_element("direction"))?;
    write_vector3(writer, value.direction)?;
    writer.write(XmlWriteEvent::end_element())
}

pub(crate) fn read_rect<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    reader.expect_start_with_name("min")?;
    let min = match read_vector2(reader)? {
        Variant::Vector2(v) => v,
        _ => unreachable!(),
    };
    reader.expect_end_with_name("min")?;

    reader.expect_start_with_name("max")?;
    let max = match read_vector2(reader)? {
        Variant::Vector2(v) => v,
        _ => unreachable!(),
    };
    reader.expect_end_with_name("max")?;

    Ok(Variant::Rect(Rect::new(min, max)))
}

pub(crate) fn write_rect<W: Write>(writer: &mut XmlEventWriter<W>, value: Rect) -> Result<(), EncodeError> {
    writer.write(XmlWriteEvent::start_element("min"))?;
    write_vector2(writer, value.min)?;
    writer.write(XmlWriteEvent::end_element())?;

    writer.write(XmlWriteEvent::start_element("max"))?;
    write_vector2(writer, value.max)?;
    writer.write(XmlWriteEvent::end_element())
}

pub(crate) fn read_number_range<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let text = reader.read_characters()?;
    let mut parts = text.split_whitespace();

    let missing = |reader: &XmlEventReader<R>| {
        reader.error(crate::error::DecodeErrorCause::Malformed {
            what: "NumberRange",
            reason: "expected two space-separated floats",
        })
    };

    let min: f32 = parts
        .next()
        .ok_or_else(|| missing(reader))?
        .parse()
        .map_err(|err| reader.error(crate::error::DecodeErrorCause::ParseFloat(err)))?;
    let max: f32 = parts
        .next()
        .ok_or_else(|| missing(reader))?
        .parse()
        .map_err(|err| reader.error(crate::error::DecodeErrorCause::ParseFloat(err)))?;

    Ok(Variant::NumberRange(NumberRange::new(min, max)))
}

pub(crate) fn write_number_range<W: Write>(
    writer: &mut XmlEventWriter<W>,
    value: NumberRange,
) -> Result<(), EncodeError> {
    writer.write_characters(format!("{} {}", value.min, value.max))
}
