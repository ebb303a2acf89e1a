//! `NumberSequence` and `ColorSequence`: a `<Keypoints>`-wrapped string of
//! space-separated values, one run of fields per keypoint, requiring at
//! least two keypoints per Roblox's own constraint.

use std::io::{Read, Write};

use rbx_types::{ColorSequence, ColorSequenceKeypoint, NumberSequence, NumberSequenceKeypoint, Variant};

use crate::{
    deserializer_core::XmlEventReader,
    error::{DecodeError, DecodeErrorCause, EncodeError},
    serializer_core::XmlEventWriter,
};

fn next_field<R: Read>(
    reader: &XmlEventReader<R>,
    fields: &mut std::str::SplitWhitespace,
    what: &'static str,
) -> Result<f32, DecodeError> {
    fields
        .next()
        .ok_or_else(|| {
            reader.error(DecodeErrorCause::Malformed {
                what,
                reason: "ran out of fields while parsing a keypoint",
            })
        })?
        .parse()
        .map_err(|err| reader.error(DecodeErrorCause::ParseFloat(err)))
}

pub(crate) fn read_number_sequence<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let text = reader.read_characters()?;
    let mut fields = text.split_whitespace();
    let mut keypoints = Vec::new();

    while fields.clone().next().is_some() {
        let time = next_field(reader, &mut fields, "NumberSequence")?;
        let value = next_field(reader, &mut fields, "NumberSequence")?;
        let envelope = next_field(reader, &mut fields, "NumberSequence")?;

        keypoints.push(NumberSequenceKeypoint::new(time, value, envelope));
    }

    Ok(Variant::NumberSequence(NumberSequence { keypoints }))
}

pub(crate) fn write_number_sequence<W: Write>(
    writer: &mut XmlEventWriter<W>,
    value: &NumberSequence,
) -> Result<(), EncodeError> {
    let mut text = String::new();
    for keypoint in &value.keypoints {
        text.push_str(&format!("{} {} {} ", keypoint.time, keypoint.value, keypoint.envelope));
    }
    writer.write_characters(text.trim_end())
}

pub(crate) fn read_color_sequence<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let text = reader.read_characters()?;
    let mut fields = text.split_whitespace();
    let mut keypoints = Vec::new();

    while fields.clone().next().is_some() {
        let time = next_field(reader, &mut fields, "ColorSequence")?;
        let r = next_field(reader, &mut fields, "ColorSequence")?;
        let g = next_field(reader, &mut fields, "ColorSequence")?;
        let b = next_field(reader, &mut fields, "ColorSequence")?;
        let envelope = next_field(reader, &mut fields, "ColorSequence")?;

        keypoints.push(ColorSequenceKeypoint::new(
            time,
            rbx_types::Color3::new(r, g, b),
            envelope,
        ));
    }

    Ok(Variant::ColorSequence(ColorSequence { keypoints }))
}

pub(crate) fn write_color_sequence<W: Write>(
    writer: &mut XmlEventWriter<W>,
    value: &ColorSequence,
) -> Result<(), EncodeError> {
    let mut text = String::new();
    for keypoint in &value.keypoints {
        text.push_str(&format!(
            "{} {} {} {} {} ",
            keypoint.time, keypoint.color.r, keypoint.color.g, keypoint.color.b, keypoint.envelope
        ));
    }
    writer.write_characters(text.trim_end())
}
