//! `CoordinateFrame`: position as `<X>`/`<Y>`/`<Z>`, rotation as the nine
//! matrix entries `<R00>`..`<R22>`, row-major.

use std::io::{Read, Write};

use rbx_types::{CFrame, Matrix3, Variant, Vector3};

use crate::{
    deserializer_core::XmlEventReader,
    error::{DecodeError, EncodeError},
    serializer_core::XmlEventWriter,
};

const ROTATION_TAGS: [&str; 9] = [
    "R00", "R01", "R02", "R10", "R11", "R12", "R20", "R21", "R22",
];

pub(crate) fn read_cframe<R: Read>(reader: &mut XmlEventReader<R>) -> Result<Variant, DecodeError> {
    let read_f32 = |reader: &mut XmlEventReader<R>, tag: &str| -> Result<f32, DecodeError> {
        let text = reader.read_tag_contents(tag)?;
        text.parse()
            .map_err(|err| reader.error(crate::error::DecodeErrorCause::ParseFloat(err)))
    };

    let x = read_f32(reader, "X")?;
    let y = read_f32(reader, "Y")?;
    let z = read_f32(reader, "Z")?;

    let mut rotation = [0.0f32; 9];
    for (slot, tag) in rotation.iter_mut().zip(ROTATION_TAGS.iter()) {
        *slot = read_f32(reader, tag)?;
    }

    Ok(Variant::CFrame(CFrame::new(
        Vector3::new(x, y, z),
        Matrix3::from_array(rotation),
    )))
}

pub(crate) fn write_cframe<W: Write>(writer: &mut XmlEventWriter<W>, value: CFrame) -> Result<(), EncodeError> {
    writer.write_tag_characters("X", value.position.x)?;
    writer.write_tag_characters("Y", value.position.y)?;
    writer.write_tag_characters("Z", value.position.z)?;

    for (tag, component) in ROTATION_TAGS.iter().zip(value.orientation.to_array().iter()) {
        writer.write_tag_characters(tag, component)?;
    }

    Ok(())
}
