//! `PhysicalProperties`: `<CustomPhysics>` is always present; the five
//! numeric fields are only written (and only expected) when custom physics
//! is turned on.

use std::io::{Read, Write};

use rbx_types::{PhysicalProperties, Variant};

use crate::{
    deserializer_core::XmlEventReader,
    error::{DecodeError, DecodeErrorCause},
    serializer_core::XmlEventWriter,
};

fn read_f32_tag<R: Read>(reader: &mut XmlEventReader<R>, tag: &str) -> Result<f32, DecodeError> {
    let text = reader.read_tag_contents(tag)?;
    text.parse().map_err(|err| reader.error(DecodeErrorCause::ParseFloat(err)))
}

pub(crate) fn read_physical_properties<R: Read>(
    reader: &mut XmlEventReader<R>,
) -> Result<Variant, DecodeError> {
    let custom_text = reader.read_tag_contents("CustomPhysics")?;
    let custom = match custom_text.as_str() {
        "true" => true,
        "false" => false,
        _ => {
            return Err(reader.error(DecodeErrorCause::Malformed {
                what: "PhysicalProperties",
                reason: "CustomPhysics must be \"true\" or \"false\"",
            }))
        }
    };

    if !custom {
        return Ok(Variant::PhysicalProperties(PhysicalProperties::default_non_custom()));
    }

    let density = read_f32_tag(reader, "Density")?;
    let friction = read_f32_tag(reader, "Friction")?;
    let elasticity = read_f32_tag(reader, "Elasticity")?;
    let friction_weight = read_f32_tag(reader, "FrictionWeight")?;
    let elasticity_weight = read_f32_tag(reader, "ElasticityWeight")?;

    Ok(Variant::PhysicalProperties(PhysicalProperties {
        custom: true,
        density,
        friction,
        elasticity,
        friction_weight,
        elasticity_weight,
    }))
}

pub(crate) fn write_physical_properties<W: Write>(
    writer: &mut XmlEventWriter<W>,
    value: PhysicalProperties,
) -> Result<(), crate::error::EncodeError> {
    writer.write_tag_characters("CustomPhysics", value.custom)?;

    if value.custom {
        writer.write_tag_characters("Density", value.density)?;
        writer.write_tag_characters("Friction", value.friction)?;
        writer.write_tag_characters("Elasticity", value.elasticity)?;
        writer.write_tag_characters("FrictionWeight", value.friction_weight)?;
        writer.write_tag_characters("ElasticityWeight", value.elasticity_weight)?;
    }

    Ok(())
}
