//! Type dispatch without a schema database: since this workspace drops the
//! reflection crate the teacher's `rbx_xml` relied on, there's no
//! `find_canonical_property_descriptor` to ask "what tag does this property
//! serialize under." Instead the tag is derived directly from the `Variant`
//! itself.

use rbx_types::{Variant, VariantType};

/// The XML tag name a value of this type is written under. Always the
/// mixed-case spelling; reads accept it case-insensitively along with a
/// couple of historical aliases (see [`crate::types::normalize_tag_name`]).
pub fn find_xml_type_name(value: &Variant) -> &'static str {
    type_name_for(value.ty())
}

pub(crate) fn type_name_for(ty: VariantType) -> &'static str {
    match ty {
        VariantType::String => "string",
        VariantType::BinaryString => "BinaryString",
        VariantType::ProtectedString => "ProtectedString",
        VariantType::Content => "Content",
        VariantType::Bool => "bool",
        VariantType::Int32 => "int",
        VariantType::Int64 => "int64",
        VariantType::Float32 => "float",
        VariantType::Float64 => "double",
        VariantType::BrickColor => "BrickColor",
        VariantType::Enum => "token",
        VariantType::UDim => "UDim",
        VariantType::UDim2 => "UDim2",
        VariantType::Ray => "Ray",
        VariantType::Faces => "Faces",
        VariantType::Axes => "Axes",
        VariantType::Color3 => "Color3",
        VariantType::Color3uint8 => "Color3uint8",
        VariantType::Vector2 => "Vector2",
        VariantType::Vector2int16 => "Vector2int16",
        VariantType::Vector3 => "Vector3",
        VariantType::Vector3int16 => "Vector3int16",
        VariantType::CFrame => "CoordinateFrame",
        VariantType::NumberSequence => "NumberSequence",
        VariantType::ColorSequence => "ColorSequence",
        VariantType::NumberRange => "NumberRange",
        VariantType::Rect => "Rect2D",
        VariantType::PhysicalProperties => "PhysicalProperties",
        VariantType::Ref => "Ref",
        VariantType::SharedString => "SharedString",
    }
}

/// Widens `value` toward `target` when the two types are related by a
/// lossless upgrade (`Int32` -> `Int64`, `Float32` -> `Float64`). Used only
/// to apply a [`crate::deserializer::PropertyTypeHint`]; everything else
/// (notably `Color3` <-> `BrickColor`, which would need the palette table
/// this workspace doesn't carry) passes through unchanged.
pub(crate) fn coerce(value: Variant, target: VariantType) -> Variant {
    match (value, target) {
        (Variant::Int32(v), VariantType::Int64) => Variant::Int64(v as i64),
        (Variant::Float32(v), VariantType::Float64) => Variant::Float64(v as f64),
        (other, _) => other,
    }
}
