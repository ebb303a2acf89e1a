use std::fmt;

use crate::{
    basic_types::{
        Axes, BrickColor, Color3, Color3uint8, Faces, NumberRange, PhysicalProperties, Ray, Rect,
        UDim, UDim2, Vector2, Vector2int16, Vector3, Vector3int16,
    },
    cframe::CFrame,
    enum_value::Enum,
    refs::Ref,
    sequence::{ColorSequence, NumberSequence},
    shared_string::SharedString,
    strings::{BinaryString, Content, ProtectedString},
};

/// The kind of a `Variant`, without its payload. Used by the binary and XML
/// codecs to pick a column/tag encoding and by callers who want to inspect a
/// property's type without matching out the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VariantType {
    String,
    BinaryString,
    ProtectedString,
    Content,
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    BrickColor,
    Enum,
    UDim,
    UDim2,
    Ray,
    Faces,
    Axes,
    Color3,
    Color3uint8,
    Vector2,
    Vector2int16,
    Vector3,
    Vector3int16,
    CFrame,
    NumberSequence,
    ColorSequence,
    NumberRange,
    Rect,
    PhysicalProperties,
    Ref,
    SharedString,
}

/// A typed Roblox instance property value. This is a closed set: adding a
/// new kind of value is a breaking change to this crate.
///
/// Every variant is cheap enough to `Clone`; `Reference` clones keep
/// pointing at the same handle rather than copying the instance they refer
/// to (see `WeakDom::clone_instance` for how a full tree clone rewrites
/// these).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Variant {
    String(String),
    BinaryString(BinaryString),
    ProtectedString(ProtectedString),
    Content(Content),
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    BrickColor(BrickColor),
    Enum(Enum),
    UDim(UDim),
    UDim2(UDim2),
    Ray(Ray),
    Faces(Faces),
    Axes(Axes),
    Color3(Color3),
    Color3uint8(Color3uint8),
    Vector2(Vector2),
    Vector2int16(Vector2int16),
    Vector3(Vector3),
    Vector3int16(Vector3int16),
    CFrame(CFrame),
    NumberSequence(NumberSequence),
    ColorSequence(ColorSequence),
    NumberRange(NumberRange),
    Rect(Rect),
    PhysicalProperties(PhysicalProperties),
    Ref(Ref),
    SharedString(SharedString),
}

impl Variant {
    /// Returns the `VariantType` tag for this value, without its payload.
    pub fn ty(&self) -> VariantType {
        match self {
            Variant::String(_) => VariantType::String,
            Variant::BinaryString(_) => VariantType::BinaryString,
            Variant::ProtectedString(_) => VariantType::ProtectedString,
            Variant::Content(_) => VariantType::Content,
            Variant::Bool(_) => VariantType::Bool,
            Variant::Int32(_) => VariantType::Int32,
            Variant::Int64(_) => VariantType::Int64,
            Variant::Float32(_) => VariantType::Float32,
            Variant::Float64(_) => VariantType::Float64,
            Variant::BrickColor(_) => VariantType::BrickColor,
            Variant::Enum(_) => VariantType::Enum,
            Variant::UDim(_) => VariantType::UDim,
            Variant::UDim2(_) => VariantType::UDim2,
            Variant::Ray(_) => VariantType::Ray,
            Variant::Faces(_) => VariantType::Faces,
            Variant::Axes(_) => VariantType::Axes,
            Variant::Color3(_) => VariantType::Color3,
            Variant::Color3uint8(_) => VariantType::Color3uint8,
            Variant::Vector2(_) => VariantType::Vector2,
            Variant::Vector2int16(_) => VariantType::Vector2int16,
            Variant::Vector3(_) => VariantType::Vector3,
            Variant::Vector3int16(_) => VariantType::Vector3int16,
            Variant::CFrame(_) => VariantType::CFrame,
            Variant::NumberSequence(_) => VariantType::NumberSequence,
            Variant::ColorSequence(_) => VariantType::ColorSequence,
            Variant::NumberRange(_) => VariantType::NumberRange,
            Variant::Rect(_) => VariantType::Rect,
            Variant::PhysicalProperties(_) => VariantType::PhysicalProperties,
            Variant::Ref(_) => VariantType::Ref,
            Variant::SharedString(_) => VariantType::SharedString,
        }
    }
}

macro_rules! from_impl {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for Variant {
            fn from(value: $ty) -> Self {
                Variant::$variant(value)
            }
        }
    };
}

from_impl!(String, String);
from_impl!(ProtectedString, ProtectedString);
from_impl!(Content, Content);
from_impl!(Bool, bool);
from_impl!(Int32, i32);
from_impl!(Int64, i64);
from_impl!(Float32, f32);
from_impl!(Float64, f64);
from_impl!(BrickColor, BrickColor);
from_impl!(Enum, Enum);
from_impl!(UDim, UDim);
from_impl!(UDim2, UDim2);
from_impl!(Ray, Ray);
from_impl!(Faces, Faces);
from_impl!(Axes, Axes);
from_impl!(Color3, Color3);
from_impl!(Color3uint8, Color3uint8);
from_impl!(Vector2, Vector2);
from_impl!(Vector2int16, Vector2int16);
from_impl!(Vector3, Vector3);
from_impl!(Vector3int16, Vector3int16);
from_impl!(CFrame, CFrame);
from_impl!(NumberSequence, NumberSequence);
from_impl!(ColorSequence, ColorSequence);
from_impl!(NumberRange, NumberRange);
from_impl!(Rect, Rect);
from_impl!(PhysicalProperties, PhysicalProperties);
from_impl!(Ref, Ref);
from_impl!(SharedString, SharedString);

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::String(value.to_owned())
    }
}

impl fmt::Display for Variant {
    /// A canonical rendering used only for diagnostics (error messages, log
    /// lines); it is not an encoding and does not round-trip.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::String(value) => write!(f, "{}", value),
            Variant::BinaryString(value) => write!(f, "<binary, {} bytes>", value.len()),
            Variant::ProtectedString(value) => write!(f, "{}", value.0),
            Variant::Content(Content(Some(value))) => write!(f, "{}", value),
            Variant::Content(Content(None)) => write!(f, ""),
            Variant::Bool(value) => write!(f, "{}", value),
            Variant::Int32(value) => write!(f, "{}", value),
            Variant::Int64(value) => write!(f, "{}", value),
            Variant::Float32(value) => write!(f, "{}", value),
            Variant::Float64(value) => write!(f, "{}", value),
            Variant::BrickColor(value) => write!(f, "{}", value),
            Variant::Enum(value) => write!(f, "{}", value.to_u32()),
            Variant::UDim(value) => write!(f, "{{{}, {}}}", value.scale, value.offset),
            Variant::UDim2(value) => write!(
                f,
                "{{{}, {}}}, {{{}, {}}}",
                value.x.scale, value.x.offset, value.y.scale, value.y.offset
            ),
            Variant::Ray(value) => write!(
                f,
                "origin: {:?}, direction: {:?}",
                value.origin, value.direction
            ),
            Variant::Faces(value) => write!(f, "{}", value),
            Variant::Axes(value) => write!(f, "{}", value),
            Variant::Color3(value) => write!(f, "{}, {}, {}", value.r, value.g, value.b),
            Variant::Color3uint8(value) => write!(f, "{}, {}, {}", value.r, value.g, value.b),
            Variant::Vector2(value) => write!(f, "{}, {}", value.x, value.y),
            Variant::Vector2int16(value) => write!(f, "{}, {}", value.x, value.y),
            Variant::Vector3(value) => write!(f, "{}, {}, {}", value.x, value.y, value.z),
            Variant::Vector3int16(value) => write!(f, "{}, {}, {}", value.x, value.y, value.z),
            Variant::CFrame(value) => write!(f, "{:?}", value.position),
            Variant::NumberSequence(value) => write!(f, "<NumberSequence, {} keypoints>", value.keypoints.len()),
            Variant::ColorSequence(value) => write!(f, "<ColorSequence, {} keypoints>", value.keypoints.len()),
            Variant::NumberRange(value) => write!(f, "{}, {}", value.min, value.max),
            Variant::Rect(value) => write!(f, "{:?}, {:?}", value.min, value.max),
            Variant::PhysicalProperties(value) => write!(f, "{:?}", value),
            // A bare `Ref` can't resolve the target's Name (it doesn't carry
            // a handle to the tree it came from); `WeakDom::display_value`
            // implements the full "<nil>" / target-Name rule from spec.md.
            Variant::Ref(value) if value.is_none() => write!(f, "<nil>"),
            Variant::Ref(value) => write!(f, "{}", value),
            Variant::SharedString(value) => write!(f, "<SharedString, {} bytes>", value.data().len()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ty_round_trips_through_from() {
        let value: Variant = 7i32.into();
        assert_eq!(value.ty(), VariantType::Int32);
    }

    #[test]
    fn clone_is_deep_for_owned_data() {
        let original = Variant::String("hello".to_owned());
        let mut cloned = original.clone();

        if let Variant::String(s) = &mut cloned {
            s.push_str(" world");
        }

        assert_eq!(original, Variant::String("hello".to_owned()));
    }

    #[test]
    fn reference_clone_keeps_same_handle() {
        let r = Ref::new();
        let original = Variant::Ref(r);
        let cloned = original.clone();

        assert_eq!(original, cloned);
        if let Variant::Ref(cloned_ref) = cloned {
            assert_eq!(cloned_ref, r);
        } else {
            panic!("expected Ref variant");
        }
    }
}
