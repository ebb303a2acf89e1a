//! Types used to represent the values of Roblox instance properties.
//!
//! This crate has no notion of an instance tree; see `rbx_dom_weak` for
//! that. It exists on its own so that codecs, tree types, and tooling can
//! share one definition of what a Roblox property value looks like.

mod basic_types;
mod cframe;
mod enum_value;
mod refs;
mod sequence;
mod shared_string;
mod strings;
mod variant;

pub use basic_types::{
    Axes, BrickColor, Color3, Color3uint8, Faces, NumberRange, PhysicalProperties, Ray, Rect,
    UDim, UDim2, Vector2, Vector2int16, Vector3, Vector3int16,
};
pub use cframe::{CFrame, Matrix3};
pub use enum_value::Enum;
pub use refs::Ref;
pub use sequence::{ColorSequence, ColorSequenceKeypoint, NumberSequence, NumberSequenceKeypoint};
pub use shared_string::{SharedString, SharedStringHash};
pub use strings::{BinaryString, Content, ProtectedString};
pub use variant::{Variant, VariantType};
