/// The value of an enum-typed property (`Enum.Material`, `Enum.FormFactor`,
/// …), stored as its raw numeric id. Resolving this id to a name requires a
/// schema this crate doesn't carry; see spec.md's Non-goals.
///
/// Serialized as `Token` on the wire in both the binary and XML formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Enum(u32);

impl Enum {
    pub fn from_u32(value: u32) -> Self {
        Enum(value)
    }

    pub fn to_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for Enum {
    fn from(value: u32) -> Self {
        Enum::from_u32(value)
    }
}

impl From<Enum> for u32 {
    fn from(value: Enum) -> Self {
        value.to_u32()
    }
}
