/// An arbitrary byte buffer. Used for binary property values that aren't
/// necessarily valid UTF-8, like `BinaryString`.
pub type BinaryString = Vec<u8>;

/// A property value that's textual but permitted to contain script source,
/// stored distinctly from `String` only because Roblox's formats do.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProtectedString(pub String);

impl From<String> for ProtectedString {
    fn from(value: String) -> Self {
        ProtectedString(value)
    }
}

/// A `Content` value, distinguishing "no content" (`None`) from "content that
/// happens to be the empty string" (`Some(String::new())`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Content(pub Option<String>);

impl Content {
    pub fn none() -> Self {
        Content(None)
    }

    pub fn from_uri<S: Into<String>>(uri: S) -> Self {
        Content(Some(uri.into()))
    }
}
