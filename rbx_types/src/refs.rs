use std::fmt;

use rand::Rng;

/// A stable, randomly-generated handle identifying an instance within a
/// `WeakDom`. Doubles as the "referent" that the binary and XML formats
/// serialize cross-instance pointers as.
///
/// A `Ref` is small and `Copy`; it does not own anything and stays valid only
/// as long as the `WeakDom` (or the in-flight decode) that minted it is
/// alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ref(Option<u128>);

impl Ref {
    /// Constructs a new, unique `Ref`.
    pub fn new() -> Self {
        // Set the version (4) and variant bits the way a real UUIDv4 would,
        // so that the textual rendering in `to_string` looks exactly like
        // Roblox's own generated referents.
        let mut bytes = rand::thread_rng().gen::<[u8; 16]>();
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;

        Ref(Some(u128::from_be_bytes(bytes)))
    }

    /// A `Ref` that points to nothing. Used to represent a null `Reference`
    /// value and an instance with no parent.
    pub fn none() -> Self {
        Ref(None)
    }

    pub fn is_some(self) -> bool {
        self.0.is_some()
    }

    pub fn is_none(self) -> bool {
        self.0.is_none()
    }
}

impl Default for Ref {
    fn default() -> Self {
        Ref::none()
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "RBX{:032X}", value),
            None => write!(f, "<null>"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unique() {
        assert_ne!(Ref::new(), Ref::new());
    }

    #[test]
    fn none_is_falsy() {
        let none = Ref::none();
        assert!(none.is_none());
        assert!(!none.is_some());
    }

    #[test]
    fn display_format() {
        let referent = Ref::new();
        let text = referent.to_string();
        assert_eq!(text.len(), 35);
        assert!(text.starts_with("RBX"));
    }
}
