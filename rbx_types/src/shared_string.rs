use std::{fmt, sync::Arc};

use blake2::{
    digest::{consts::U32, Digest},
    Blake2b,
};

type Blake2b256 = Blake2b<U32>;

/// A 16-byte content hash used to deduplicate `SharedString`s inside a single
/// document. Both the binary `SSTR` chunk and the XML `<SharedStrings>` table
/// key their entries by this hash.
///
/// Computed as the first 16 bytes of a BLAKE2b-256 hash of the payload.
/// (Upstream history: the binary format's hash moved from MD5 to this 16-byte
/// BLAKE digest; this crate always writes and expects the newer form. See
/// DESIGN.md.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SharedStringHash([u8; 16]);

impl SharedStringHash {
    pub fn new(data: &[u8]) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(data);
        let digest = hasher.finalize();

        let mut bytes = [0; 16];
        bytes.copy_from_slice(&digest[..16]);
        SharedStringHash(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for SharedStringHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// A byte buffer deduplicated by content hash in the binary and XML formats.
/// Cheaply `Clone`-able: the payload is reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedString {
    data: Arc<Vec<u8>>,
}

impl SharedString {
    pub fn new(data: Vec<u8>) -> Self {
        SharedString {
            data: Arc::new(data),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn hash(&self) -> SharedStringHash {
        SharedStringHash::new(&self.data)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn same_content_same_hash() {
        let a = SharedString::new(b"xyzzy".to_vec());
        let b = SharedString::new(b"xyzzy".to_vec());
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn different_content_different_hash() {
        let a = SharedString::new(b"xyzzy".to_vec());
        let b = SharedString::new(b"plugh".to_vec());
        assert_ne!(a.hash(), b.hash());
    }
}
