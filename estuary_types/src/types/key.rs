use derive_more::{Deref, From};
use std::borrow::Borrow;

/// A raw binary key, ordered the way the backing store orders keys:
/// lexicographically over unsigned bytes.
///
/// The derived `Ord` on `Vec<u8>` is exactly that ordering.
#[derive(From, Deref, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct KeyBytes(pub Vec<u8>);

impl KeyBytes {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl From<&[u8]> for KeyBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}
impl From<&str> for KeyBytes {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl Borrow<[u8]> for KeyBytes {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

/* KeyBytes is comparable against raw byte slices. */
impl PartialEq<[u8]> for KeyBytes {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_slice().eq(other)
    }
}
impl PartialEq<&[u8]> for KeyBytes {
    fn eq(&self, other: &&[u8]) -> bool {
        self.as_slice().eq(*other)
    }
}
