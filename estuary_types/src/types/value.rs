use derive_more::{Deref, From};

/// A raw binary value. Values carry no ordering obligations; any ordering a
/// query needs is derived from keys or from a caller-supplied projection.
#[derive(From, Deref, Clone, PartialEq, Eq, Debug)]
pub struct ValueBytes(pub Vec<u8>);

impl ValueBytes {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl From<&[u8]> for ValueBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}
impl From<&str> for ValueBytes {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}
