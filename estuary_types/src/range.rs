use crate::types::KeyBytes;
use anyhow::{anyhow, Result};


pub const DEFAULT_PAGE_SIZE: usize = 256;

/// A contiguous span of keys: begin-inclusive, end-exclusive.
/// `None` on either side leaves that side unbounded.
#[derive(Clone, Debug)]
pub struct KeyRange {
    pub lo: Option<KeyBytes>,
    pub hi: Option<KeyBytes>,
}

impl KeyRange {
    pub fn new(lo: Option<KeyBytes>, hi: Option<KeyBytes>) -> Self {
        Self { lo, hi }
    }

    pub fn all() -> Self {
        Self { lo: None, hi: None }
    }

    /// The range of every key that begins with `prefix`:
    /// `[prefix, strinc(prefix))`.
    pub fn starts_with(prefix: &[u8]) -> Result<Self> {
        let hi = strinc(prefix)?;
        Ok(Self {
            lo: Some(KeyBytes::from(prefix)),
            hi: Some(KeyBytes::from(hi)),
        })
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        let above_lo = match self.lo.as_ref() {
            None => true,
            Some(lo) => key >= lo.as_slice(),
        };
        let below_hi = match self.hi.as_ref() {
            None => true,
            Some(hi) => key < hi.as_slice(),
        };
        above_lo && below_hi
    }
}

/// The smallest key strictly greater than every key prefixed by `prefix`:
/// trailing `0xFF` bytes are dropped, then the last remaining byte is
/// incremented. A prefix of all `0xFF` bytes (or an empty prefix) has no
/// such key.
pub fn strinc(prefix: &[u8]) -> Result<Vec<u8>> {
    let trimmed_len = prefix
        .iter()
        .rposition(|b| *b != 0xFF)
        .map(|pos| pos + 1)
        .unwrap_or(0);
    if trimmed_len == 0 {
        return Err(anyhow!(
            "Key prefix {prefix:?} has no strictly-greater sibling."
        ));
    }

    let mut out = prefix[..trimmed_len].to_vec();
    out[trimmed_len - 1] += 1;
    Ok(out)
}

/// Per-scan knobs threaded from a query entry point down to its range scans.
///
/// `limit` caps the number of records the *query* emits, not the number any
/// single scan serves.
#[derive(Clone, Debug)]
pub struct RangeOptions {
    pub page_size: usize,
    pub limit: Option<usize>,
}

impl Default for RangeOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            limit: None,
        }
    }
}
