use crate::types::KeyBytes;
use std::cmp::Ordering;

mod test;

/// Comparators are plain `Fn(&K, &K) -> Ordering` values. Every source fed
/// to one query must be pre-sorted consistently with the comparator that
/// query uses; the engines do not verify this.
///
/// The named functions below cover the common cases; a custom closure slots
/// into any `*_by` entry point.

/// The type's own `Ord`.
pub fn natural<K: Ord>(a: &K, b: &K) -> Ordering {
    a.cmp(b)
}

/// Lexicographic unsigned-byte order over raw keys. This is the order the
/// backing store sorts by, and it coincides with [`natural`] on
/// [`KeyBytes`]; it exists as the explicitly-named anchor for callers
/// passing a comparator by name.
pub fn by_unsigned_bytes(a: &KeyBytes, b: &KeyBytes) -> Ordering {
    a.as_slice().cmp(b.as_slice())
}
