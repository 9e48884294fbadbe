mod key;
mod value;

pub use key::*;
pub use value::*;

/// The record shape served by range scans: a raw key paired with its value.
pub type Record = (KeyBytes, ValueBytes);
