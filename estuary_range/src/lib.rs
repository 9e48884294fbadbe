mod paged;
mod snapshot;
mod stream;

pub use paged::*;
pub use snapshot::*;
pub use stream::*;
