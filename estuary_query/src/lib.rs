mod cursor;
mod drive;
mod except;
mod intersect;
mod merge_sort;
pub mod query;

pub use cursor::{CursorState, OrderedCursor};
pub use drive::{KeyCmp, PassThrough, SelfKey};
pub use except::{except_of, except_of_by, except_pair, ExceptStream};
pub use intersect::{intersect_of, intersect_of_by, intersect_pair, IntersectStream};
pub use merge_sort::{union_all, union_of, union_of_by, MergeSortStream};
