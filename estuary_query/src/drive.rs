use anyhow::Result;
use std::cmp::Ordering;

/// Engine lifecycle, shared by the three set-operation streams.
///
/// `Completed` and `Faulted` both drop every cursor, releasing the
/// underlying sources promptly. `Faulted` is entered when any cursor fetch,
/// key projection, or result selection fails; the error is returned once,
/// after which the stream reports end-of-data.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum DriveState {
    NotStarted,
    Running,
    Completed,
    Faulted,
}

/// The comparator type engines store when none is supplied.
pub type KeyCmp<K> = fn(&K, &K) -> Ordering;

/// The result selector of entry points that emit the matched record itself.
pub type PassThrough<T> = fn(T) -> Result<T>;

/// The projection of entry points that key each record by its own value.
pub type SelfKey<T> = fn(&T) -> Result<T>;

pub(crate) fn pass_through<T>(item: T) -> Result<T> {
    Ok(item)
}

pub(crate) fn self_key<T>(item: &T) -> Result<T>
where
    T: Clone,
{
    Ok(item.clone())
}
