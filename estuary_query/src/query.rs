//! Range-based entry points: run a set operation directly over key ranges
//! of a [`RangeProvider`], one fresh paged scan per range.
//!
//! Invoking an entry point again with the same arguments opens fresh scans,
//! so a query over a stable provider re-enumerates deterministically. The
//! optional result limit rides in on [`RangeOptions::limit`].

use crate::drive::{pass_through, KeyCmp, PassThrough};
use crate::except::ExceptStream;
use crate::intersect::IntersectStream;
use crate::merge_sort::MergeSortStream;
use anyhow::{anyhow, Result};
use estuary_range::{PagedRecords, RangeProvider};
use estuary_types::ordering;
use estuary_types::range::{KeyRange, RangeOptions};
use estuary_types::types::Record;
use itertools::Itertools;
use std::cmp::Ordering;


fn open_scans<Pvd>(
    provider: &Pvd,
    ranges: &[KeyRange],
    opts: &RangeOptions,
) -> Vec<PagedRecords<Pvd::Scan>>
where
    Pvd: RangeProvider,
{
    ranges
        .iter()
        .map(|range| PagedRecords::new(provider.open_range(range, opts)))
        .collect_vec()
}

/* Union (merge sort). */

/// All records of all `ranges`, merge-sorted by the projected key.
pub fn merge_sort_ranges<Pvd, K, P>(
    provider: &Pvd,
    ranges: &[KeyRange],
    opts: &RangeOptions,
    project: P,
) -> MergeSortStream<PagedRecords<Pvd::Scan>, K, Record, P, PassThrough<Record>, KeyCmp<K>>
where
    Pvd: RangeProvider,
    K: Ord,
    P: Fn(&Record) -> Result<K>,
{
    MergeSortStream::new(
        open_scans(provider, ranges, opts),
        project,
        pass_through,
        ordering::natural,
        opts.limit,
    )
}

/// Like [`merge_sort_ranges`], mapping each record through `select`.
pub fn merge_sort_ranges_with<Pvd, K, T, P, S>(
    provider: &Pvd,
    ranges: &[KeyRange],
    opts: &RangeOptions,
    project: P,
    select: S,
) -> MergeSortStream<PagedRecords<Pvd::Scan>, K, T, P, S, KeyCmp<K>>
where
    Pvd: RangeProvider,
    K: Ord,
    P: Fn(&Record) -> Result<K>,
    S: Fn(Record) -> Result<T>,
{
    MergeSortStream::new(
        open_scans(provider, ranges, opts),
        project,
        select,
        ordering::natural,
        opts.limit,
    )
}

/// Like [`merge_sort_ranges_with`], under a caller-supplied comparator.
pub fn merge_sort_ranges_by<Pvd, K, T, P, S, C>(
    provider: &Pvd,
    ranges: &[KeyRange],
    opts: &RangeOptions,
    project: P,
    select: S,
    compare: C,
) -> MergeSortStream<PagedRecords<Pvd::Scan>, K, T, P, S, C>
where
    Pvd: RangeProvider,
    P: Fn(&Record) -> Result<K>,
    S: Fn(Record) -> Result<T>,
    C: Fn(&K, &K) -> Ordering,
{
    MergeSortStream::new(
        open_scans(provider, ranges, opts),
        project,
        select,
        compare,
        opts.limit,
    )
}

/* Intersect. */

/// Records whose projected key occurs in every one of `ranges`; the emitted
/// record comes from the first range.
pub fn intersect_ranges<Pvd, K, P>(
    provider: &Pvd,
    ranges: &[KeyRange],
    opts: &RangeOptions,
    project: P,
) -> IntersectStream<PagedRecords<Pvd::Scan>, K, Record, P, PassThrough<Record>, KeyCmp<K>>
where
    Pvd: RangeProvider,
    K: Clone + Ord,
    P: Fn(&Record) -> Result<K>,
{
    IntersectStream::new(
        open_scans(provider, ranges, opts),
        project,
        pass_through,
        ordering::natural,
        opts.limit,
    )
}

/// Like [`intersect_ranges`], mapping each matched record through `select`.
pub fn intersect_ranges_with<Pvd, K, T, P, S>(
    provider: &Pvd,
    ranges: &[KeyRange],
    opts: &RangeOptions,
    project: P,
    select: S,
) -> IntersectStream<PagedRecords<Pvd::Scan>, K, T, P, S, KeyCmp<K>>
where
    Pvd: RangeProvider,
    K: Clone + Ord,
    P: Fn(&Record) -> Result<K>,
    S: Fn(Record) -> Result<T>,
{
    IntersectStream::new(
        open_scans(provider, ranges, opts),
        project,
        select,
        ordering::natural,
        opts.limit,
    )
}

/// Like [`intersect_ranges_with`], under a caller-supplied comparator.
pub fn intersect_ranges_by<Pvd, K, T, P, S, C>(
    provider: &Pvd,
    ranges: &[KeyRange],
    opts: &RangeOptions,
    project: P,
    select: S,
    compare: C,
) -> IntersectStream<PagedRecords<Pvd::Scan>, K, T, P, S, C>
where
    Pvd: RangeProvider,
    K: Clone,
    P: Fn(&Record) -> Result<K>,
    S: Fn(Record) -> Result<T>,
    C: Fn(&K, &K) -> Ordering,
{
    IntersectStream::new(
        open_scans(provider, ranges, opts),
        project,
        select,
        compare,
        opts.limit,
    )
}

/* Except. */

/// Records of the first range whose projected key occurs in none of the
/// remaining ranges. At least one range (the primary) is required; the
/// check happens before anything is fetched.
pub fn except_ranges<Pvd, K, P>(
    provider: &Pvd,
    ranges: &[KeyRange],
    opts: &RangeOptions,
    project: P,
) -> Result<ExceptStream<PagedRecords<Pvd::Scan>, K, Record, P, PassThrough<Record>, KeyCmp<K>>>
where
    Pvd: RangeProvider,
    K: Clone + Ord,
    P: Fn(&Record) -> Result<K>,
{
    let mut scans = open_primary_and_rest(provider, ranges, opts)?;
    let first = scans.remove(0);
    Ok(ExceptStream::new(
        first,
        scans,
        project,
        pass_through,
        ordering::natural,
        opts.limit,
    ))
}

/// Like [`except_ranges`], mapping each kept record through `select`.
pub fn except_ranges_with<Pvd, K, T, P, S>(
    provider: &Pvd,
    ranges: &[KeyRange],
    opts: &RangeOptions,
    project: P,
    select: S,
) -> Result<ExceptStream<PagedRecords<Pvd::Scan>, K, T, P, S, KeyCmp<K>>>
where
    Pvd: RangeProvider,
    K: Clone + Ord,
    P: Fn(&Record) -> Result<K>,
    S: Fn(Record) -> Result<T>,
{
    let mut scans = open_primary_and_rest(provider, ranges, opts)?;
    let first = scans.remove(0);
    Ok(ExceptStream::new(
        first,
        scans,
        project,
        select,
        ordering::natural,
        opts.limit,
    ))
}

/// Like [`except_ranges_with`], under a caller-supplied comparator.
pub fn except_ranges_by<Pvd, K, T, P, S, C>(
    provider: &Pvd,
    ranges: &[KeyRange],
    opts: &RangeOptions,
    project: P,
    select: S,
    compare: C,
) -> Result<ExceptStream<PagedRecords<Pvd::Scan>, K, T, P, S, C>>
where
    Pvd: RangeProvider,
    K: Clone,
    P: Fn(&Record) -> Result<K>,
    S: Fn(Record) -> Result<T>,
    C: Fn(&K, &K) -> Ordering,
{
    let mut scans = open_primary_and_rest(provider, ranges, opts)?;
    let first = scans.remove(0);
    Ok(ExceptStream::new(
        first, scans, project, select, compare, opts.limit,
    ))
}

fn open_primary_and_rest<Pvd>(
    provider: &Pvd,
    ranges: &[KeyRange],
    opts: &RangeOptions,
) -> Result<Vec<PagedRecords<Pvd::Scan>>>
where
    Pvd: RangeProvider,
{
    if ranges.is_empty() {
        return Err(anyhow!(
            "Except requires at least one range: the first is the primary."
        ));
    }
    Ok(open_scans(provider, ranges, opts))
}
