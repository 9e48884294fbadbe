use crate::paged::{Page, RangeSource};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use estuary_types::range::{KeyRange, RangeOptions};
use estuary_types::types::{KeyBytes, Record, ValueBytes};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;


/// Hands out range scans that all observe one coherent view of the keyspace.
/// Opening the same range twice yields two independent scans over identical
/// data, so a query built on a provider can be enumerated repeatedly.
pub trait RangeProvider {
    type Scan: RangeSource;

    fn open_range(&self, range: &KeyRange, opts: &RangeOptions) -> Self::Scan;
}

/// An immutable, sorted, in-memory keyspace.
pub struct Snapshot {
    data: Arc<BTreeMap<KeyBytes, ValueBytes>>,
    fail_after: Option<usize>,
}

impl Snapshot {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<KeyBytes>,
        V: Into<ValueBytes>,
    {
        let data = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<BTreeMap<_, _>>();
        Self {
            data: Arc::new(data),
            fail_after: None,
        }
    }

    /// Like [`Snapshot::from_pairs`], but every scan opened on this snapshot
    /// fails once it has served `fail_after` records. For exercising fetch
    /// failure paths.
    pub fn from_pairs_failing_after<K, V>(
        pairs: impl IntoIterator<Item = (K, V)>,
        fail_after: usize,
    ) -> Self
    where
        K: Into<KeyBytes>,
        V: Into<ValueBytes>,
    {
        let mut snap = Self::from_pairs(pairs);
        snap.fail_after = Some(fail_after);
        snap
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}

impl RangeProvider for Snapshot {
    type Scan = SnapshotRangeScan;

    fn open_range(&self, range: &KeyRange, opts: &RangeOptions) -> SnapshotRangeScan {
        let next_lo = match range.lo.as_ref() {
            None => Bound::Unbounded,
            Some(lo) => Bound::Included(lo.clone()),
        };
        SnapshotRangeScan {
            data: Arc::clone(&self.data),
            next_lo,
            hi_excl: range.hi.clone(),
            page_size: opts.page_size.max(1),
            served: 0,
            fail_after: self.fail_after,
            finished: false,
        }
    }
}

/// One paged pass over a key range of a [`Snapshot`], ascending.
pub struct SnapshotRangeScan {
    data: Arc<BTreeMap<KeyBytes, ValueBytes>>,
    next_lo: Bound<KeyBytes>,
    hi_excl: Option<KeyBytes>,
    page_size: usize,
    served: usize,
    fail_after: Option<usize>,
    finished: bool,
}

#[async_trait]
impl RangeSource for SnapshotRangeScan {
    async fn next_page(&mut self) -> Result<Page<Record>> {
        if self.finished {
            return Ok(Page {
                records: vec![],
                more: false,
            });
        }

        let lo: Bound<&KeyBytes> = match &self.next_lo {
            Bound::Unbounded => Bound::Unbounded,
            Bound::Included(k) => Bound::Included(k),
            Bound::Excluded(k) => Bound::Excluded(k),
        };
        let hi: Bound<&KeyBytes> = match &self.hi_excl {
            None => Bound::Unbounded,
            Some(k) => Bound::Excluded(k),
        };

        let mut records: Vec<Record> = Vec::new();
        let mut more = false;
        for (k, v) in self.data.range::<KeyBytes, _>((lo, hi)) {
            if records.len() == self.page_size {
                more = true;
                break;
            }
            if let Some(n) = self.fail_after {
                if self.served + records.len() >= n {
                    return Err(anyhow!("Range scan aborted after {n} records."));
                }
            }
            records.push((k.clone(), v.clone()));
        }

        self.served += records.len();
        if let Some((last_k, _last_v)) = records.last() {
            self.next_lo = Bound::Excluded(last_k.clone());
        }
        self.finished = !more;

        Ok(Page { records, more })
    }
}
