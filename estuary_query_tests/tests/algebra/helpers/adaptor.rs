use anyhow::{anyhow, Result};
use async_trait::async_trait;
use estuary_query::query;
use estuary_query::{except_of, intersect_of, union_of};
use estuary_range::{Snapshot, VecStream};
use estuary_types::range::{KeyRange, RangeOptions};
use estuary_types::types::{KeyBytes, Record, ValueBytes};

/// Adaptor for the two ways of feeding the set operations: pre-built sorted
/// streams, and key ranges scanned off a snapshot. The same scenarios run
/// through both and must produce identical results.
///
/// Source fixtures must not contain duplicate keys within one source (the
/// snapshot side stores each source as a map); cross-source duplicates are
/// fine. Fixture keys must not contain `/`.
#[async_trait]
pub trait SetQueryAdaptor {
    async fn union(&self, sources: Vec<Vec<Record>>) -> Result<Vec<Record>>;

    async fn intersect(&self, sources: Vec<Vec<Record>>) -> Result<Vec<Record>>;

    async fn except(&self, first: Vec<Record>, rest: Vec<Vec<Record>>) -> Result<Vec<Record>>;
}

fn whole_key(rec: &Record) -> Result<KeyBytes> {
    Ok(rec.0.clone())
}

pub struct StreamQueryAdaptor;

#[async_trait]
impl SetQueryAdaptor for StreamQueryAdaptor {
    async fn union(&self, sources: Vec<Vec<Record>>) -> Result<Vec<Record>> {
        let sources = sources
            .into_iter()
            .map(VecStream::from_values)
            .collect::<Vec<_>>();
        union_of(sources, whole_key).try_collect().await
    }

    async fn intersect(&self, sources: Vec<Vec<Record>>) -> Result<Vec<Record>> {
        let sources = sources
            .into_iter()
            .map(VecStream::from_values)
            .collect::<Vec<_>>();
        intersect_of(sources, whole_key).try_collect().await
    }

    async fn except(&self, first: Vec<Record>, rest: Vec<Vec<Record>>) -> Result<Vec<Record>> {
        let rest = rest
            .into_iter()
            .map(VecStream::from_values)
            .collect::<Vec<_>>();
        except_of(VecStream::from_values(first), rest, whole_key)
            .try_collect()
            .await
    }
}

/// Lays each source under its own prefix of one snapshot, then queries one
/// range per source, projecting the original key back out from behind the
/// prefix and un-prefixing the emitted records.
pub struct RangeQueryAdaptor {
    pub page_size: usize,
}

impl RangeQueryAdaptor {
    fn load(&self, sources: &[Vec<Record>]) -> (Snapshot, Vec<KeyRange>, RangeOptions) {
        let mut pairs: Vec<(KeyBytes, ValueBytes)> = vec![];
        for (i, records) in sources.iter().enumerate() {
            for (k, v) in records {
                pairs.push((prefixed(i, k), v.clone()));
            }
        }

        let snap = Snapshot::from_pairs(pairs);
        let ranges = (0..sources.len())
            .map(|i| KeyRange::starts_with(format!("{i:02}/").as_bytes()).unwrap())
            .collect();
        let opts = RangeOptions {
            page_size: self.page_size,
            limit: None,
        };
        (snap, ranges, opts)
    }
}

#[async_trait]
impl SetQueryAdaptor for RangeQueryAdaptor {
    async fn union(&self, sources: Vec<Vec<Record>>) -> Result<Vec<Record>> {
        let (snap, ranges, opts) = self.load(&sources);
        query::merge_sort_ranges_with(&snap, &ranges, &opts, suffix_key, unprefixed)
            .try_collect()
            .await
    }

    async fn intersect(&self, sources: Vec<Vec<Record>>) -> Result<Vec<Record>> {
        let (snap, ranges, opts) = self.load(&sources);
        query::intersect_ranges_with(&snap, &ranges, &opts, suffix_key, unprefixed)
            .try_collect()
            .await
    }

    async fn except(&self, first: Vec<Record>, rest: Vec<Vec<Record>>) -> Result<Vec<Record>> {
        let mut sources = vec![first];
        sources.extend(rest);

        let (snap, ranges, opts) = self.load(&sources);
        query::except_ranges_with(&snap, &ranges, &opts, suffix_key, unprefixed)?
            .try_collect()
            .await
    }
}

fn prefixed(i: usize, k: &KeyBytes) -> KeyBytes {
    let mut out = format!("{i:02}/").into_bytes();
    out.extend_from_slice(k.as_slice());
    KeyBytes::from(out)
}

fn slash_pos(k: &KeyBytes) -> Result<usize> {
    k.as_slice()
        .iter()
        .position(|b| *b == b'/')
        .ok_or_else(|| anyhow!("Key {k:?} has no prefix separator."))
}

fn suffix_key(rec: &Record) -> Result<KeyBytes> {
    let (k, _v) = rec;
    let pos = slash_pos(k)?;
    Ok(KeyBytes::from(&k.as_slice()[pos + 1..]))
}

fn unprefixed(rec: Record) -> Result<Record> {
    let (k, v) = rec;
    let pos = slash_pos(&k)?;
    Ok((KeyBytes::from(&k.as_slice()[pos + 1..]), v))
}
