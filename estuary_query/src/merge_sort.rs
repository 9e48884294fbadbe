use crate::cursor::OrderedCursor;
use crate::drive::{pass_through, self_key, DriveState, KeyCmp, PassThrough, SelfKey};
use anyhow::Result;
use async_trait::async_trait;
use estuary_range::SortedStream;
use estuary_types::ordering;
use std::cmp::Ordering;
use std::marker::PhantomData;


/// K-way sorted union. Every pull emits the record of the first input
/// cursor holding the overall-minimum key, then advances only that cursor,
/// so records with equal keys across sources are all emitted, ordered by
/// input-list position. Nothing is deduplicated.
///
/// The cursor that produced the previous record is advanced at the start of
/// the next pull, so a fetch failure never retracts a record already handed
/// to the caller.
pub struct MergeSortStream<St, K, T, P, S, C>
where
    St: SortedStream,
{
    cursors: Vec<OrderedCursor<St, K>>,
    project: P,
    select: S,
    compare: C,
    remaining: Option<usize>,
    state: DriveState,
    pending_advance: Option<usize>,
    _phant: PhantomData<T>,
}

impl<St, K, T, P, S, C> MergeSortStream<St, K, T, P, S, C>
where
    St: SortedStream,
    P: Fn(&St::Item) -> Result<K>,
    S: Fn(St::Item) -> Result<T>,
    C: Fn(&K, &K) -> Ordering,
{
    pub fn new(sources: Vec<St>, project: P, select: S, compare: C, limit: Option<usize>) -> Self {
        Self {
            cursors: sources.into_iter().map(OrderedCursor::new).collect(),
            project,
            select,
            compare,
            remaining: limit,
            state: DriveState::NotStarted,
            pending_advance: None,
            _phant: PhantomData,
        }
    }

    /// Pulls the next record in key order. `Ok(None)` is end-of-data; an
    /// `Err` terminates the stream, and subsequent pulls report end-of-data.
    pub async fn try_next(&mut self) -> Result<Option<T>> {
        match self.state {
            DriveState::Completed | DriveState::Faulted => return Ok(None),
            DriveState::NotStarted => {
                if self.remaining == Some(0) {
                    self.complete();
                    return Ok(None);
                }
                for i in 0..self.cursors.len() {
                    if let Err(e) = self.cursors[i].advance(&self.project).await {
                        self.fault();
                        return Err(e);
                    }
                }
                self.state = DriveState::Running;
            }
            DriveState::Running => {
                if let Some(i) = self.pending_advance.take() {
                    if let Err(e) = self.cursors[i].advance(&self.project).await {
                        self.fault();
                        return Err(e);
                    }
                }
            }
        }

        let min_i = match self.find_min() {
            None => {
                self.complete();
                return Ok(None);
            }
            Some(i) => i,
        };

        let rec = match self.cursors[min_i].take_record() {
            None => {
                self.complete();
                return Ok(None);
            }
            Some(rec) => rec,
        };
        self.pending_advance = Some(min_i);

        let out = match (self.select)(rec) {
            Err(e) => {
                self.fault();
                return Err(e);
            }
            Ok(out) => out,
        };

        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
            if *remaining == 0 {
                self.complete();
            }
        }

        Ok(Some(out))
    }

    pub async fn try_collect(mut self) -> Result<Vec<T>> {
        let mut out = vec![];
        while let Some(item) = self.try_next().await? {
            out.push(item);
        }
        Ok(out)
    }

    /// The first cursor holding the overall-minimum key. Strict `Less` keeps
    /// the earliest input on ties.
    fn find_min(&self) -> Option<usize> {
        let mut min: Option<(usize, &K)> = None;
        for (i, cursor) in self.cursors.iter().enumerate() {
            if let Some((_rec, key)) = cursor.current() {
                let is_new_min = match min {
                    None => true,
                    Some((_min_i, min_key)) => (self.compare)(key, min_key) == Ordering::Less,
                };
                if is_new_min {
                    min = Some((i, key));
                }
            }
        }
        min.map(|(i, _key)| i)
    }

    fn complete(&mut self) {
        self.cursors.clear();
        self.pending_advance = None;
        self.state = DriveState::Completed;
    }

    fn fault(&mut self) {
        self.cursors.clear();
        self.pending_advance = None;
        self.state = DriveState::Faulted;
    }
}

#[async_trait]
impl<St, K, T, P, S, C> SortedStream for MergeSortStream<St, K, T, P, S, C>
where
    St: SortedStream,
    St::Item: Send,
    K: Send,
    T: Send,
    P: Fn(&St::Item) -> Result<K> + Send + Sync,
    S: Fn(St::Item) -> Result<T> + Send + Sync,
    C: Fn(&K, &K) -> Ordering + Send + Sync,
{
    type Item = T;

    async fn try_next(&mut self) -> Result<Option<T>> {
        MergeSortStream::try_next(self).await
    }
}

/// Union over pre-built sorted streams, keyed by `project`, natural key
/// order. Zero sources make an empty stream; one source passes through.
pub fn union_of<St, K, P>(
    sources: Vec<St>,
    project: P,
) -> MergeSortStream<St, K, St::Item, P, PassThrough<St::Item>, KeyCmp<K>>
where
    St: SortedStream,
    K: Ord,
    P: Fn(&St::Item) -> Result<K>,
{
    MergeSortStream::new(sources, project, pass_through, ordering::natural, None)
}

/// Union over pre-built sorted streams whose items are their own keys.
pub fn union_all<St>(
    sources: Vec<St>,
) -> MergeSortStream<St, St::Item, St::Item, SelfKey<St::Item>, PassThrough<St::Item>, KeyCmp<St::Item>>
where
    St: SortedStream,
    St::Item: Ord + Clone,
{
    MergeSortStream::new(sources, self_key, pass_through, ordering::natural, None)
}

/// Fully-general union: custom result selector and comparator.
pub fn union_of_by<St, K, T, P, S, C>(
    sources: Vec<St>,
    project: P,
    select: S,
    compare: C,
) -> MergeSortStream<St, K, T, P, S, C>
where
    St: SortedStream,
    P: Fn(&St::Item) -> Result<K>,
    S: Fn(St::Item) -> Result<T>,
    C: Fn(&K, &K) -> Ordering,
{
    MergeSortStream::new(sources, project, select, compare, None)
}
