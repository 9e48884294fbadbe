use crate::cursor::OrderedCursor;
use crate::drive::{pass_through, DriveState, KeyCmp, PassThrough};
use anyhow::Result;
use async_trait::async_trait;
use estuary_range::SortedStream;
use estuary_types::ordering;
use std::cmp::Ordering;
use std::marker::PhantomData;


/// Sorted difference: the first (primary) stream minus the rest. A primary
/// record is emitted unless some subtrahend cursor currently stands on the
/// same key. Subtrahends catch up past keys smaller than the primary's; a
/// suppressing subtrahend is left in place, so it also suppresses any
/// following primary records with that same key.
///
/// Subtrahend exhaustion is not terminal: an exhausted subtrahend merely
/// stops suppressing. The stream completes when the primary is exhausted.
pub struct ExceptStream<St, K, T, P, S, C>
where
    St: SortedStream,
{
    /// Index 0 is the primary; the rest are subtrahends.
    cursors: Vec<OrderedCursor<St, K>>,
    project: P,
    select: S,
    compare: C,
    remaining: Option<usize>,
    state: DriveState,
    advance_primary_pending: bool,
    _phant: PhantomData<T>,
}

impl<St, K, T, P, S, C> ExceptStream<St, K, T, P, S, C>
where
    St: SortedStream,
    K: Clone,
    P: Fn(&St::Item) -> Result<K>,
    S: Fn(St::Item) -> Result<T>,
    C: Fn(&K, &K) -> Ordering,
{
    pub fn new(
        first: St,
        subtrahends: Vec<St>,
        project: P,
        select: S,
        compare: C,
        limit: Option<usize>,
    ) -> Self {
        let mut sources = vec![first];
        sources.extend(subtrahends);
        Self {
            cursors: sources.into_iter().map(OrderedCursor::new).collect(),
            project,
            select,
            compare,
            remaining: limit,
            state: DriveState::NotStarted,
            advance_primary_pending: false,
            _phant: PhantomData,
        }
    }

    /// Pulls the next unsuppressed primary record. `Ok(None)` is
    /// end-of-data; an `Err` terminates the stream, and subsequent pulls
    /// report end-of-data.
    pub async fn try_next(&mut self) -> Result<Option<T>> {
        match self.state {
            DriveState::Completed | DriveState::Faulted => return Ok(None),
            DriveState::NotStarted => {
                if self.remaining == Some(0) {
                    self.complete();
                    return Ok(None);
                }
                // The primary first: if it is empty, the subtrahends are
                // never fetched at all.
                match self.cursors[0].advance(&self.project).await {
                    Err(e) => {
                        self.fault();
                        return Err(e);
                    }
                    Ok(false) => {
                        self.complete();
                        return Ok(None);
                    }
                    Ok(true) => {}
                }
                for i in 1..self.cursors.len() {
                    if let Err(e) = self.cursors[i].advance(&self.project).await {
                        self.fault();
                        return Err(e);
                    }
                }
                self.state = DriveState::Running;
            }
            DriveState::Running => {
                if self.advance_primary_pending {
                    self.advance_primary_pending = false;
                    match self.cursors[0].advance(&self.project).await {
                        Err(e) => {
                            self.fault();
                            return Err(e);
                        }
                        Ok(false) => {
                            self.complete();
                            return Ok(None);
                        }
                        Ok(true) => {}
                    }
                }
            }
        }

        loop {
            let key_p: K = match self.cursors[0].key() {
                Some(k) => k.clone(),
                None => {
                    self.complete();
                    return Ok(None);
                }
            };

            let mut suppressed = false;
            for i in 1..self.cursors.len() {
                loop {
                    let ord = match self.cursors[i].key() {
                        // An exhausted subtrahend can no longer suppress.
                        None => break,
                        Some(key) => (self.compare)(key, &key_p),
                    };
                    match ord {
                        Ordering::Less => {
                            if let Err(e) = self.cursors[i].advance(&self.project).await {
                                self.fault();
                                return Err(e);
                            }
                        }
                        Ordering::Equal => {
                            suppressed = true;
                            break;
                        }
                        Ordering::Greater => break,
                    }
                }
                if suppressed {
                    break;
                }
            }

            if suppressed {
                match self.cursors[0].advance(&self.project).await {
                    Err(e) => {
                        self.fault();
                        return Err(e);
                    }
                    Ok(false) => {
                        self.complete();
                        return Ok(None);
                    }
                    Ok(true) => continue,
                }
            }

            let rec = match self.cursors[0].take_record() {
                None => {
                    self.complete();
                    return Ok(None);
                }
                Some(rec) => rec,
            };
            self.advance_primary_pending = true;

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

            return Ok(Some(out));
        }
    }

    pub async fn try_collect(mut self) -> Result<Vec<T>> {
        let mut out = vec![];
        while let Some(item) = self.try_next().await? {
            out.push(item);
        }
        Ok(out)
    }

    fn complete(&mut self) {
        self.cursors.clear();
        self.advance_primary_pending = false;
        self.state = DriveState::Completed;
    }

    fn fault(&mut self) {
        self.cursors.clear();
        self.advance_primary_pending = false;
        self.state = DriveState::Faulted;
    }
}

#[async_trait]
impl<St, K, T, P, S, C> SortedStream for ExceptStream<St, K, T, P, S, C>
where
    St: SortedStream,
    St::Item: Send,
    K: Clone + Send,
    T: Send,
    P: Fn(&St::Item) -> Result<K> + Send + Sync,
    S: Fn(St::Item) -> Result<T> + Send + Sync,
    C: Fn(&K, &K) -> Ordering + Send + Sync,
{
    type Item = T;

    async fn try_next(&mut self) -> Result<Option<T>> {
        ExceptStream::try_next(self).await
    }
}

/// `first` minus all `subtrahends`, keyed by `project`, natural key order.
/// Zero subtrahends pass `first` through unchanged.
pub fn except_of<St, K, P>(
    first: St,
    subtrahends: Vec<St>,
    project: P,
) -> ExceptStream<St, K, St::Item, P, PassThrough<St::Item>, KeyCmp<K>>
where
    St: SortedStream,
    K: Clone + Ord,
    P: Fn(&St::Item) -> Result<K>,
{
    ExceptStream::new(
        first,
        subtrahends,
        project,
        pass_through,
        ordering::natural,
        None,
    )
}

/// `first` minus `second`.
pub fn except_pair<St, K, P>(
    first: St,
    second: St,
    project: P,
) -> ExceptStream<St, K, St::Item, P, PassThrough<St::Item>, KeyCmp<K>>
where
    St: SortedStream,
    K: Clone + Ord,
    P: Fn(&St::Item) -> Result<K>,
{
    except_of(first, vec![second], project)
}

/// Fully-general difference: custom result selector and comparator.
pub fn except_of_by<St, K, T, P, S, C>(
    first: St,
    subtrahends: Vec<St>,
    project: P,
    select: S,
    compare: C,
) -> ExceptStream<St, K, T, P, S, C>
where
    St: SortedStream,
    K: Clone,
    P: Fn(&St::Item) -> Result<K>,
    S: Fn(St::Item) -> Result<T>,
    C: Fn(&K, &K) -> Ordering,
{
    ExceptStream::new(first, subtrahends, project, select, compare, None)
}
