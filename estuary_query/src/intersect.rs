use crate::cursor::OrderedCursor;
use crate::drive::{pass_through, DriveState, KeyCmp, PassThrough};
use anyhow::Result;
use async_trait::async_trait;
use estuary_range::SortedStream;
use estuary_types::ordering;
use std::cmp::Ordering;
use std::marker::PhantomData;


/// N-way sorted intersection. A key is emitted only when every cursor
/// simultaneously stands on it; the emitted record is the primary (first)
/// cursor's, after which ALL cursors advance. Laggards catch up to the
/// current maximum key instead of stepping records one comparison at a time.
///
/// Exhaustion of any cursor completes the stream: an exhausted source can
/// contribute no further agreement.
pub struct IntersectStream<St, K, T, P, S, C>
where
    St: SortedStream,
{
    cursors: Vec<OrderedCursor<St, K>>,
    project: P,
    select: S,
    compare: C,
    remaining: Option<usize>,
    state: DriveState,
    advance_all_pending: bool,
    _phant: PhantomData<T>,
}

impl<St, K, T, P, S, C> IntersectStream<St, K, T, P, S, C>
where
    St: SortedStream,
    K: Clone,
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
            advance_all_pending: false,
            _phant: PhantomData,
        }
    }

    /// Pulls the next agreed-upon record. `Ok(None)` is end-of-data; an
    /// `Err` terminates the stream, and subsequent pulls report end-of-data.
    pub async fn try_next(&mut self) -> Result<Option<T>> {
        match self.state {
            DriveState::Completed | DriveState::Faulted => return Ok(None),
            DriveState::NotStarted => {
                if self.remaining == Some(0) || self.cursors.is_empty() {
                    self.complete();
                    return Ok(None);
                }
                // Stop at the first exhausted source; later ones need no fetch.
                for i in 0..self.cursors.len() {
                    match self.cursors[i].advance(&self.project).await {
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
                self.state = DriveState::Running;
            }
            DriveState::Running => {
                if self.advance_all_pending {
                    self.advance_all_pending = false;
                    for i in 0..self.cursors.len() {
                        match self.cursors[i].advance(&self.project).await {
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
        }

        loop {
            // Every cursor is Active here. The candidate is the maximum of
            // the current keys; smaller keys can never be agreed upon.
            let target: K = {
                let mut target: Option<&K> = None;
                for cursor in self.cursors.iter() {
                    if let Some(key) = cursor.key() {
                        let is_new_max = match target {
                            None => true,
                            Some(t) => (self.compare)(key, t) == Ordering::Greater,
                        };
                        if is_new_max {
                            target = Some(key);
                        }
                    }
                }
                match target {
                    Some(t) => t.clone(),
                    None => {
                        self.complete();
                        return Ok(None);
                    }
                }
            };

            // Catch every cursor up to the target.
            let mut all_equal = true;
            for i in 0..self.cursors.len() {
                loop {
                    let ord = match self.cursors[i].key() {
                        None => {
                            self.complete();
                            return Ok(None);
                        }
                        Some(key) => (self.compare)(key, &target),
                    };
                    match ord {
                        Ordering::Less => match self.cursors[i].advance(&self.project).await {
                            Err(e) => {
                                self.fault();
                                return Err(e);
                            }
                            Ok(false) => {
                                self.complete();
                                return Ok(None);
                            }
                            Ok(true) => {}
                        },
                        Ordering::Equal => break,
                        Ordering::Greater => {
                            // Overshot: a new, larger candidate exists.
                            all_equal = false;
                            break;
                        }
                    }
                }
            }

            if !all_equal {
                continue;
            }

            let rec = match self.cursors[0].take_record() {
                None => {
                    self.complete();
                    return Ok(None);
                }
                Some(rec) => rec,
            };
            self.advance_all_pending = true;

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
        self.advance_all_pending = false;
        self.state = DriveState::Completed;
    }

    fn fault(&mut self) {
        self.cursors.clear();
        self.advance_all_pending = false;
        self.state = DriveState::Faulted;
    }
}

#[async_trait]
impl<St, K, T, P, S, C> SortedStream for IntersectStream<St, K, T, P, S, C>
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
        IntersectStream::try_next(self).await
    }
}

/// Intersection of pre-built sorted streams, keyed by `project`, natural key
/// order. Matched records come from the first stream.
pub fn intersect_of<St, K, P>(
    sources: Vec<St>,
    project: P,
) -> IntersectStream<St, K, St::Item, P, PassThrough<St::Item>, KeyCmp<K>>
where
    St: SortedStream,
    K: Clone + Ord,
    P: Fn(&St::Item) -> Result<K>,
{
    IntersectStream::new(sources, project, pass_through, ordering::natural, None)
}

/// Pairwise intersection; `first` is the primary.
pub fn intersect_pair<St, K, P>(
    first: St,
    second: St,
    project: P,
) -> IntersectStream<St, K, St::Item, P, PassThrough<St::Item>, KeyCmp<K>>
where
    St: SortedStream,
    K: Clone + Ord,
    P: Fn(&St::Item) -> Result<K>,
{
    intersect_of(vec![first, second], project)
}

/// Fully-general intersection: custom result selector and comparator.
pub fn intersect_of_by<St, K, T, P, S, C>(
    sources: Vec<St>,
    project: P,
    select: S,
    compare: C,
) -> IntersectStream<St, K, T, P, S, C>
where
    St: SortedStream,
    K: Clone,
    P: Fn(&St::Item) -> Result<K>,
    S: Fn(St::Item) -> Result<T>,
    C: Fn(&K, &K) -> Ordering,
{
    IntersectStream::new(sources, project, select, compare, None)
}
