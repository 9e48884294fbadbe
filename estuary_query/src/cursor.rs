use anyhow::Result;
use estuary_range::SortedStream;


/// Where a cursor stands relative to its source. `Done` is terminal: once
/// entered, the cursor never holds a record again.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CursorState {
    /// Nothing fetched yet.
    Pending,
    /// Holding a record and its projected key.
    Active,
    /// Source exhausted, or a fetch/projection failed.
    Done,
}

/// One-item-lookahead pull cursor over one sorted source. The key is
/// projected once, at advance time, so comparisons never re-run the
/// projection.
pub struct OrderedCursor<St, K>
where
    St: SortedStream,
{
    src: St,
    state: CursorState,
    current: Option<(St::Item, K)>,
}

impl<St, K> OrderedCursor<St, K>
where
    St: SortedStream,
{
    pub fn new(src: St) -> Self {
        Self {
            src,
            state: CursorState::Pending,
            current: None,
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Moves to the next record, projecting its key. The first call performs
    /// the initial fetch. Returns `false` once the source is exhausted;
    /// advancing a `Done` cursor is a no-op returning `false`.
    ///
    /// A source or projection failure marks the cursor `Done` (no further
    /// fetch is attempted on it) and surfaces the error.
    pub async fn advance<P>(&mut self, project: &P) -> Result<bool>
    where
        P: Fn(&St::Item) -> Result<K>,
    {
        if self.state == CursorState::Done {
            return Ok(false);
        }

        match self.src.try_next().await {
            Err(e) => {
                self.state = CursorState::Done;
                self.current = None;
                Err(e)
            }
            Ok(None) => {
                self.state = CursorState::Done;
                self.current = None;
                Ok(false)
            }
            Ok(Some(rec)) => match project(&rec) {
                Err(e) => {
                    self.state = CursorState::Done;
                    self.current = None;
                    Err(e)
                }
                Ok(key) => {
                    self.state = CursorState::Active;
                    self.current = Some((rec, key));
                    Ok(true)
                }
            },
        }
    }

    /// The current record and its key. `Some` only in the `Active` state.
    pub fn current(&self) -> Option<&(St::Item, K)> {
        self.current.as_ref()
    }

    pub fn key(&self) -> Option<&K> {
        self.current.as_ref().map(|(_rec, k)| k)
    }

    /// Takes the current record out, leaving the cursor `Active` but empty.
    /// The caller must advance this cursor before comparing it again.
    pub(crate) fn take_record(&mut self) -> Option<St::Item> {
        self.current.take().map(|(rec, _k)| rec)
    }
}
