use crate::stream::SortedStream;
use anyhow::Result;
use async_trait::async_trait;
use estuary_types::types::Record;
use std::collections::VecDeque;


/// One fetched batch of records. `more == false` marks the final page.
pub struct Page<R> {
    pub records: Vec<R>,
    pub more: bool,
}

/// A paged, ordered fetch of key-value records, e.g. one key range read
/// from a remote store. Each `next_page` call may suspend. An `Err` is
/// fatal to the scan; callers stop fetching after one.
#[async_trait]
pub trait RangeSource: Send {
    async fn next_page(&mut self) -> Result<Page<Record>>;
}

/// Adapts a paged range source into record-at-a-time pulls. One page is
/// buffered at a time; the next is fetched when the buffer drains, which is
/// where a pull suspends.
pub struct PagedRecords<S> {
    src: S,
    buf: VecDeque<Record>,
    more: bool,
    begun: bool,
}

impl<S> PagedRecords<S>
where
    S: RangeSource,
{
    pub fn new(src: S) -> Self {
        Self {
            src,
            buf: VecDeque::new(),
            more: false,
            begun: false,
        }
    }
}

#[async_trait]
impl<S> SortedStream for PagedRecords<S>
where
    S: RangeSource,
{
    type Item = Record;

    async fn try_next(&mut self) -> Result<Option<Record>> {
        loop {
            if let Some(rec) = self.buf.pop_front() {
                return Ok(Some(rec));
            }
            if self.begun && !self.more {
                return Ok(None);
            }

            let page = self.src.next_page().await?;
            self.begun = true;
            self.more = page.more;
            self.buf = VecDeque::from(page.records);
        }
    }
}
