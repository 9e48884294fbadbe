use anyhow::Result;
use async_trait::async_trait;


/// A forward-only, single-pass sequence of items, pre-sorted by whatever key
/// the consumer will extract from them. Pulling may suspend (e.g. awaiting
/// the next page of a remote fetch); an `Err` is fatal to the sequence.
///
/// The query engines consume their inputs exclusively through this trait,
/// and implement it themselves, so set operations compose.
#[async_trait]
pub trait SortedStream: Send {
    type Item;

    async fn try_next(&mut self) -> Result<Option<Self::Item>>;
}

#[async_trait]
impl<S> SortedStream for Box<S>
where
    S: SortedStream + ?Sized,
{
    type Item = S::Item;

    async fn try_next(&mut self) -> Result<Option<Self::Item>> {
        (**self).try_next().await
    }
}

/// For mixing differently-typed sources into one query.
pub type BoxedSortedStream<T> = Box<dyn SortedStream<Item = T>>;

/// A pre-built in-memory stream. Elements are `Result`s so that a
/// mid-stream source failure is representable.
pub struct VecStream<T> {
    items: std::vec::IntoIter<Result<T>>,
}

impl<T> VecStream<T> {
    pub fn new(items: Vec<Result<T>>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }

    pub fn from_values(items: Vec<T>) -> Self {
        Self::new(items.into_iter().map(Ok).collect())
    }
}

#[async_trait]
impl<T> SortedStream for VecStream<T>
where
    T: Send,
{
    type Item = T;

    async fn try_next(&mut self) -> Result<Option<T>> {
        self.items.next().transpose()
    }
}

/// Pulls a stream to exhaustion, collecting its items.
pub async fn drain<S>(stream: &mut S) -> Result<Vec<S::Item>>
where
    S: SortedStream,
{
    let mut out = vec![];
    while let Some(item) = stream.try_next().await? {
        out.push(item);
    }
    Ok(out)
}
