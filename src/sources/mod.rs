//! Source implementations for the pipey library.
//!
//! Sources are the roots of a pipeline graph: each one spawns a task that
//! owns a fresh stream and closes it when its input runs out.

use tokio::sync::mpsc;
use tokio_stream::StreamExt;

use crate::core::{Error, Pipes, Stream};

impl Pipes {
    /// A stream that yields every item of `items`, then closes.
    pub fn from_iter<I>(&self, items: I) -> Stream<I::Item>
    where
        I: IntoIterator,
        I::IntoIter: Send + 'static,
        I::Item: Send + 'static,
    {
        let (output, stream) = self.stage_channel("source", self.config().buffer_size);
        let items = items.into_iter();

        self.spawn_stage("source", async move {
            let mut forwarded = 0;
            for item in items {
                output.send(item).await?;
                forwarded += 1;
            }
            Ok::<u64, Error>(forwarded)
        });

        stream
    }

    /// A stream that forwards every item of an async stream, then closes.
    pub fn from_stream<S>(&self, items: S) -> Stream<S::Item>
    where
        S: futures_core::Stream + Send + 'static,
        S::Item: Send + 'static,
    {
        let (output, stream) = self.stage_channel("source", self.config().buffer_size);

        self.spawn_stage("source", async move {
            let mut forwarded = 0;
            tokio::pin!(items);
            while let Some(item) = items.next().await {
                output.send(item).await?;
                forwarded += 1;
            }
            Ok::<u64, Error>(forwarded)
        });

        stream
    }

    /// Adopt a raw tokio receiver as a stream of this context.
    ///
    /// The stream ends when every sender of `rx` has been dropped.
    pub fn from_receiver<T>(&self, rx: mpsc::Receiver<T>) -> Stream<T> {
        Stream::new(rx, self.clone())
    }
}
