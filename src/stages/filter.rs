//! Predicate filtering.

use crate::core::{Error, Stream};

/// Pass through only the items `predicate` accepts, keeping their order.
pub fn filter<T, F>(mut input: Stream<T>, mut predicate: F) -> Stream<T>
where
    T: Send + 'static,
    F: FnMut(&T) -> bool + Send + 'static,
{
    let pipes = input.pipes().clone();
    let (output, stream) = pipes.stage_channel("filter", pipes.config().buffer_size);

    pipes.spawn_stage("filter", async move {
        let mut forwarded = 0;
        while let Some(item) = input.next_item().await {
            if predicate(&item) {
                output.send(item).await?;
                forwarded += 1;
            }
        }
        Ok::<u64, Error>(forwarded)
    });

    stream
}
