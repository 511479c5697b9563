//! Fixed-size batching.

use crate::core::{Error, Result, Stream};

/// Group items into chunks of `size`.
///
/// A chunk is emitted as soon as it is full. When the input ends mid-chunk,
/// the partial chunk is emitted last; an empty chunk never is. Concatenating
/// every chunk gives back the input exactly.
///
/// Returns a configuration error, before spawning anything, when `size` is
/// zero.
pub fn batch<T>(mut input: Stream<T>, size: usize) -> Result<Stream<Vec<T>>>
where
    T: Send + 'static,
{
    if size == 0 {
        return Err(Error::config("batch size", "must be greater than zero"));
    }

    let pipes = input.pipes().clone();
    let (output, stream) = pipes.stage_channel("batch", pipes.config().buffer_size);

    pipes.spawn_stage("batch", async move {
        let mut forwarded = 0;
        let mut chunk = Vec::with_capacity(size);

        while let Some(item) = input.next_item().await {
            chunk.push(item);
            if chunk.len() == size {
                let full = std::mem::replace(&mut chunk, Vec::with_capacity(size));
                output.send(full).await?;
                forwarded += 1;
            }
        }

        if !chunk.is_empty() {
            output.send(chunk).await?;
            forwarded += 1;
        }
        Ok::<u64, Error>(forwarded)
    });

    Ok(stream)
}
