//! Merging several streams into one.

use crate::core::{Error, Pipes, Stream};

impl Pipes {
    /// Merge `streams` into a single stream.
    ///
    /// Each input gets its own forwarding task. Items keep their order
    /// relative to other items of the same input; how inputs interleave is
    /// unspecified. The merged stream closes once every input has closed,
    /// and immediately when there are no inputs.
    pub fn fan_in<T>(&self, streams: Vec<Stream<T>>) -> Stream<T>
    where
        T: Send + 'static,
    {
        let (output, merged) = self.stage_channel("fan_in", self.config().buffer_size);

        // Every forwarding task holds a share of the output; the merged
        // stream ends when the last share is dropped.
        for mut stream in streams {
            let output = output.share();
            self.spawn_stage("fan_in", async move {
                let mut forwarded = 0;
                while let Some(item) = stream.next_item().await {
                    output.send(item).await?;
                    forwarded += 1;
                }
                Ok::<u64, Error>(forwarded)
            });
        }

        merged
    }
}

/// Merge `streams` into a single stream, in the context of the first one.
///
/// See [`Pipes::fan_in`].
pub fn fan_in<T>(streams: Vec<Stream<T>>) -> Stream<T>
where
    T: Send + 'static,
{
    let pipes = streams
        .first()
        .map(|stream| stream.pipes().clone())
        .unwrap_or_default();
    pipes.fan_in(streams)
}
