//! Worker pools: competing consumers merged back into one stream.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::{Error, Result, Stream};

/// Apply `f` on `workers` tasks that compete for the items of `input`.
///
/// Each item goes to exactly one worker. Results are written to one shared
/// output in whatever order the workers finish, so input order is NOT
/// preserved; only the multiset of results is. Re-establish order
/// downstream, for instance with sequence numbers, when it matters.
///
/// The output closes once every worker has seen the input end. Returns a
/// configuration error, before spawning anything, when `workers` is zero.
///
/// # Examples
///
/// ```rust
/// use pipey::prelude::*;
///
/// # #[tokio::main]
/// # async fn main() -> pipey::Result<()> {
/// let pipes = Pipes::new();
/// let mut squares = pipes
///     .from_iter(1..=4)
///     .worker_pool(|x: u64| x * x, 3)?
///     .collect()
///     .await;
/// squares.sort();
/// assert_eq!(squares, vec![1, 4, 9, 16]);
/// # Ok(())
/// # }
/// ```
pub fn worker_pool<T, U, F>(input: Stream<T>, f: F, workers: usize) -> Result<Stream<U>>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    if workers == 0 {
        return Err(Error::config("worker count", "must be greater than zero"));
    }

    let pipes = input.pipes().clone();
    let (output, results) = pipes.stage_channel("worker_pool", pipes.config().buffer_size);
    let input = Arc::new(Mutex::new(input));
    let f = Arc::new(f);

    for _ in 0..workers {
        let input = Arc::clone(&input);
        let f = Arc::clone(&f);
        let output = output.share();

        pipes.spawn_stage("worker_pool", async move {
            let mut forwarded = 0;
            loop {
                // Hold the lock only while receiving, never while working.
                let item = input.lock().await.next_item().await;
                let Some(item) = item else { break };
                output.send(f(item)).await?;
                forwarded += 1;
            }
            Ok::<u64, Error>(forwarded)
        });
    }

    Ok(results)
}
