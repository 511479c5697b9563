//! Replicating one stream into several.
//!
//! A single distribution task reads the input once and pushes a copy of
//! every item into one private queue per consumer. Each queue is drained by
//! its own forwarding task into that consumer's output. A slow consumer
//! therefore holds up distribution only once its own queue is full, not on
//! every item.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::join_all;
use tokio::sync::oneshot;

use crate::core::{Error, Outlet, Result, Stream};
use crate::telemetry;

/// Resolves once a fan-out has finished and closed every output.
///
/// Resolves to an error when the fan-out was cancelled or one of its tasks
/// died.
#[derive(Debug)]
#[must_use = "a fan-out completion does nothing unless awaited"]
pub struct Completion {
    rx: oneshot::Receiver<Result<()>>,
}

impl Future for Completion {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.map_err(Error::from).and_then(|outcome| outcome))
    }
}

/// Copy every item of `input` into each of `outs`, in order.
///
/// Every output receives an identical copy of the input and is closed once
/// the input is exhausted and its private queue drained. With no outputs
/// the input is still drained, so its producer never blocks. A consumer that
/// drops its stream stops receiving copies without affecting the others.
pub fn fan_out<T>(mut input: Stream<T>, outs: Vec<Outlet<T>>) -> Completion
where
    T: Clone + Send + 'static,
{
    let pipes = input.pipes().clone();
    let queue_size = pipes.config().fan_out_queue_size;
    let (done_tx, done_rx) = oneshot::channel();

    let mut queues = Vec::with_capacity(outs.len());
    let mut tasks = Vec::with_capacity(outs.len() + 1);

    for (index, output) in outs.into_iter().enumerate() {
        let (queue_tx, mut queue) = pipes.stage_channel("fan_out_queue", queue_size);
        queues.push(Some(queue_tx));

        tasks.push(pipes.spawn_stage("fan_out", async move {
            let mut forwarded = 0;
            while let Some(item) = queue.next_item().await {
                match output.send(item).await {
                    Ok(()) => forwarded += 1,
                    Err(Error::ChannelClosed) => {
                        // Dropping the queue tells the distributor to stop
                        // copying for this consumer.
                        telemetry::consumer_dropped("fan_out", index);
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok::<u64, Error>(forwarded)
        }));
    }

    tasks.push(pipes.spawn_stage("fan_out_distribute", async move {
        let mut distributed = 0;
        while let Some(item) = input.next_item().await {
            for slot in queues.iter_mut() {
                let Some(queue) = slot.as_mut() else { continue };
                let sent = queue.send(item.clone()).await;
                match sent {
                    Ok(()) => {}
                    Err(Error::ChannelClosed) => *slot = None,
                    Err(e) => return Err(e),
                }
            }
            distributed += 1;
        }
        // Dropping `queues` here closes every private queue.
        Ok::<u64, Error>(distributed)
    }));

    let token = pipes.token_ref().clone();
    pipes.spawn_stage("fan_out_complete", async move {
        let mut outcome = Ok(());
        for joined in join_all(tasks).await {
            let result = match joined {
                Ok(result) => result.map(|_| ()),
                Err(e) => Err(Error::custom(format!("fan-out task failed: {e}"))),
            };
            if outcome.is_ok() {
                outcome = result;
            }
        }
        if outcome.is_ok() && token.is_cancelled() {
            outcome = Err(Error::Cancelled);
        }
        // The receiver may have been dropped; nobody is waiting then.
        let _ = done_tx.send(outcome);
        Ok::<u64, Error>(0)
    });

    Completion { rx: done_rx }
}

/// Copy every item of `input` into `n` new streams.
///
/// Convenience over [`fan_out`] that creates the outputs itself.
pub fn replicate<T>(input: Stream<T>, n: usize) -> (Vec<Stream<T>>, Completion)
where
    T: Clone + Send + 'static,
{
    let pipes = input.pipes().clone();
    let (outs, streams): (Vec<_>, Vec<_>) = (0..n).map(|_| pipes.channel()).unzip();
    (streams, fan_out(input, outs))
}
