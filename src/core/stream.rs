//! The stream substrate every stage reads from and writes to.
//!
//! A [`Stream`] is the receiving end of a bounded channel with exactly one
//! producer, the [`Outlet`]. The stream ends when its outlet is dropped;
//! consumers see that as `None`, never as an error.

use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::context::Pipes;
use crate::core::error::{Error, Result};
use crate::dispatcher::{self, Completion};
use crate::stages::{self, Caught, Transform};
use crate::telemetry;

/// The single producer handle of a [`Stream`].
///
/// `Outlet` is deliberately not `Clone`: a stream has one owner, and that
/// owner closes it by dropping the outlet.
#[derive(Debug)]
pub struct Outlet<T> {
    tx: mpsc::Sender<T>,
    token: CancellationToken,
    stage: &'static str,
}

impl<T> Outlet<T> {
    pub(crate) fn new(tx: mpsc::Sender<T>, token: CancellationToken, stage: &'static str) -> Self {
        Self { tx, token, stage }
    }

    /// Send an item downstream, waiting while the stream is full.
    ///
    /// Fails with [`Error::ChannelClosed`] once the consumer has dropped its
    /// stream, and with [`Error::Cancelled`] once the context is cancelled.
    pub async fn send(&self, item: T) -> Result<()> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Error::Cancelled),
            sent = self.tx.send(item) => {
                sent?;
                telemetry::item_forwarded(self.stage);
                Ok(())
            }
        }
    }

    /// Whether the consumer has dropped its stream
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Close the stream. Equivalent to dropping the outlet.
    pub fn close(self) {}

    /// Another handle onto the same stream, for stages whose output is
    /// written by several of their own tasks (fan-in, worker pools).
    pub(crate) fn share(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            token: self.token.clone(),
            stage: self.stage,
        }
    }
}

/// An ordered, single-producer sequence of values.
///
/// Besides the inherent combinators below, `Stream` implements
/// [`futures_core::Stream`], so `tokio_stream::StreamExt` works on it too.
#[derive(Debug)]
pub struct Stream<T> {
    rx: mpsc::Receiver<T>,
    pipes: Pipes,
}

impl<T> Stream<T> {
    pub(crate) fn new(rx: mpsc::Receiver<T>, pipes: Pipes) -> Self {
        Self { rx, pipes }
    }

    /// Receive the next item, or `None` once the producer closed the stream.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Receive the next item as a stage does: cancellation ends the stream.
    pub(crate) async fn next_item(&mut self) -> Option<T> {
        tokio::select! {
            biased;
            _ = self.pipes.token_ref().cancelled() => None,
            item = self.rx.recv() => item,
        }
    }

    /// The context this stream belongs to
    pub fn pipes(&self) -> &Pipes {
        &self.pipes
    }

    /// Drain the stream into a vector
    pub async fn collect(mut self) -> Vec<T> {
        let mut items = Vec::new();
        while let Some(item) = self.rx.recv().await {
            items.push(item);
        }
        items
    }

    /// Run `f` on every item until the stream ends
    pub async fn for_each<F>(mut self, mut f: F)
    where
        F: FnMut(T),
    {
        while let Some(item) = self.rx.recv().await {
            f(item);
        }
    }

    /// Give up the context and return the raw receiver
    pub fn into_inner(self) -> mpsc::Receiver<T> {
        self.rx
    }
}

impl<T: Send + 'static> Stream<T> {
    /// Apply `f` to every item, in order. See [`stages::map`].
    pub fn map<U, F>(self, f: F) -> Stream<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> U + Send + 'static,
    {
        stages::map(self, f)
    }

    /// Chain one map stage per transform. See [`stages::pipeline`].
    pub fn pipeline(self, stages: Vec<Transform<T>>) -> Stream<T> {
        stages::pipeline(self, stages)
    }

    /// Keep the items `predicate` accepts. See [`stages::filter`].
    pub fn filter<F>(self, predicate: F) -> Stream<T>
    where
        F: FnMut(&T) -> bool + Send + 'static,
    {
        stages::filter(self, predicate)
    }

    /// Group items into chunks of `size`. See [`stages::batch`].
    pub fn batch(self, size: usize) -> Result<Stream<Vec<T>>> {
        stages::batch(self, size)
    }

    /// Pair each transformed value with the error `f` reported for it. See
    /// [`stages::catch`].
    pub fn catch<U, E, F>(self, f: F) -> Stream<Caught<U, E>>
    where
        U: Send + 'static,
        E: Send + 'static,
        F: FnMut(T) -> (U, Option<E>) + Send + 'static,
    {
        stages::catch(self, f)
    }

    /// Turn each item into a `Result` with a fallible transform. See
    /// [`stages::try_catch`].
    pub fn try_catch<U, E, F>(self, f: F) -> Stream<std::result::Result<U, E>>
    where
        U: Send + 'static,
        E: Send + 'static,
        F: FnMut(T) -> std::result::Result<U, E> + Send + 'static,
    {
        stages::try_catch(self, f)
    }

    /// Process items on `workers` competing tasks, without preserving
    /// order. See [`dispatcher::worker_pool`].
    pub fn worker_pool<U, F>(self, f: F, workers: usize) -> Result<Stream<U>>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        dispatcher::worker_pool(self, f, workers)
    }

    /// Merge this stream with `others`. See [`dispatcher::fan_in`].
    pub fn merge(self, others: Vec<Stream<T>>) -> Stream<T> {
        let pipes = self.pipes.clone();
        let mut streams = Vec::with_capacity(others.len() + 1);
        streams.push(self);
        streams.extend(others);
        pipes.fan_in(streams)
    }
}

impl<T: Clone + Send + 'static> Stream<T> {
    /// Copy every item into each of `outs`. See [`dispatcher::fan_out`].
    pub fn fan_out(self, outs: Vec<Outlet<T>>) -> Completion {
        dispatcher::fan_out(self, outs)
    }

    /// Copy every item into `n` new streams. See [`dispatcher::replicate`].
    pub fn replicate(self, n: usize) -> (Vec<Stream<T>>, Completion) {
        dispatcher::replicate(self, n)
    }
}

impl<T> futures_core::Stream for Stream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.rx.poll_recv(cx)
    }
}
