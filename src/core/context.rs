//! Pipeline context: configuration, cancellation and task tracking.
//!
//! Every [`Stream`] carries the [`Pipes`] it was created from, so stages
//! derived from it share one configuration, one cancellation token and one
//! task tracker.

use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::core::error::Result;
use crate::core::stream::{Outlet, Stream};
use crate::telemetry;

/// Configuration shared by every stage spawned from one [`Pipes`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipesConfig {
    /// Capacity of each stream between stages
    pub buffer_size: usize,
    /// Capacity of each private per-consumer queue inside a fan-out
    pub fan_out_queue_size: usize,
}

impl Default for PipesConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1,
            fan_out_queue_size: 16,
        }
    }
}

/// The context stages are built in.
///
/// Cloning is cheap and shares the cancellation token and task tracker.
///
/// # Examples
///
/// ```rust
/// use pipey::prelude::*;
///
/// # #[tokio::main]
/// # async fn main() {
/// let pipes = Pipes::new().buffer_size(8);
/// let evens = pipes
///     .from_iter(1..=6)
///     .filter(|x: &i32| x % 2 == 0)
///     .collect()
///     .await;
/// assert_eq!(evens, vec![2, 4, 6]);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pipes {
    config: PipesConfig,
    token: CancellationToken,
    tracker: TaskTracker,
}

impl Pipes {
    /// Create a context with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with the given configuration
    pub fn with_config(config: PipesConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Set the capacity of streams between stages.
    ///
    /// A capacity of zero is treated as one.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.config.buffer_size = size;
        self
    }

    /// Set the capacity of each private fan-out queue.
    ///
    /// A capacity of zero is treated as one.
    pub fn fan_out_queue_size(mut self, size: usize) -> Self {
        self.config.fan_out_queue_size = size;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &PipesConfig {
        &self.config
    }

    /// Create a stream and the producer handle that feeds it.
    ///
    /// Dropping the [`Outlet`] closes the stream.
    pub fn channel<T>(&self) -> (Outlet<T>, Stream<T>) {
        self.stage_channel("source", self.config.buffer_size)
    }

    pub(crate) fn stage_channel<T>(
        &self,
        stage: &'static str,
        capacity: usize,
    ) -> (Outlet<T>, Stream<T>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Outlet::new(tx, self.token.clone(), stage),
            Stream::new(rx, self.clone()),
        )
    }

    /// Stop every stage built from this context.
    ///
    /// Each stage closes its output at its next receive or send.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether [`cancel`](Self::cancel) has been called
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A child of this context's token.
    ///
    /// It fires when the context is cancelled. Cancelling it does not cancel
    /// the context.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    pub(crate) fn token_ref(&self) -> &CancellationToken {
        &self.token
    }

    /// Wait until every stage task spawned from this context has finished.
    pub async fn join(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }

    /// Spawn the task that owns one stage's output.
    ///
    /// The body resolves to the number of items it forwarded.
    pub(crate) fn spawn_stage<F>(&self, stage: &'static str, body: F) -> JoinHandle<Result<u64>>
    where
        F: Future<Output = Result<u64>> + Send + 'static,
    {
        self.tracker.spawn(async move {
            telemetry::stage_started(stage);
            let outcome = body.await;
            telemetry::stage_finished(stage, &outcome);
            outcome
        })
    }
}
