//! Logging and metrics hooks for stage tasks.
//!
//! Everything here compiles to nothing unless the `tracing` or `metrics`
//! feature is enabled.

#[cfg(feature = "tracing")]
use crate::core::Error;
use crate::core::Result;

#[cfg(feature = "metrics")]
const ITEMS_TOTAL: &str = "pipey_items_total";
#[cfg(feature = "metrics")]
const STAGES_FINISHED_TOTAL: &str = "pipey_stages_finished_total";

pub(crate) fn stage_started(stage: &'static str) {
    #[cfg(feature = "tracing")]
    tracing::debug!(stage, "stage started");
    #[cfg(not(feature = "tracing"))]
    let _ = stage;
}

/// Record one item written to a stage's output.
pub(crate) fn item_forwarded(stage: &'static str) {
    #[cfg(feature = "metrics")]
    metrics::counter!(ITEMS_TOTAL, "stage" => stage).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = stage;
}

pub(crate) fn stage_finished(stage: &'static str, outcome: &Result<u64>) {
    #[cfg(feature = "metrics")]
    metrics::counter!(STAGES_FINISHED_TOTAL, "stage" => stage).increment(1);

    #[cfg(feature = "tracing")]
    match outcome {
        Ok(forwarded) => tracing::debug!(stage, forwarded, "stage finished"),
        Err(Error::Cancelled) => tracing::debug!(stage, "stage cancelled"),
        Err(Error::ChannelClosed) => tracing::debug!(stage, "downstream consumer went away"),
        Err(error) => tracing::warn!(stage, %error, "stage stopped"),
    }
    #[cfg(not(feature = "tracing"))]
    let _ = (stage, outcome);
}

pub(crate) fn consumer_dropped(stage: &'static str, index: usize) {
    #[cfg(feature = "tracing")]
    tracing::debug!(stage, index, "consumer dropped its stream, discarding its copies");
    #[cfg(not(feature = "tracing"))]
    let _ = (stage, index);
}

