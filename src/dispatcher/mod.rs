//! Routing between one and many streams.
//!
//! - [`fan_in`] merges many streams into one.
//! - [`fan_out`] copies one stream into many, each consumer decoupled from
//!   the others by a private queue.
//! - [`worker_pool`] spreads one stream over competing workers and merges
//!   their results, giving up ordering for parallelism.

pub mod fan_in;
pub mod fan_out;
pub mod worker_pool;

pub use fan_in::fan_in;
pub use fan_out::{fan_out, replicate, Completion};
pub use worker_pool::worker_pool;
