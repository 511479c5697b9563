//! # Composable concurrent stream stages for Rust
//!
//! pipey wires ordered streams of typed values through stages that each run
//! on their own tokio task, so concurrent pipelines can be assembled without
//! hand-rolling channels, joins and shutdown each time.
//!
//! ## Core Concepts
//!
//! - **Stream**: an ordered, single-producer sequence closed exactly once by
//!   its producer (the [`Outlet`])
//! - **Stages**: `map`, `pipeline`, `filter`, `batch` and `catch`, each
//!   preserving input order
//! - **Dispatchers**: `fan_in` merges streams, `fan_out` replicates one,
//!   `worker_pool` trades order for parallelism
//! - **Pipes**: the context streams live in, carrying configuration and a
//!   cancellation token
//!
//! ## Example
//!
//! ```rust
//! use pipey::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let pipes = Pipes::new().buffer_size(16);
//!
//!     let stages: Vec<Transform<i64>> = vec![Box::new(|x| x + 1), Box::new(|x| x * 2)];
//!     let batches = pipes
//!         .from_iter(1..=5)
//!         .pipeline(stages)
//!         .filter(|x| *x != 6)
//!         .batch(2)?;
//!
//!     assert_eq!(batches.collect().await, vec![vec![4, 8], vec![10, 12]]);
//!     Ok(())
//! }
//! ```
//!
//! ## Shutdown
//!
//! A pipeline normally shuts down by its sources closing: each stage drains
//! its input, closes its output, and the closure cascades downstream.
//! [`Pipes::cancel`] stops every stage of a context early instead.

pub mod adapter;
pub mod core;
pub mod dispatcher;
pub mod sources;
pub mod stages;

mod telemetry;

// Re-export commonly used items
pub mod prelude {
    pub use crate::adapter::{LogConfig, MemoryLog, StreamLog};
    pub use crate::core::{Error, Outlet, Pipes, PipesConfig, Result, Stream};
    pub use crate::dispatcher::{fan_in, fan_out, replicate, worker_pool, Completion};
    pub use crate::stages::{batch, catch, filter, map, pipeline, try_catch, Caught, Transform};
}

// Re-export main types
pub use crate::core::{Error, Outlet, Pipes, PipesConfig, Result, Stream};
pub use dispatcher::{fan_in, fan_out, replicate, worker_pool, Completion};
pub use stages::{batch, catch, filter, map, pipeline, try_catch, Caught, Transform};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
