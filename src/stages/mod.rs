//! Order-preserving stages.
//!
//! Each stage spawns one task that reads its input to exhaustion, writes to
//! an output stream it alone owns, and closes that output when done. Output
//! order always equals input order.

pub mod batch;
pub mod catch;
pub mod filter;
pub mod map;

pub use batch::batch;
pub use catch::{catch, try_catch, Caught};
pub use filter::filter;
pub use map::{map, pipeline, Transform};
