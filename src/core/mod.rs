//! Core types for the pipey library.
//!
//! This module contains the stream substrate, the pipeline context and the
//! error type every stage shares.

pub mod context;
pub mod error;
pub mod stream;

// Re-export core items
pub use context::{Pipes, PipesConfig};
pub use error::{Error, Result};
pub use stream::{Outlet, Stream};
