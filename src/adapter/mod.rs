//! Adapters between pipelines and durable, keyed message logs.
//!
//! A [`StreamLog`] turns a keyed log into a source (`listen`) and a sink
//! (`write`). Listening resumes from a persisted cursor, and a reserved
//! sentinel entry ends the listened stream.

pub mod memory;

use async_trait::async_trait;

use crate::core::{Result, Stream};

pub use memory::MemoryLog;

/// Settings for a log adapter, passed in at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LogConfig {
    /// Namespace under which each key's read cursor is persisted
    pub cursor_key: String,
    /// Entry that ends a listened stream instead of being delivered
    pub sentinel: Vec<u8>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            cursor_key: "last_id".to_string(),
            sentinel: b"eof".to_vec(),
        }
    }
}

impl LogConfig {
    /// Set the cursor namespace
    pub fn cursor_key<S: Into<String>>(mut self, key: S) -> Self {
        self.cursor_key = key.into();
        self
    }

    /// Set the sentinel entry
    pub fn sentinel<B: Into<Vec<u8>>>(mut self, sentinel: B) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    /// The name a key's cursor is persisted under
    pub fn cursor_name(&self, key: &str) -> String {
        format!("{}:{}", self.cursor_key, key)
    }
}

/// A durable, keyed message log usable as a pipeline source and sink.
#[async_trait]
pub trait StreamLog: Send + Sync {
    /// Stream the entries of `key`, starting after the persisted cursor.
    ///
    /// The stream stays open waiting for new entries, and closes when the
    /// sentinel entry is read.
    async fn listen(&self, key: &str) -> Result<Stream<Vec<u8>>>;

    /// Append an entry to `key`.
    async fn write(&self, key: &str, data: &[u8]) -> Result<()>;
}
