//! In-process [`StreamLog`] for tests and demos.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tokio_util::sync::CancellationToken;

use super::{LogConfig, StreamLog};
use crate::core::{Error, Outlet, Pipes, Result, Stream};

#[derive(Debug)]
struct Entry {
    id: u64,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct LogState {
    last_id: u64,
    streams: HashMap<String, Vec<Entry>>,
    cursors: HashMap<String, u64>,
}

impl LogState {
    fn next_after(&self, key: &str, cursor: Option<u64>) -> Option<(u64, Vec<u8>)> {
        self.streams
            .get(key)?
            .iter()
            .find(|entry| cursor.map_or(true, |seen| entry.id > seen))
            .map(|entry| (entry.id, entry.data.clone()))
    }

    fn remove(&mut self, key: &str, id: u64) {
        if let Some(entries) = self.streams.get_mut(key) {
            entries.retain(|entry| entry.id != id);
        }
    }
}

/// A [`StreamLog`] kept in memory.
///
/// Entry ids increase monotonically across all keys. Each key's cursor is
/// the id of the last entry a listener delivered, so a new listener resumes
/// where the previous one stopped.
#[derive(Debug, Clone)]
pub struct MemoryLog {
    config: LogConfig,
    pipes: Pipes,
    state: Arc<Mutex<LogState>>,
    appended: Arc<Notify>,
}

impl MemoryLog {
    /// Create an empty log whose listeners run in `pipes`
    pub fn new(pipes: &Pipes, config: LogConfig) -> Self {
        Self {
            config,
            pipes: pipes.clone(),
            state: Arc::new(Mutex::new(LogState::default())),
            appended: Arc::new(Notify::new()),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Every entry currently stored under `key`
    pub async fn entries(&self, key: &str) -> Vec<Vec<u8>> {
        let state = self.state.lock().await;
        state
            .streams
            .get(key)
            .map(|entries| entries.iter().map(|entry| entry.data.clone()).collect())
            .unwrap_or_default()
    }

    /// The id of the last entry delivered from `key`, if any
    pub async fn cursor(&self, key: &str) -> Option<u64> {
        let state = self.state.lock().await;
        state.cursors.get(&self.config.cursor_name(key)).copied()
    }
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::log("stream key must not be empty"));
    }
    Ok(())
}

#[async_trait]
impl StreamLog for MemoryLog {
    async fn listen(&self, key: &str) -> Result<Stream<Vec<u8>>> {
        check_key(key)?;

        let (output, stream) = self
            .pipes
            .stage_channel("log_listen", self.pipes.config().buffer_size);
        let listener = Listener {
            key: key.to_string(),
            cursor_name: self.config.cursor_name(key),
            sentinel: self.config.sentinel.clone(),
            state: Arc::clone(&self.state),
            appended: Arc::clone(&self.appended),
            token: self.pipes.token_ref().clone(),
        };
        self.pipes.spawn_stage("log_listen", listener.run(output));

        Ok(stream)
    }

    async fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        check_key(key)?;

        {
            let mut state = self.state.lock().await;
            state.last_id += 1;
            let id = state.last_id;
            state.streams.entry(key.to_string()).or_default().push(Entry {
                id,
                data: data.to_vec(),
            });
        }
        self.appended.notify_waiters();
        Ok(())
    }
}

struct Listener {
    key: String,
    cursor_name: String,
    sentinel: Vec<u8>,
    state: Arc<Mutex<LogState>>,
    appended: Arc<Notify>,
    token: CancellationToken,
}

impl Listener {
    async fn run(self, output: Outlet<Vec<u8>>) -> Result<u64> {
        let mut forwarded = 0;
        loop {
            // Register for wake-ups before looking, so a write landing in
            // between is not missed.
            let appended = self.appended.notified();
            tokio::pin!(appended);
            appended.as_mut().enable();

            let next = {
                let state = self.state.lock().await;
                let cursor = state.cursors.get(&self.cursor_name).copied();
                state.next_after(&self.key, cursor)
            };

            match next {
                Some((id, data)) if data == self.sentinel => {
                    // Otherwise a resumed listener would stop on it again.
                    self.state.lock().await.remove(&self.key, id);
                    return Ok(forwarded);
                }
                Some((id, data)) => {
                    output.send(data).await?;
                    self.state
                        .lock()
                        .await
                        .cursors
                        .insert(self.cursor_name.clone(), id);
                    forwarded += 1;
                }
                None => {
                    tokio::select! {
                        biased;
                        _ = self.token.cancelled() => return Err(Error::Cancelled),
                        _ = &mut appended => {}
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn log() -> (Pipes, MemoryLog) {
        let pipes = Pipes::new();
        let log = MemoryLog::new(&pipes, LogConfig::default());
        (pipes, log)
    }

    #[tokio::test]
    async fn test_listen_until_sentinel() {
        let (_pipes, log) = log();
        log.write("in", b"one").await.unwrap();
        log.write("in", b"two").await.unwrap();
        log.write("in", b"eof").await.unwrap();

        let items = log.listen("in").await.unwrap().collect().await;
        assert_eq!(items, vec![b"one".to_vec(), b"two".to_vec()]);
        // The sentinel is consumed, the data stays
        assert_eq!(log.entries("in").await, vec![b"one".to_vec(), b"two".to_vec()]);
    }

    #[tokio::test]
    async fn test_listen_resumes_from_cursor() {
        let (_pipes, log) = log();
        log.write("in", b"a").await.unwrap();
        log.write("in", b"eof").await.unwrap();
        assert_eq!(log.listen("in").await.unwrap().collect().await, vec![b"a".to_vec()]);
        assert_eq!(log.cursor("in").await, Some(1));

        log.write("in", b"b").await.unwrap();
        log.write("in", b"eof").await.unwrap();
        assert_eq!(log.listen("in").await.unwrap().collect().await, vec![b"b".to_vec()]);
    }

    #[tokio::test]
    async fn test_listener_waits_for_writes() {
        let (_pipes, log) = log();
        let listened = log.listen("in").await.unwrap();

        let writer = log.clone();
        tokio::spawn(async move {
            for i in 0..3 {
                tokio::time::sleep(Duration::from_millis(5)).await;
                writer.write("in", format!("msg {i}").as_bytes()).await.unwrap();
            }
            writer.write("in", b"eof").await.unwrap();
        });

        let items = tokio::time::timeout(Duration::from_secs(2), listened.collect())
            .await
            .unwrap();
        assert_eq!(
            items,
            vec![b"msg 0".to_vec(), b"msg 1".to_vec(), b"msg 2".to_vec()]
        );
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let (_pipes, log) = log();
        log.write("a", b"for a").await.unwrap();
        log.write("b", b"for b").await.unwrap();
        log.write("a", b"eof").await.unwrap();
        assert_eq!(log.listen("a").await.unwrap().collect().await, vec![b"for a".to_vec()]);
        assert_eq!(log.entries("b").await, vec![b"for b".to_vec()]);
    }

    #[tokio::test]
    async fn test_cancel_stops_listener() {
        let (pipes, log) = log();
        let listened = log.listen("quiet").await.unwrap();
        pipes.cancel();
        assert!(listened.collect().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_key_is_rejected() {
        let (_pipes, log) = log();
        assert!(matches!(log.write("", b"x").await, Err(Error::Log(_))));
        assert!(log.listen("").await.is_err());
    }
}
