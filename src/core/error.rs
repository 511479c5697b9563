//! Error types for stream stages.

use thiserror::Error;

/// The main error type for pipey.
///
/// Transform failures are deliberately absent: a panicking transform kills
/// its stage task, and a fallible one is wrapped with
/// [`catch`](crate::stages::catch()) so its failures travel as data.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A stage was configured with an unusable parameter
    #[error("invalid {parameter}: {reason}")]
    Config {
        parameter: &'static str,
        reason: String,
    },

    /// The pipeline context was cancelled
    #[error("pipeline was cancelled")]
    Cancelled,

    /// The receiving side of a stream was dropped
    #[error("stream was closed by its consumer")]
    ChannelClosed,

    /// The stream log adapter failed
    #[error("stream log error: {0}")]
    Log(String),

    /// A custom error with a message
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(parameter: &'static str, reason: S) -> Self {
        Error::Config {
            parameter,
            reason: reason.into(),
        }
    }

    /// Create a log adapter error
    pub fn log<S: Into<String>>(message: S) -> Self {
        Error::Log(message.into())
    }

    /// Create a custom error with a message
    pub fn custom<S: Into<String>>(message: S) -> Self {
        Error::Custom(message.into())
    }

    /// Whether this error is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config { .. })
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for Error {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Error::ChannelClosed
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for Error {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Error::ChannelClosed
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Custom(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Custom(s.to_string())
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = Error::config("batch size", "must be greater than zero");
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "invalid batch size: must be greater than zero"
        );
    }

    #[tokio::test]
    async fn test_send_error_maps_to_channel_closed() {
        let (tx, rx) = tokio::sync::mpsc::channel::<u8>(1);
        drop(rx);
        let err: Error = tx.send(1).await.unwrap_err().into();
        assert!(matches!(err, Error::ChannelClosed));
    }
}
