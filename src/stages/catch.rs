//! Error capture: fallible transforms whose failures travel as data.

use crate::core::{Error, Stream};

/// The outcome of one [`catch`]ed transform: the value it returned, plus the
/// error it reported, if any.
///
/// A failing transform still hands back a value, so both survive side by
/// side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caught<T, E> {
    pub value: T,
    pub error: Option<E>,
}

impl<T, E> Caught<T, E> {
    pub fn new(value: T, error: Option<E>) -> Self {
        Self { value, error }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }

    /// Collapse into a `Result`, dropping the value when there is an error
    pub fn into_result(self) -> std::result::Result<T, E> {
        match self.error {
            None => Ok(self.value),
            Some(error) => Err(error),
        }
    }
}

impl<T, E> From<(T, Option<E>)> for Caught<T, E> {
    fn from((value, error): (T, Option<E>)) -> Self {
        Self::new(value, error)
    }
}

/// Apply a transform reporting `(value, error)` and forward one [`Caught`]
/// per item.
///
/// Exactly one result comes out per input item, in input order, whether `f`
/// reported an error or not. Downstream stages branch on
/// [`Caught::error`] instead of the stage dying.
///
/// # Examples
///
/// ```rust
/// use pipey::prelude::*;
///
/// # #[tokio::main]
/// # async fn main() {
/// let pipes = Pipes::new();
/// let checked = pipes
///     .from_iter(vec![4, 7, 10])
///     .catch(|x: i32| {
///         let error = (x % 2 != 0).then(|| format!("{x} is odd"));
///         (x / 2, error)
///     })
///     .collect()
///     .await;
/// assert_eq!(checked[1].value, 3);
/// assert_eq!(checked[1].error.as_deref(), Some("7 is odd"));
/// assert!(checked[2].is_ok());
/// # }
/// ```
pub fn catch<T, U, E, F>(mut input: Stream<T>, mut f: F) -> Stream<Caught<U, E>>
where
    T: Send + 'static,
    U: Send + 'static,
    E: Send + 'static,
    F: FnMut(T) -> (U, Option<E>) + Send + 'static,
{
    let pipes = input.pipes().clone();
    let (output, stream) = pipes.stage_channel("catch", pipes.config().buffer_size);

    pipes.spawn_stage("catch", async move {
        let mut forwarded = 0;
        while let Some(item) = input.next_item().await {
            output.send(Caught::from(f(item))).await?;
            forwarded += 1;
        }
        Ok::<u64, Error>(forwarded)
    });

    stream
}

/// Apply a `Result`-returning transform and forward its `Result` for every
/// item.
///
/// Same guarantees as [`catch`], for transforms that have no value to report
/// on failure.
///
/// ```rust
/// use pipey::prelude::*;
///
/// # #[tokio::main]
/// # async fn main() {
/// let pipes = Pipes::new();
/// let parsed = pipes
///     .from_iter(vec!["1", "x", "3"])
///     .try_catch(|s: &str| s.parse::<i32>())
///     .collect()
///     .await;
/// assert_eq!(parsed.len(), 3);
/// assert!(parsed[1].is_err());
/// # }
/// ```
pub fn try_catch<T, U, E, F>(mut input: Stream<T>, mut f: F) -> Stream<std::result::Result<U, E>>
where
    T: Send + 'static,
    U: Send + 'static,
    E: Send + 'static,
    F: FnMut(T) -> std::result::Result<U, E> + Send + 'static,
{
    let pipes = input.pipes().clone();
    let (output, stream) = pipes.stage_channel("try_catch", pipes.config().buffer_size);

    pipes.spawn_stage("try_catch", async move {
        let mut forwarded = 0;
        while let Some(item) = input.next_item().await {
            output.send(f(item)).await?;
            forwarded += 1;
        }
        Ok::<u64, Error>(forwarded)
    });

    stream
}
