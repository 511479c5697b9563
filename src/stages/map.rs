//! Map stages and multi-stage pipelines.

use crate::core::{Error, Stream};

/// A boxed transform, one per stage of a [`pipeline`]
pub type Transform<T, U = T> = Box<dyn FnMut(T) -> U + Send + 'static>;

/// Apply `f` to every item of `input`, in arrival order.
///
/// A panic inside `f` kills the stage task. Its output is dropped while
/// unwinding, so downstream sees an ordinary end of stream: the consumer
/// cannot tell a stream truncated this way from a complete one. The panic
/// itself only reaches tokio's panic hook. Wrap fallible work with
/// [`catch`](crate::stages::catch()) or
/// [`try_catch`](crate::stages::try_catch()) instead.
pub fn map<T, U, F>(mut input: Stream<T>, mut f: F) -> Stream<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnMut(T) -> U + Send + 'static,
{
    let pipes = input.pipes().clone();
    let (output, stream) = pipes.stage_channel("map", pipes.config().buffer_size);

    pipes.spawn_stage("map", async move {
        let mut forwarded = 0;
        while let Some(item) = input.next_item().await {
            output.send(f(item)).await?;
            forwarded += 1;
        }
        Ok::<u64, Error>(forwarded)
    });

    stream
}

/// Chain one [`map`] stage per transform.
///
/// Every item comes out as the ordered composition of all transforms, in
/// input order. With no transforms the input is returned as is.
///
/// # Examples
///
/// ```rust
/// use pipey::prelude::*;
///
/// # #[tokio::main]
/// # async fn main() {
/// let pipes = Pipes::new();
/// let stages: Vec<Transform<i32>> = vec![Box::new(|x| x + 1), Box::new(|x| x * 10)];
/// let out = pipes.from_iter(vec![1, 2]).pipeline(stages).collect().await;
/// assert_eq!(out, vec![20, 30]);
/// # }
/// ```
pub fn pipeline<T>(input: Stream<T>, stages: Vec<Transform<T>>) -> Stream<T>
where
    T: Send + 'static,
{
    stages
        .into_iter()
        .fold(input, |stream, stage| map(stream, stage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Pipes;

    fn double(x: i32) -> i32 {
        x * 2
    }

    #[tokio::test]
    async fn test_map_preserves_order() {
        let pipes = Pipes::new();
        let out = map(pipes.from_iter(1..=5), |x: i32| x.to_string()).collect().await;
        assert_eq!(out, vec!["1", "2", "3", "4", "5"]);
    }

    #[tokio::test]
    async fn test_pipeline_doubles_twice() {
        let pipes = Pipes::new();
        let stages: Vec<Transform<i32>> = vec![Box::new(double), Box::new(double)];
        let out = pipeline(pipes.from_iter(vec![1, 2]), stages).collect().await;
        assert_eq!(out, vec![4, 8]);
    }

    #[tokio::test]
    async fn test_pipeline_composes_in_order() {
        let pipes = Pipes::new();
        let stages: Vec<Transform<i32>> = vec![Box::new(|x| x + 1), Box::new(double)];
        let out = pipeline(pipes.from_iter(vec![1, 2, 3]), stages).collect().await;
        // g(f(x)), not f(g(x))
        assert_eq!(out, vec![4, 6, 8]);
    }

    #[tokio::test]
    async fn test_pipeline_without_stages_is_identity() {
        let pipes = Pipes::new();
        let out = pipeline(pipes.from_iter(vec![3, 1, 2]), Vec::new()).collect().await;
        assert_eq!(out, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_panicking_transform_ends_stream_early() {
        let pipes = Pipes::new();
        let out = pipes
            .from_iter(1..=3)
            .map(|x: i32| {
                if x == 2 {
                    panic!("transform failed");
                }
                x
            })
            .collect()
            .await;
        assert_eq!(out, vec![1]);
    }

    #[tokio::test]
    async fn test_truncation_looks_like_normal_closure() {
        let pipes = Pipes::new();
        let mut truncated = pipes.from_iter(1..=3).map(|x: i32| {
            if x == 2 {
                panic!("transform failed");
            }
            x
        });
        let mut complete = pipes.from_iter(1..=1).map(|x: i32| x);

        assert_eq!(truncated.recv().await, Some(1));
        assert_eq!(complete.recv().await, Some(1));
        // Both end with a plain `None`, nothing marks the first as cut short.
        assert_eq!(truncated.recv().await, None);
        assert_eq!(complete.recv().await, None);
        pipes.join().await;
    }
}
