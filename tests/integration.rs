//! Integration tests for pipey stages wired into whole pipelines

use std::time::Duration;
use pipey::prelude::*;

fn double(x: i32) -> i32 {
    x * 2
}

#[tokio::test]
async fn test_batch_scenario() {
    let pipes = Pipes::new();
    let batches = batch(pipes.from_iter(vec![1, 2, 3]), 2).unwrap();
    assert_eq!(batches.collect().await, vec![vec![1, 2], vec![3]]);
}

#[tokio::test]
async fn test_fan_out_scenario() {
    let pipes = Pipes::new();
    let (out_1, stream_1) = pipes.channel();
    let (out_2, stream_2) = pipes.channel();
    let completion = fan_out(pipes.from_iter(vec![1, 2, 3]), vec![out_1, out_2]);

    let (first, second) = tokio::join!(stream_1.collect(), stream_2.collect());
    assert_eq!(first, vec![1, 2, 3]);
    assert_eq!(second, vec![1, 2, 3]);
    completion.await.unwrap();
}

#[tokio::test]
async fn test_pipeline_scenario() {
    let pipes = Pipes::new();
    let stages: Vec<Transform<i32>> = vec![Box::new(double), Box::new(double)];
    let out = pipeline(pipes.from_iter(vec![1, 2]), stages).collect().await;
    assert_eq!(out, vec![4, 8]);
}

#[tokio::test]
async fn test_filter_scenario() {
    let pipes = Pipes::new();
    let out = filter(pipes.from_iter(vec![1, 2, 3]), |x| *x != 2)
        .collect()
        .await;
    assert_eq!(out, vec![1, 3]);
}

#[tokio::test]
async fn test_fan_in_scenario() {
    let pipes = Pipes::new();
    let a = pipes.from_iter(vec![1, 2, 3]);
    let b = pipes.from_iter(Vec::new());
    assert_eq!(fan_in(vec![a, b]).collect().await, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_catch_scenario() {
    let pipes = Pipes::new();
    let results = catch(pipes.from_iter(vec![1, 2, 3]), |_: i32| {
        (1, Some(Error::custom("test")))
    })
    .collect()
    .await;

    assert_eq!(results.len(), 3);
    for caught in &results {
        assert_eq!(caught.value, 1);
        assert!(matches!(&caught.error, Some(Error::Custom(msg)) if msg == "test"));
    }
    assert_eq!(
        results.into_iter().map(|caught| caught.value).collect::<Vec<_>>(),
        vec![1, 1, 1]
    );
}

#[tokio::test]
async fn test_merge_then_map_keeps_per_source_order() {
    let pipes = Pipes::new();
    let merged = pipes
        .from_iter(vec![1, 3, 5])
        .merge(vec![pipes.from_iter(vec![2, 4, 6])]);
    let out = merged.map(double).collect().await;

    assert_eq!(out.len(), 6);
    let odd: Vec<_> = out.iter().copied().filter(|x| x % 4 != 0).collect();
    let even: Vec<_> = out.iter().copied().filter(|x| x % 4 == 0).collect();
    assert_eq!(odd, vec![2, 6, 10]);
    assert_eq!(even, vec![4, 8, 12]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_full_graph() {
    let pipes = Pipes::new().buffer_size(8);

    let squared = pipes
        .from_iter(1..=100)
        .worker_pool(|x: u64| x * x, 4)
        .unwrap();
    let (mut branches, completion) = squared.replicate(2);
    let evens = branches.pop().unwrap().filter(|x| x % 2 == 0);
    let sums = branches.pop().unwrap().batch(10).unwrap().map(|b| b.iter().sum::<u64>());

    let (evens, sums, done) = tokio::join!(evens.collect(), sums.collect(), completion);
    done.unwrap();

    assert_eq!(evens.len(), 50);
    assert_eq!(sums.len(), 10);
    assert_eq!(sums.iter().sum::<u64>(), (1..=100u64).map(|x| x * x).sum::<u64>());
}

#[tokio::test]
async fn test_catch_lets_pipeline_continue() {
    let pipes = Pipes::new();
    let parsed = pipes
        .from_iter(vec!["4", "four", "2"])
        .try_catch(|s: &str| s.parse::<i32>())
        .filter(|r| r.is_ok())
        .map(|r| r.unwrap_or_default())
        .collect()
        .await;
    assert_eq!(parsed, vec![4, 2]);
}

#[tokio::test]
async fn test_cancel_cascades_through_stages() {
    let pipes = Pipes::new();
    let mut out = pipes
        .from_iter(0u64..)
        .map(|x| x + 1)
        .filter(|x| x % 2 == 0)
        .batch(4)
        .unwrap();

    assert_eq!(out.recv().await, Some(vec![2, 4, 6, 8]));
    pipes.cancel();

    // Every stage stops on its own; the output then closes.
    tokio::time::timeout(Duration::from_secs(1), async {
        while out.recv().await.is_some() {}
    })
    .await
    .unwrap();
    tokio::time::timeout(Duration::from_secs(1), pipes.join())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_source_closure_cascades_without_cancel() {
    let pipes = Pipes::new();
    let (source, input) = pipes.channel();
    let out = input.map(double).filter(|x| *x > 2).batch(3).unwrap();

    let consumer = tokio::spawn(out.collect());
    for i in 0..5 {
        source.send(i).await.unwrap();
    }
    source.close();

    assert_eq!(consumer.await.unwrap(), vec![vec![4, 6, 8]]);
    pipes.join().await;
}

#[tokio::test]
async fn test_log_relay() {
    let pipes = Pipes::new();
    let log = MemoryLog::new(&pipes, LogConfig::default().sentinel("STOP"));
    for i in 0..3 {
        log.write("in", format!("m{i}").as_bytes()).await.unwrap();
    }
    log.write("in", b"STOP").await.unwrap();

    let mut upper = log
        .listen("in")
        .await
        .unwrap()
        .map(|data| data.to_ascii_uppercase());
    while let Some(data) = upper.recv().await {
        log.write("out", &data).await.unwrap();
    }

    assert_eq!(
        log.entries("out").await,
        vec![b"M0".to_vec(), b"M1".to_vec(), b"M2".to_vec()]
    );
}

#[tokio::test]
async fn test_config_errors_are_synchronous() {
    let pipes = Pipes::new();
    assert!(pipes.from_iter(vec![1]).batch(0).unwrap_err().is_config());
    assert!(pipes
        .from_iter(vec![1])
        .worker_pool(double, 0)
        .unwrap_err()
        .is_config());
}
