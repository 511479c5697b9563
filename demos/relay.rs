//! End-to-end relay over an in-memory stream log.
//!
//! Ten messages and a sentinel are written to an input key. A listener feeds
//! them through a two-stage pipeline, a map and a filter, then the result is
//! fanned out to two output keys.

use pipey::prelude::*;

/// Keys the relay reads from and writes to
struct RelayConfig {
    input_key: String,
    output_keys: [String; 2],
    messages: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            input_key: "test".to_string(),
            output_keys: ["output:a".to_string(), "output:b".to_string()],
            messages: 10,
        }
    }
}

fn suffix(label: &'static str) -> Transform<Vec<u8>> {
    Box::new(move |mut data: Vec<u8>| {
        data.extend_from_slice(label.as_bytes());
        data
    })
}

/// Copy a stream into a log key until it closes
async fn write_all(log: MemoryLog, key: String, stream: Stream<Vec<u8>>) -> Result<()> {
    let mut stream = stream;
    while let Some(data) = stream.recv().await {
        log.write(&key, &data).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Relay Example ===");

    let config = RelayConfig::default();
    let pipes = Pipes::new().buffer_size(4);
    let log = MemoryLog::new(&pipes, LogConfig::default());

    let input = log.listen(&config.input_key).await?;

    let writer = log.clone();
    let input_key = config.input_key.clone();
    let messages = config.messages;
    let producer = tokio::spawn(async move {
        for i in 0..messages {
            let data = format!("Hello world {i}");
            writer.write(&input_key, data.as_bytes()).await?;
        }
        let sentinel = writer.config().sentinel.clone();
        writer.write(&input_key, &sentinel).await
    });

    let filtered = fan_in(vec![input])
        .pipeline(vec![suffix(" processed")])
        .map(|mut data: Vec<u8>| {
            data.extend_from_slice(b" mapped");
            data
        })
        .filter(|data| data.as_slice() != b"Hello world 2 processed mapped");

    let (mut outs, completion) = filtered.replicate(2);
    let (Some(out_b), Some(out_a)) = (outs.pop(), outs.pop()) else {
        return Err(Error::custom("replicate returned too few outputs"));
    };
    let [key_a, key_b] = config.output_keys.clone();

    let (a, b, done) = tokio::join!(
        write_all(log.clone(), key_a, out_a),
        write_all(log.clone(), key_b, out_b),
        completion
    );
    a?;
    b?;
    done?;
    producer
        .await
        .map_err(|e| Error::custom(format!("producer task failed: {e}")))??;

    for key in &config.output_keys {
        println!("{key}:");
        for entry in log.entries(key).await {
            println!("  {}", String::from_utf8_lossy(&entry));
        }
    }

    pipes.join().await;
    println!("Relay completed!");
    Ok(())
}
