//! Async hashing stream example.
//!
//! Feeds simulated network batches through a `HashStream` and merges a
//! SHA-256 expectation into the stream before polling it.
//!
//! Run with:
//!     cargo run --example async_stream --features async-io

use bytes::Bytes;
use etagrs::{HashStream, IntegrityError, Sha256Hasher, Upstream, new_stream};
use futures_util::StreamExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let data: Vec<u8> = (0..100_000).map(|i| (i % 256) as u8).collect();
    let sha256 = hex::encode(Sha256Hasher::hash(&data));

    println!("Streaming {} bytes of data...\n", data.len());

    // Simulate network batches arriving with a delay
    let batches: Vec<Bytes> = data.chunks(8192).map(Bytes::copy_from_slice).collect();
    let source = futures_util::stream::iter(batches).then(|batch| async move {
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        Ok::<_, IntegrityError>(batch)
    });
    let source = Box::pin(source);

    // A lower layer knows the size, a higher layer knows the checksum
    let inner = HashStream::new(source, data.len() as i64, "", "", -1)?;
    let mut stream = new_stream(Upstream::Reader(inner), -1, "", &sha256, -1)?;

    let mut total_bytes = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        total_bytes += chunk.len();
        println!("Received chunk: {} bytes", chunk.len());
    }

    println!("\nTotal: {} bytes", total_bytes);
    println!("ETag:  {}", stream.etag());

    Ok(())
}
