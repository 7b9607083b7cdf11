//! Async file hashing with tokio.
//!
//! Hashes several files concurrently, adapting tokio readers with
//! `tokio_util::compat`.
//!
//! Run with:
//!     cargo run --example async_tokio --features async-io -- file1 file2 ...

use etagrs::{ETag, HashStream, IntegrityError, ReadStream};
use futures_util::StreamExt;
use tokio_util::compat::TokioAsyncReadCompatExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        paths = vec!["Cargo.toml".to_string(), "README.md".to_string()];
    }

    println!("Hashing {} files concurrently...\n", paths.len());

    let handles: Vec<_> = paths
        .into_iter()
        .map(|path| tokio::spawn(async move { (hash_file(&path).await, path) }))
        .collect();

    for handle in handles {
        match handle.await? {
            (Ok((etag, bytes)), path) => println!("{path}: {bytes} bytes, etag {etag}"),
            (Err(e), path) => println!("{path}: {e}"),
        }
    }

    Ok(())
}

async fn hash_file(path: &str) -> Result<(ETag, u64), IntegrityError> {
    let file = tokio::fs::File::open(path).await?;
    let mut stream = HashStream::new(ReadStream::new(file.compat()), -1, "", "", -1)?;

    while let Some(chunk) = stream.next().await {
        chunk?;
    }
    Ok((stream.etag(), stream.bytes_forwarded()))
}
