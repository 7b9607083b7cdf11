//! Basic hashing reader example.
//!
//! Hashes an in-memory object, truncates it to a declared size and checks
//! a SHA-256 reference.
//!
//! Run with:
//!     cargo run --example sync_basic

use etagrs::{HashReader, ReadSource, Sha256Hasher, SourceConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1 MB object followed by trailing bytes that must not be forwarded
    let object: Vec<u8> = (0..1024 * 1024).map(|i| (i % 251) as u8).collect();
    let mut body = object.clone();
    body.extend_from_slice(b"trailing garbage");

    let sha256 = hex::encode(Sha256Hasher::hash(&object));
    let config = SourceConfig::new(64 * 1024)?;

    let source = ReadSource::with_config(&body[..], config);
    let mut reader = HashReader::new(source, object.len() as i64, "", &sha256, -1)?;

    println!("Reading {} bytes (declared {})...\n", body.len(), reader.size());

    let mut total_chunks = 0;
    let mut total_bytes = 0;
    for chunk in reader.by_ref() {
        let chunk = chunk?;
        total_chunks += 1;
        total_bytes += chunk.len();
    }

    println!("Forwarded: {} chunks, {} bytes", total_chunks, total_bytes);
    println!("Consumed:  {} bytes", reader.bytes_consumed());
    println!("ETag:      {}", reader.etag());
    println!("SHA-256:   {} (verified)", reader.sha256_hex());

    Ok(())
}
