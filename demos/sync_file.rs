//! File ETag example.
//!
//! Prints the ETag and Content-MD5 of a file, optionally verifying it
//! against an expected ETag.
//!
//! Run with:
//!     cargo run --example sync_file -- /path/to/file [expected-etag]

use std::env;
use std::fs::File;

use etagrs::{ETag, ETagReader, ReadSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "Cargo.toml".to_string());
    let expected = args.next().map(|s| ETag::parse(&s, true)).transpose()?;

    println!("Hashing file: {}\n", path);

    let file = File::open(&path)?;
    let metadata = file.metadata()?;
    println!("File size: {} bytes", metadata.len());

    let mut reader = ETagReader::new(ReadSource::new(file), expected);
    for chunk in reader.by_ref() {
        chunk?;
    }

    let etag = reader.etag();
    println!("ETag:        {}", etag.to_header_value());
    println!("Content-MD5: {}", etag.to_content_md5()?);
    if reader.expected().is_some() {
        println!("Matches expected ETag");
    }

    Ok(())
}
