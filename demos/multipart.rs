//! Multipart upload ETag example.
//!
//! Splits an object into parts, hashes each part the way an upload would,
//! and composes the multipart ETag from the part tags.
//!
//! Run with:
//!     cargo run --example multipart

use bytes::Bytes;
use etagrs::{ETag, HashReader, IntegrityError};

const PART_SIZE: usize = 5 * 1024 * 1024;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let object: Vec<u8> = (0..12 * 1024 * 1024).map(|i| (i * 31 % 256) as u8).collect();

    let mut parts = Vec::new();
    for (number, part) in object.chunks(PART_SIZE).enumerate() {
        let chunks = part
            .chunks(64 * 1024)
            .map(|c| Ok::<_, IntegrityError>(Bytes::copy_from_slice(c)));

        let mut reader = HashReader::new(chunks, part.len() as i64, "", "", -1)?;
        for chunk in reader.by_ref() {
            chunk?;
        }

        let tag = reader.etag();
        println!("Part {:>2}: {:>8} bytes, etag {}", number + 1, part.len(), tag);
        parts.push(tag);
    }

    let etag = ETag::multipart(&parts).ok_or("no parts to compose")?;
    println!("\nObject ETag: {}", etag.to_header_value());
    println!("Parts:       {}", etag.part_count()?);

    Ok(())
}
