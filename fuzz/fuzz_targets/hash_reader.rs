#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use etagrs::{ETag, HashReader, IntegrityError, Md5Hasher, Sha256Hasher};

fuzz_target!(|input: (Vec<u8>, u8, u16)| {
    let (data, split, declared) = input;

    // Split the input into chunks of `split` bytes (at least 1)
    let chunks: Vec<Result<Bytes, IntegrityError>> = data
        .chunks(usize::from(split).max(1))
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();

    let size = i64::from(declared);
    let expected_len = data.len().min(usize::from(declared));
    let expected = &data[..expected_len];
    let sha256 = hex::encode(Sha256Hasher::hash(expected));

    let mut reader = HashReader::new(chunks.into_iter(), size, "", &sha256, -1).unwrap();
    let mut out = Vec::new();
    for chunk in reader.by_ref() {
        out.extend_from_slice(&chunk.unwrap());
    }

    // Verify: exactly the declared prefix is forwarded and hashed
    assert_eq!(out, expected);
    assert_eq!(reader.bytes_forwarded(), expected_len as u64);
    assert_eq!(reader.etag(), ETag::from_md5(Md5Hasher::hash(expected)));
    assert!(reader.next().is_none());
});
