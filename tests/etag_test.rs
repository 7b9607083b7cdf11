// Integration tests for the ETag value type
// Tests cover: parse/format round trips, strict validation, multipart composition

use bytes::Bytes;
use etagrs::{ETag, HashReader, IntegrityError, MAX_PARTS, Md5Hasher};
use proptest::prelude::*;
use rstest::rstest;

// ============================================================================
// Parsing Tests
// ============================================================================

#[rstest]
#[case::simple("d41d8cd98f00b204e9800998ecf8427e", 16, false)]
#[case::quoted_simple("\"d41d8cd98f00b204e9800998ecf8427e\"", 16, false)]
#[case::multipart("d41d8cd98f00b204e9800998ecf8427e-5", 18, true)]
#[case::quoted_multipart("\"d41d8cd98f00b204e9800998ecf8427e-5\"", 18, true)]
#[case::max_parts("d41d8cd98f00b204e9800998ecf8427e-10000", 22, true)]
fn test_strict_parse_accepts(#[case] input: &str, #[case] len: usize, #[case] multipart: bool) {
    let tag = ETag::parse(input, true).unwrap();
    assert_eq!(tag.len(), len);
    assert_eq!(tag.is_multipart(), multipart);
    assert!(!tag.is_encrypted());
    assert!(tag.part_count().unwrap() <= MAX_PARTS);
}

#[rstest]
#[case::too_short("d41d8cd98f00b204e9800998ecf8427")]
#[case::too_long("d41d8cd98f00b204e9800998ecf8427e00")]
#[case::not_hex("g41d8cd98f00b204e9800998ecf8427e")]
#[case::short_prefix("d41d8cd98f00b204e9800998ecf842-5")]
#[case::no_part_number("d41d8cd98f00b204e9800998ecf8427e-")]
#[case::zero_parts("d41d8cd98f00b204e9800998ecf8427e-0")]
#[case::too_many_parts("d41d8cd98f00b204e9800998ecf8427e-10001")]
#[case::non_numeric_parts("d41d8cd98f00b204e9800998ecf8427e-five")]
fn test_strict_parse_rejects(#[case] input: &str) {
    assert!(matches!(
        ETag::parse(input, true),
        Err(IntegrityError::Format(_))
    ));
}

#[test]
fn test_non_strict_parse_of_encrypted_tag() {
    let hex = "0123456789abcdef".repeat(4);
    let tag: ETag = hex.parse().unwrap();
    assert!(tag.is_encrypted());
    assert!(!tag.is_multipart());
    assert_eq!(tag.part_count().unwrap(), 1);
    assert_eq!(tag.to_string(), hex);
}

// ============================================================================
// Multipart Composition Tests
// ============================================================================

#[test]
fn test_multipart_from_reader_etags() {
    let parts = [&b"first part"[..], &b"second part"[..], &b"third"[..]];

    let tags: Vec<ETag> = parts
        .iter()
        .map(|part| {
            let chunks = vec![Ok::<_, IntegrityError>(Bytes::copy_from_slice(part))];
            let mut reader = HashReader::new(chunks.into_iter(), -1, "", "", -1).unwrap();
            for chunk in reader.by_ref() {
                chunk.unwrap();
            }
            reader.etag()
        })
        .collect();

    let tag = ETag::multipart(&tags).unwrap();
    assert!(tag.is_multipart());
    assert_eq!(tag.part_count().unwrap(), 3);
    assert!(tag.to_string().ends_with("-3"));

    let mut concat = Vec::new();
    for part in parts {
        concat.extend_from_slice(&Md5Hasher::hash(part));
    }
    assert_eq!(&tag.as_bytes()[..16], &Md5Hasher::hash(&concat));

    let reparsed = ETag::parse(&tag.to_header_value(), true).unwrap();
    assert_eq!(reparsed, tag);
}

#[test]
fn test_multipart_skips_ineligible_entries() {
    let simple = ETag::from_md5(Md5Hasher::hash(b"x"));
    let multi = ETag::parse("d41d8cd98f00b204e9800998ecf8427e-2", true).unwrap();
    let encrypted = ETag::from_raw_bytes(vec![0x11; 40]);

    assert!(ETag::multipart([&multi, &encrypted]).is_none());

    let tag = ETag::multipart([&multi, &simple, &encrypted]).unwrap();
    assert_eq!(tag.part_count().unwrap(), 1);
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_md5_tag_round_trips(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let tag = ETag::from_md5(Md5Hasher::hash(&data));
        let parsed = ETag::parse(&tag.to_hex_string(), true).unwrap();
        prop_assert_eq!(parsed, tag);
    }

    #[test]
    fn prop_multipart_tag_round_trips(digest in any::<[u8; 16]>(), parts in 1u32..=MAX_PARTS) {
        let text = format!("{}-{parts}", hex::encode(digest));
        let tag = ETag::parse(&text, true).unwrap();
        prop_assert_eq!(tag.part_count().unwrap(), parts);
        prop_assert_eq!(tag.to_string(), text);
    }

    #[test]
    fn prop_equality_is_bytewise(a in any::<[u8; 16]>(), b in any::<[u8; 16]>()) {
        let left = ETag::from_md5(a);
        let right = ETag::from_raw_bytes(b.to_vec());
        prop_assert_eq!(left == right, a == b);
        prop_assert_eq!(left == right, right == left);
    }
}
