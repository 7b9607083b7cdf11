#![no_main]

use libfuzzer_sys::fuzz_target;
use etagrs::{ETag, MAX_PARTS};

fuzz_target!(|input: &str| {
    // Must never panic, whatever the input
    let lenient = ETag::parse(input, false);
    let strict = ETag::parse(input, true);

    if let Ok(tag) = strict {
        // Verify: strict tags are simple or multipart with a sane part count
        assert!(tag.len() == 16 || tag.is_multipart());
        let parts = tag.part_count().unwrap();
        assert!((1..=MAX_PARTS).contains(&parts));

        // Verify: strict implies lenient, with the same result
        assert_eq!(lenient.as_ref().ok(), Some(&tag));

        // Verify: the formatted form parses back to the same tag
        let reparsed = ETag::parse(&tag.to_header_value(), true).unwrap();
        assert_eq!(reparsed, tag);
    }

    if let Ok(tag) = lenient {
        let _ = tag.part_count();
        let _ = tag.to_content_md5();
        let _ = tag.to_string();
    }
});
