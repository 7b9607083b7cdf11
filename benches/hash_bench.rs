//! Benchmarks for etagrs.
//!
//! Run with:
//!     cargo bench

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use etagrs::{ETag, HashReader, Md5Hasher, ReadSource, SourceConfig};

fn bench_hash_reader(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_reader");

    for size in [64 * 1024, 1024 * 1024, 10 * 1024 * 1024] {
        // Deterministic pseudo-random data
        let data: Vec<u8> = (0..size).map(|i| (i * 7 + 13) as u8).collect();
        let sha256 = hex::encode(etagrs::Sha256Hasher::hash(&data));

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(format!("md5_{}kb", size / 1024), &data, |b, data| {
            b.iter(|| {
                let source = ReadSource::new(black_box(&data[..]));
                let mut reader = HashReader::new(source, -1, "", "", -1).unwrap();
                for chunk in reader.by_ref() {
                    black_box(chunk.unwrap());
                }
                black_box(reader.etag())
            });
        });

        group.bench_with_input(format!("md5_sha256_{}kb", size / 1024), &data, |b, data| {
            b.iter(|| {
                let source = ReadSource::new(black_box(&data[..]));
                let mut reader = HashReader::new(source, -1, "", &sha256, -1).unwrap();
                for chunk in reader.by_ref() {
                    black_box(chunk.unwrap());
                }
                black_box(reader.etag())
            });
        });
    }

    group.finish();
}

fn bench_buffer_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_sizes");
    let size = 1024 * 1024; // 1 MB
    let data: Vec<u8> = (0..size).map(|i| (i * 7 + 13) as u8).collect();

    group.throughput(Throughput::Bytes(size as u64));
    for buffer_size in [4 * 1024, 8 * 1024, 64 * 1024, 256 * 1024] {
        let config = SourceConfig::new(buffer_size).unwrap();
        group.bench_function(format!("{}kb", buffer_size / 1024), |b| {
            b.iter(|| {
                let source = ReadSource::with_config(black_box(&data[..]), config);
                let mut reader = HashReader::new(source, -1, "", "", -1).unwrap();
                let mut total = 0usize;
                for chunk in reader.by_ref() {
                    total += chunk.unwrap().len();
                }
                black_box(total)
            });
        });
    }

    group.finish();
}

fn bench_etag(c: &mut Criterion) {
    let mut group = c.benchmark_group("etag");

    let parts: Vec<ETag> = (0..1000u32)
        .map(|i| ETag::from_md5(Md5Hasher::hash(&i.to_le_bytes())))
        .collect();
    group.bench_function("multipart_1000", |b| {
        b.iter(|| black_box(ETag::multipart(black_box(&parts))))
    });

    group.bench_function("parse_strict", |b| {
        b.iter(|| ETag::parse(black_box("\"d41d8cd98f00b204e9800998ecf8427e-5\""), true).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_hash_reader, bench_buffer_sizes, bench_etag);
criterion_main!(benches);
