//! Criterion benchmarks for the extent codec and exchange path.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use seam_comm::format::{decode_extents, encode_extents, ExtentRecord};
use seam_rs::{exchange_extents, Extent, SerialComm};

/// A row of adjacent partitions along i.
fn make_records(n: usize) -> Vec<ExtentRecord> {
    (0..n)
        .map(|g| ExtentRecord {
            id: g as u32,
            extent: Extent::new(g as i32 * 8, g as i32 * 8 + 8, 0, 8, 0, 8),
        })
        .collect()
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("extent_codec");
    for &n in &[16usize, 256, 4096] {
        let records = make_records(n);
        let encoded = encode_extents(&records);

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("encode", n), &records, |b, records| {
            b.iter(|| black_box(encode_extents(black_box(records))))
        });
        group.bench_with_input(BenchmarkId::new("decode", n), &encoded, |b, encoded| {
            b.iter(|| black_box(decode_extents(black_box(encoded)).unwrap()))
        });
    }
    group.finish();
}

fn bench_serial_exchange(c: &mut Criterion) {
    let mut group = c.benchmark_group("serial_exchange");
    for &n in &[16usize, 256] {
        let local: Vec<(u32, Extent)> = make_records(n)
            .into_iter()
            .map(|r| (r.id, r.extent))
            .collect();

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("resolve", n), &local, |b, local| {
            b.iter(|| {
                let mut comm = SerialComm::new();
                black_box(exchange_extents(black_box(local), local.len(), &mut comm).unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_codec, bench_serial_exchange);
criterion_main!(benches);
