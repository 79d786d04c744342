//! Performance benchmarks for the bit-packing layer
//!
//! This benchmark suite evaluates:
//! - Bit read/write throughput for both pack directions
//! - Single-bit vs grouped-bit operations
//! - The cost of layering a bit stream over a buffering wrapper

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxistream_core::bitstream::{BitOrder, BitReader, BitWriter};
use oxistream_core::buffer::BlockReader;
use std::hint::black_box;
use std::io::Cursor;

/// Generate reproducible pseudo-random bytes.
fn random_bytes(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut seed: u64 = 0x123456789ABCDEF0;
    for _ in 0..size {
        // Linear congruential generator
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        data.push((seed >> 32) as u8);
    }
    data
}

fn bench_write_bits(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_bits");
    for order in [BitOrder::Lsb, BitOrder::Msb] {
        for &size in &[1024usize, 64 * 1024] {
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("{order:?}"), size),
                &size,
                |b, &size| {
                    let data = random_bytes(size);
                    b.iter(|| {
                        let mut writer = BitWriter::new(Vec::with_capacity(size + 1), order);
                        for &byte in &data {
                            writer.write_bits(byte as u32, 7).unwrap();
                        }
                        writer.flush().unwrap();
                        black_box(writer.into_inner().unwrap())
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_read_bits(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_bits");
    for order in [BitOrder::Lsb, BitOrder::Msb] {
        let data = random_bytes(64 * 1024);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(
            BenchmarkId::new(format!("{order:?}"), data.len()),
            &data,
            |b, data| {
                b.iter(|| {
                    let mut reader = BitReader::new(Cursor::new(data), order);
                    let mut acc = 0u64;
                    while let Some(bits) = reader.read_bits(11).unwrap() {
                        acc = acc.wrapping_add(bits as u64);
                    }
                    black_box(acc)
                });
            },
        );
    }
    group.finish();
}

fn bench_single_bits_over_buffered(c: &mut Criterion) {
    let data = random_bytes(16 * 1024);
    let mut group = c.benchmark_group("single_bits");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("bare_cursor", |b| {
        b.iter(|| {
            let mut reader = BitReader::new(Cursor::new(&data), BitOrder::Lsb);
            let mut ones = 0u64;
            while let Some(bit) = reader.read_bit().unwrap() {
                ones += bit as u64;
            }
            black_box(ones)
        });
    });
    group.bench_function("block_reader", |b| {
        b.iter(|| {
            let buffered = BlockReader::with_capacity(Cursor::new(&data), 4096);
            let mut reader = BitReader::new(buffered, BitOrder::Lsb);
            let mut ones = 0u64;
            while let Some(bit) = reader.read_bit().unwrap() {
                ones += bit as u64;
            }
            black_box(ones)
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_write_bits,
    bench_read_bits,
    bench_single_bits_over_buffered
);
criterion_main!(benches);
