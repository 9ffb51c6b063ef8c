//! Criterion benchmarks for the hashing core.
//!
//! Run with:
//!   cargo bench --bench kdf
//!
//! Memory throughput dominates; the multiply-chain benchmarks show how much
//! CPU hardening costs on top of the memory pass.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mhkdf::{hash_password_extended, HashType, Params};

fn params(stop_mem_cost: u8, multiplies: u8) -> Params {
    Params {
        hash_type: HashType::Blake2s,
        start_mem_cost: stop_mem_cost,
        stop_mem_cost,
        multiplies,
        parallelism: 2,
        overwrite_cost: 0,
        ..Params::default()
    }
}

fn bench_memory_ladder(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_ladder");
    for &mem_cost in &[10u8, 14, 17] {
        group.throughput(Throughput::Bytes(1024 << mem_cost));
        group.bench_with_input(
            BenchmarkId::new("blake2s", 1u64 << mem_cost),
            &params(mem_cost, 2),
            |b, p| {
                b.iter(|| {
                    let mut hash = [0u8; 32];
                    let mut password = *b"password";
                    hash_password_extended(&mut hash, &mut password, b"salt", &mut [], p, false, false)
                        .unwrap();
                    hash
                })
            },
        );
    }
    group.finish();
}

fn bench_multiply_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("multiply_chain");
    for &multiplies in &[0u8, 2, 8] {
        group.bench_with_input(
            BenchmarkId::new("mem_cost_14", multiplies),
            &params(14, multiplies),
            |b, p| {
                b.iter(|| {
                    let mut hash = [0u8; 32];
                    let mut password = *b"password";
                    hash_password_extended(&mut hash, &mut password, b"salt", &mut [], p, false, false)
                        .unwrap();
                    hash
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_memory_ladder, bench_multiply_chain);
criterion_main!(benches);
