mod common;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bitscan_engine::primitive;

fn bench_popcount(c: &mut Criterion) {
    let words: Vec<u64> = (0..10_000u64).map(|i| i.wrapping_mul(0x9E3779B97F4A7C15)).collect();
    c.bench_function("popcount/10k_words", |b| {
        b.iter(|| {
            let mut sum = 0u32;
            for &w in black_box(&words) {
                sum = sum.wrapping_add(primitive::popcount(w));
            }
            sum
        })
    });
}

fn bench_lsb_msb(c: &mut Criterion) {
    let words: Vec<u64> = (1..10_000u64).map(|i| i.wrapping_mul(0x9E3779B97F4A7C15) | 1).collect();
    c.bench_function("lsb/10k_words", |b| {
        b.iter(|| {
            let mut sum = 0u32;
            for &w in black_box(&words) {
                sum = sum.wrapping_add(primitive::lsb(w).unwrap_or(0));
            }
            sum
        })
    });
    c.bench_function("msb/10k_words", |b| {
        b.iter(|| {
            let mut sum = 0u32;
            for &w in black_box(&words) {
                sum = sum.wrapping_add(primitive::msb(w).unwrap_or(0));
            }
            sum
        })
    });
}

fn bench_debruijn_vs_hardware(c: &mut Criterion) {
    let words: Vec<u64> = (1..10_000u64).map(|i| i.wrapping_mul(0x9E3779B97F4A7C15) | 1).collect();
    c.bench_function("lsb_debruijn/10k_words", |b| {
        b.iter(|| {
            let mut sum = 0u32;
            for &w in black_box(&words) {
                sum = sum.wrapping_add(bitscan_engine::debruijn::lsb64(w).unwrap_or(0));
            }
            sum
        })
    });
}

criterion_group!(benches, bench_popcount, bench_lsb_msb, bench_debruijn_vs_hardware);
criterion_main!(benches);
