//! Benchmarks for token codec and cache hot paths

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessera_auth_core::{checksum_of, swap_pairs, LocalTokenCache, TokenCodec, TokenServiceConfig};
use tessera_types::{UserId, UserType};

fn bench_codec(c: &mut Criterion) {
    let codec = TokenCodec::new();
    let token = codec
        .encode(UserId(42), UserType::Member, "10.0.0.5")
        .unwrap();

    let mut group = c.benchmark_group("token_codec");

    group.bench_function("encode", |b| {
        b.iter(|| codec.encode(black_box(UserId(42)), UserType::Member, black_box("10.0.0.5")));
    });

    group.bench_function("decode", |b| {
        b.iter(|| codec.decode(black_box(token.as_str())));
    });

    let mut tampered = token.as_str().to_string();
    tampered.replace_range(0..1, if tampered.starts_with('0') { "1" } else { "0" });
    group.bench_function("decode_bad_checksum", |b| {
        b.iter(|| codec.decode(black_box(&tampered)));
    });

    group.finish();
}

fn bench_transforms(c: &mut Criterion) {
    let mut group = c.benchmark_group("token_transforms");

    for size in [16, 32, 64, 128] {
        let payload: String = "AbCdEfGh".repeat(size / 8);

        group.bench_with_input(BenchmarkId::new("checksum", size), &payload, |b, p| {
            b.iter(|| checksum_of(black_box(p)));
        });

        group.bench_with_input(BenchmarkId::new("swap_pairs", size), &payload, |b, p| {
            b.iter(|| swap_pairs(black_box(p)));
        });
    }

    group.finish();
}

fn bench_token_cache(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let cache = LocalTokenCache::new(&TokenServiceConfig::default());
    let token = TokenCodec::new()
        .encode(UserId(42), UserType::Member, "10.0.0.5")
        .unwrap();
    runtime.block_on(cache.put(token.as_str(), UserId(42)));

    c.bench_function("token_cache_hit", |b| {
        b.to_async(&runtime)
            .iter(|| async { cache.get(black_box(token.as_str())).await });
    });
}

criterion_group!(benches, bench_codec, bench_transforms, bench_token_cache);
criterion_main!(benches);
