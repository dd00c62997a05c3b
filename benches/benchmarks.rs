use std::iter;

use bloomer::BloomFilter;
use criterion::Criterion;

fn key() -> String {
    let rng = fastrand::Rng::new();
    iter::repeat_with(|| rng.alphanumeric()).take(32).collect()
}

fn populate(bf: &mut BloomFilter, n: u64) -> Vec<String> {
    let items: Vec<String> = (0..n).map(|_| key()).collect();
    for item in &items {
        bf.insert(item);
    }
    items
}

fn bench_bloom_filter_insert(c: &mut Criterion) {
    c.bench_function("insert-1000", |b| {
        let mut bf = BloomFilter::with_capacity(1000);

        b.iter(|| {
            let item = key();
            bf.insert(&item);
        });
    });

    c.bench_function("insert-10000", |b| {
        let mut bf = BloomFilter::with_capacity(10000);

        b.iter(|| {
            let item = key();
            bf.insert(&item);
        });
    });
}

fn bench_bloom_filter_check(c: &mut Criterion) {
    c.bench_function("check-10000", |b| {
        let n = 10000;
        let mut bf = BloomFilter::new(n, 0.001);
        populate(&mut bf, n);

        b.iter(|| {
            let item = key();
            bf.contains(&item);
        });
    });

    c.bench_function("check-fingerprint-100000", |b| {
        let n = 100000;
        let mut bf = BloomFilter::new(n, 0.001);
        let items = populate(&mut bf, n);
        let rng = fastrand::Rng::new();
        let mut fingerprint = Vec::new();

        b.iter(|| {
            let item = &items[rng.usize(..items.len())];
            bf.fingerprint_into(item, &mut fingerprint);
            bf.contains_fingerprint(&fingerprint);
        });
    });
}

fn bench_bloom_filter_codec(c: &mut Criterion) {
    c.bench_function("serialize-100000", |b| {
        let n = 100000;
        let mut bf = BloomFilter::new(n, 0.001);
        populate(&mut bf, n);

        b.iter(|| bf.to_bytes());
    });

    c.bench_function("deserialize-100000", |b| {
        let n = 100000;
        let mut bf = BloomFilter::new(n, 0.001);
        populate(&mut bf, n);
        let bytes = bf.to_bytes();

        b.iter(|| BloomFilter::from_bytes(&bytes));
    });
}

criterion::criterion_group!(
    benches,
    bench_bloom_filter_insert,
    bench_bloom_filter_check,
    bench_bloom_filter_codec
);
criterion::criterion_main!(benches);
