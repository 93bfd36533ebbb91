use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use trackdash_analysis::{
    frequency::value_counts, histogram::Histogram, regression::linear_fit, stats::quartiles,
};

#[allow(clippy::cast_precision_loss)]
fn samples(n: usize) -> Vec<f64> {
    (0..n).map(|i| ((i * 7_919) % 1_000) as f64 / 10.0).collect()
}

fn bench_histogram(c: &mut Criterion) {
    let values = samples(5_000);

    c.bench_function("trackdash-analysis: histogram.rs: Histogram::new", |b| {
        b.iter(|| {
            let _ = black_box(Histogram::new(black_box(&values), 40));
        });
    });
}

fn bench_quartiles(c: &mut Criterion) {
    let values = samples(5_000);

    c.bench_function("trackdash-analysis: stats.rs: quartiles", |b| {
        b.iter(|| {
            let _ = black_box(quartiles(black_box(&values)));
        });
    });
}

fn bench_linear_fit(c: &mut Criterion) {
    let xs = samples(5_000);
    let ys: Vec<f64> = xs.iter().map(|x| 0.6f64.mul_add(*x, 12.0)).collect();

    c.bench_function("trackdash-analysis: regression.rs: linear_fit", |b| {
        b.iter(|| {
            let _ = black_box(linear_fit(black_box(&xs), black_box(&ys)));
        });
    });
}

fn bench_value_counts(c: &mut Criterion) {
    const GENRES: [&str; 8] = [
        "pop", "rock", "hip hop", "edm", "indie", "jazz", "k-pop", "metal",
    ];
    let genres: Vec<&str> = (0..5_000).map(|i| GENRES[(i * 31) % GENRES.len()]).collect();

    c.bench_function("trackdash-analysis: frequency.rs: value_counts", |b| {
        b.iter(|| {
            let _ = black_box(value_counts(black_box(genres.iter().copied())));
        });
    });
}

criterion_group!(
    benches,
    bench_histogram,
    bench_quartiles,
    bench_linear_fit,
    bench_value_counts
);
criterion_main!(benches);
