//! Benchmarks for the trend analytics.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stockdesk_analysis::{confidence_score, moving_average, predict_trend, rsi, RSI_PERIOD};

fn generate_test_data(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0)
        .collect()
}

fn benchmark_moving_average(c: &mut Criterion) {
    let mut group = c.benchmark_group("MovingAverage");

    for size in [30, 1000, 100000].iter() {
        let data = generate_test_data(*size);

        group.bench_with_input(BenchmarkId::new("period_10", size), &data, |b, data| {
            b.iter(|| moving_average(black_box(data), black_box(10)))
        });
    }

    group.finish();
}

fn benchmark_trend(c: &mut Criterion) {
    let mut group = c.benchmark_group("Trend");

    for size in [30, 1000, 100000].iter() {
        let data = generate_test_data(*size);

        group.bench_with_input(BenchmarkId::new("predict_trend", size), &data, |b, data| {
            b.iter(|| predict_trend(black_box(data)))
        });

        group.bench_with_input(BenchmarkId::new("confidence", size), &data, |b, data| {
            b.iter(|| confidence_score(black_box(data)))
        });
    }

    group.finish();
}

fn benchmark_rsi(c: &mut Criterion) {
    let mut group = c.benchmark_group("RSI");

    for size in [30, 1000, 100000].iter() {
        let data = generate_test_data(*size);

        group.bench_with_input(BenchmarkId::new("standard", size), &data, |b, data| {
            b.iter(|| rsi(black_box(data), black_box(RSI_PERIOD)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_moving_average, benchmark_trend, benchmark_rsi);
criterion_main!(benches);
