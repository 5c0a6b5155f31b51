// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use sonar_chart::{Bounds, Chart, ChartConfig, DiscoveredPoint, ManualClock};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }

    fn next_coord(&mut self, spread: u16) -> i16 {
        let offset = (self.next_u32() % u32::from(spread)) as i32;
        (offset - i32::from(spread / 2)) as i16
    }
}

fn gen_points(count: usize, spread: u16, seed: u64) -> Vec<(i16, i16, bool)> {
    let mut rng = Lcg::new(seed);
    (0..count)
        .map(|_| {
            let x = rng.next_coord(spread);
            let y = rng.next_coord(spread);
            (x, y, rng.next_u32() % 4 == 0)
        })
        .collect()
}

fn bench_config(points: usize) -> ChartConfig {
    ChartConfig::default()
        .with_node_capacity(4096)
        .with_point_capacity(points as u16)
}

fn filled_chart(points: &[(i16, i16, bool)]) -> Chart<ManualClock> {
    let mut chart = Chart::new(bench_config(points.len()), ManualClock::new(0))
        .expect("bench chart has nodes");
    for &(x, y, terrain) in points {
        let _ = chart.add_point(x, y, terrain);
    }
    chart
}

fn bench_chart(c: &mut Criterion) {
    let mut group = c.benchmark_group("chart");

    for &n in &[128_usize, 512, 2048] {
        let points = gen_points(n, 16_000, 0x50A7_0000_0000_0001);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_function(BenchmarkId::new("add_point", n), |b| {
            b.iter_batched(
                || {
                    Chart::new(bench_config(n), ManualClock::new(0))
                        .expect("bench chart has nodes")
                },
                |mut chart| {
                    for &(x, y, terrain) in &points {
                        let _ = black_box(chart.add_point(x, y, terrain));
                    }
                    chart
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(BenchmarkId::new("rediscover", n), |b| {
            b.iter_batched(
                || filled_chart(&points),
                |mut chart| {
                    chart.clock().set(500);
                    for &(x, y, terrain) in &points {
                        let _ = black_box(chart.add_point(x, y, !terrain));
                    }
                    chart
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(BenchmarkId::new("query_area", n), |b| {
            let mut chart = filled_chart(&points);
            let mut out = vec![DiscoveredPoint::new(0, 0, false, 0); 256];
            let areas: Vec<_> = gen_points(64, 14_000, 0x50A7_0000_0000_0002)
                .into_iter()
                .map(|(x, y, _)| {
                    Bounds::new(x, y, x.saturating_add(1_000), y.saturating_add(1_000))
                })
                .collect();
            b.iter(|| {
                let mut total = 0;
                for &area in &areas {
                    total += chart.query_area(area, &mut out).count;
                }
                black_box(total)
            });
        });

        group.bench_function(BenchmarkId::new("query_point", n), |b| {
            let chart = filled_chart(&points);
            b.iter(|| {
                let found = points
                    .iter()
                    .filter(|&&(x, y, _)| chart.query_point(x, y).is_some())
                    .count();
                black_box(found)
            });
        });

        group.bench_function(BenchmarkId::new("update_fade", n), |b| {
            b.iter_batched(
                || filled_chart(&points),
                |mut chart| {
                    let stage = chart.config().fade_stage_duration;
                    black_box(chart.update_fade(0));
                    black_box(chart.update_fade(2 * stage));
                    black_box(chart.update_fade(4 * stage));
                    chart
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_chart);
criterion_main!(benches);
