// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sonar_raycast::{LineStepper, PatternKind, Raycaster, RaycasterConfig};

/// Open water with a ring of islands every 32 cells.
fn islands(x: i16, y: i16) -> bool {
    let (cx, cy) = (i32::from(x).rem_euclid(32) - 16, i32::from(y).rem_euclid(32) - 16);
    cx * cx + cy * cy <= 36
}

fn open_water(_x: i16, _y: i16) -> bool {
    false
}

fn bench_raycast(c: &mut Criterion) {
    let mut group = c.benchmark_group("raycast");

    for &len in &[16_i16, 64, 256] {
        group.throughput(Throughput::Elements(len as u64 + 1));
        group.bench_function(BenchmarkId::new("line_stepper", len), |b| {
            b.iter(|| {
                let sum: i32 = LineStepper::new((0, 0), black_box((len, len / 3)))
                    .map(|(x, y)| i32::from(x) ^ i32::from(y))
                    .sum();
                black_box(sum)
            });
        });
    }

    for kind in [PatternKind::Full, PatternKind::Forward, PatternKind::Sparse] {
        let mut raycaster = Raycaster::new(RaycasterConfig::default().with_initial_quality(0));
        let pattern = *raycaster.pattern(kind);
        group.throughput(Throughput::Elements(pattern.len() as u64));

        group.bench_function(BenchmarkId::new("pattern_open_water", format!("{kind:?}")), |b| {
            b.iter(|| black_box(raycaster.cast_pattern(&pattern, black_box((0, 0)), &open_water)));
        });

        group.bench_function(BenchmarkId::new("pattern_islands", format!("{kind:?}")), |b| {
            b.iter(|| black_box(raycaster.cast_pattern(&pattern, black_box((3, -5)), &islands)));
        });
    }

    for level in 0..=3_u8 {
        let mut raycaster = Raycaster::new(RaycasterConfig::default().with_initial_quality(level));
        group.bench_function(BenchmarkId::new("adaptive", level), |b| {
            b.iter(|| black_box(raycaster.cast_adaptive(black_box((7, 7)), false, &islands)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_raycast);
criterion_main!(benches);
