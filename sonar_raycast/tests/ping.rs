// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A sonar ping feeding a chart, end to end.

use std::collections::{BTreeMap, BTreeSet};

use sonar_chart::{Bounds, Chart, ChartConfig, DiscoveredPoint, ManualClock};
use sonar_raycast::{
    CollisionPredicate, Direction, FIXED_POINT_SCALE, LineStepper, PatternKind, RayPattern,
    Raycaster, RaycasterConfig,
};

fn wall(x: i16, _y: i16) -> bool {
    x >= 5
}

fn five_cells(x: i16, y: i16) -> bool {
    matches!((x, y), (5, 0) | (0, 5) | (-5, 0) | (0, -5) | (3, 3))
}

fn chart() -> Chart<ManualClock> {
    let config = ChartConfig::default()
        .with_root_bounds(Bounds::new(-64, -64, 63, 63))
        .with_node_capacity(1024);
    Chart::new(config, ManualClock::new(0)).unwrap()
}

/// Last cell of a ray of `reach` cells from `origin`.
fn ray_end(origin: (i16, i16), direction: Direction, reach: u16) -> (i16, i16) {
    let along = |o: i16, d: i16| {
        let offset = i32::from(d) * i32::from(reach) / FIXED_POINT_SCALE;
        i16::try_from(i32::from(o) + offset).unwrap()
    };
    (along(origin.0, direction.dx), along(origin.1, direction.dy))
}

/// Walks each ray independently of the raycaster to find the expected cells.
fn expected_cells(
    pattern: &RayPattern,
    origin: (i16, i16),
    blocked: fn(i16, i16) -> bool,
) -> BTreeMap<(i16, i16), bool> {
    let mut cells = BTreeMap::new();
    for &direction in pattern.directions() {
        let end = ray_end(origin, direction, pattern.max_radius());
        let mut last = (origin, false);
        for (x, y) in LineStepper::new(origin, end).skip(1) {
            last = ((x, y), blocked(x, y));
            if last.1 {
                break;
            }
        }
        *cells.entry(last.0).or_insert(false) |= last.1;
    }
    cells
}

fn charted_cells(chart: &mut Chart<ManualClock>) -> BTreeMap<(i16, i16), bool> {
    let mut out = [DiscoveredPoint::new(0, 0, false, 0); 64];
    let report = chart.query_area(Bounds::new(-10, -10, 10, 10), &mut out);
    assert!(!report.truncated, "query buffer too small");
    out[..report.count]
        .iter()
        .map(|p| ((p.x, p.y), p.is_terrain))
        .collect()
}

#[test]
fn ping_charts_wall_and_water() {
    let mut raycaster = Raycaster::new(RaycasterConfig::default().with_initial_quality(0));
    let pattern = RayPattern::full(raycaster.cache()).with_max_radius(8);
    let mut chart = chart();

    let scan = raycaster.cast_pattern(&pattern, (0, 0), &wall);
    assert_eq!(scan.len(), 32);
    for result in scan.completed() {
        chart
            .add_point(result.hit_x, result.hit_y, result.hit_terrain)
            .unwrap();
    }

    let expected = expected_cells(&pattern, (0, 0), wall);
    let charted = charted_cells(&mut chart);
    assert_eq!(charted, expected);

    // The wall is at x = 5 and the reach is 8, so eastward rays hit it and
    // westward rays end in open water.
    assert_eq!(charted.get(&(5, 0)), Some(&true));
    assert_eq!(charted.get(&(-8, 0)), Some(&false));
    assert!(charted.iter().all(|(&(x, _), &terrain)| terrain == (x >= 5)));
    assert_eq!(
        scan.hits(),
        scan.results().iter().filter(|r| r.hit_terrain).count()
    );
}

#[test]
fn ping_charts_five_terrain_cells() {
    let mut raycaster = Raycaster::new(RaycasterConfig::default().with_initial_quality(0));
    let pattern = RayPattern::full(raycaster.cache()).with_max_radius(8);
    let mut chart = chart();

    let scan = raycaster.cast_pattern(&pattern, (0, 0), &five_cells);
    assert_eq!(scan.len(), 32);
    for (&direction, result) in pattern.directions().iter().zip(scan.results()) {
        let end = ray_end((0, 0), direction, pattern.max_radius());
        let crosses_terrain = LineStepper::new((0, 0), end)
            .skip(1)
            .any(|(x, y)| five_cells(x, y));
        assert!(result.complete, "every ray runs at quality 0");
        assert_eq!(
            result.hit_terrain, crosses_terrain,
            "ray {} disagrees with its line",
            direction.angle_id
        );
        assert_eq!(five_cells(result.hit_x, result.hit_y), result.hit_terrain);
        chart
            .add_point(result.hit_x, result.hit_y, result.hit_terrain)
            .unwrap();
    }

    let hit_cells: BTreeSet<_> = scan
        .results()
        .iter()
        .filter(|r| r.hit_terrain)
        .map(|r| (r.hit_x, r.hit_y))
        .collect();
    let water_cells: BTreeSet<_> = scan
        .results()
        .iter()
        .filter(|r| !r.hit_terrain)
        .map(|r| (r.hit_x, r.hit_y))
        .collect();
    assert!(hit_cells.len() <= 5, "more hits than terrain cells");
    for cell in [(5, 0), (0, 5), (-5, 0), (0, -5)] {
        assert!(hit_cells.contains(&cell), "axis ray missed {cell:?}");
    }

    let charted = charted_cells(&mut chart);
    assert_eq!(charted, expected_cells(&pattern, (0, 0), five_cells));
    let terrain: BTreeSet<_> = charted
        .iter()
        .filter(|&(_, &terrain)| terrain)
        .map(|(&cell, _)| cell)
        .collect();
    assert_eq!(terrain, hit_cells, "converging rays must share one point");
    assert_eq!(charted.len() - terrain.len(), water_cells.len());
}

#[test]
fn repeated_pings_refresh_instead_of_duplicating() {
    let mut raycaster = Raycaster::new(RaycasterConfig::default().with_initial_quality(0));
    let mut chart = chart();
    let pattern = *raycaster.pattern(PatternKind::Sparse);

    for tick in [0, 500, 1_000] {
        chart.clock().set(tick);
        let scan = raycaster.cast_pattern(&pattern, (0, 0), &wall);
        for result in scan.completed() {
            chart
                .add_point(result.hit_x, result.hit_y, result.hit_terrain)
                .unwrap();
        }
    }

    let stats = chart.stats();
    assert_eq!(stats.added + stats.refreshed, 3 * pattern.len());
    assert_eq!(chart.len(), stats.added);
    assert!(chart.iter().all(|(_, p)| p.discovery_time == 1_000));
}

#[test]
fn faded_ping_leaves_an_empty_chart() {
    let mut raycaster = Raycaster::new(RaycasterConfig::default().with_initial_quality(0));
    let mut chart = chart();
    let scan = raycaster.cast_adaptive((0, 0), false, &wall);
    for result in scan.completed() {
        chart
            .add_point(result.hit_x, result.hit_y, result.hit_terrain)
            .unwrap();
    }
    assert!(!chart.is_empty());

    let stage = chart.config().fade_stage_duration;
    chart.update_fade(0).unwrap();
    chart.update_fade(4 * stage).unwrap();
    assert!(chart.is_empty());
    assert_eq!(chart.tree().node_count(), 1);
}

#[test]
fn struct_predicates_work_too() {
    struct Reef {
        min_y: i16,
    }

    impl CollisionPredicate for Reef {
        fn is_blocked(&self, _x: i16, y: i16) -> bool {
            y >= self.min_y
        }
    }

    let mut raycaster = Raycaster::default();
    let north = raycaster.cache().get(64);
    let result = raycaster.cast_ray((0, 0), north, 20, &Reef { min_y: 6 });
    assert!(result.hit_terrain);
    assert_eq!((result.hit_x, result.hit_y, result.distance), (0, 6, 6));
}
