//! End-to-end position cleaning and basin classification.
//!
//! Exercises the normalizer and resolver together through the public API,
//! against basin grids built from CSV text the same way the service loads
//! its mask file.

use argo_ingest_service::basin::{resolve, BasinGrid, BasinMask, BasinResolution, BasinResolver};
use argo_ingest_service::geolocation::{CoordinateNormalizer, LocationWarning};
use argo_ingest_service::model::{Coordinate, NO_BASIN, SENTINEL_COORDINATE};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// A 3 x 3 patch around the antimeridian at 40°N, basin 3 everywhere.
fn pacific_patch() -> BasinMask {
    let mut csv = String::from("longitude,latitude,basin_tag\n");
    for lon in [-176.0, -175.5, -175.0, -174.5, -174.0] {
        for lat in [39.0, 39.5, 40.0, 40.5, 41.0] {
            csv.push_str(&format!("{},{},3\n", lon, lat));
        }
    }
    BasinMask::from_csv(&csv).expect("patch should load")
}

/// Island at (10.0..=10.5, 20.0..=20.5); ocean basin 1 to the west,
/// basin 2 to the east, everything else in the box land.
fn island() -> BasinMask {
    BasinMask::from_fn(8.0, 18.0, 11, 11, |lon, lat| {
        if (10.0..=10.5).contains(&lon) && (20.0..=20.5).contains(&lat) {
            None
        } else if lon < 10.0 {
            Some(1)
        } else if lon > 10.5 {
            Some(2)
        } else {
            None
        }
    })
}

fn clean_and_resolve(grid: &BasinMask, lon: f64, lat: f64) -> (Coordinate, i32) {
    let (coordinate, _) = CoordinateNormalizer::default().normalize(lon, lat);
    (coordinate, resolve(coordinate, grid))
}

// ---------------------------------------------------------------------------
// Worked examples
// ---------------------------------------------------------------------------

#[test]
fn test_longitude_past_antimeridian_wraps_then_resolves() {
    let grid = pacific_patch();
    let (coordinate, basin) = clean_and_resolve(&grid, 185.0, 40.0);
    assert_eq!(coordinate, Coordinate::new(-175.0, 40.0));
    assert_eq!(basin, 3);
}

#[test]
fn test_fill_longitude_yields_sentinel_regardless_of_latitude() {
    let (coordinate, warning) = CoordinateNormalizer::default().normalize(99999.0, 40.0);
    assert_eq!(coordinate, SENTINEL_COORDINATE);
    assert!(matches!(warning, Some(LocationWarning::InvalidCoordinate { .. })));
}

#[test]
fn test_sentinel_coordinate_resolves_like_any_other_point() {
    // (0, -90) is a valid query; against this patch it clamps to the
    // south-west corner.
    let grid = pacific_patch();
    let (coordinate, basin) = clean_and_resolve(&grid, f64::NAN, 40.0);
    assert_eq!(coordinate, SENTINEL_COORDINATE);
    assert_eq!(basin, 3);
}

// ---------------------------------------------------------------------------
// Neighbor fallback
// ---------------------------------------------------------------------------

#[test]
fn test_open_ocean_point_resolves_directly() {
    let grid = island();
    let resolution = BasinResolver::new(&grid).resolve_detailed(Coordinate::new(9.1, 19.2));
    assert_eq!(resolution, BasinResolution::Direct(1));
}

#[test]
fn test_point_inside_island_has_no_basin() {
    // (10.1, 20.2) snaps to (10.0, 20.0), land. Its surrounding points
    // are all island too, so nothing survives.
    let grid = island();
    assert_eq!(resolve(Coordinate::new(10.1, 20.2), &grid), NO_BASIN);
}

#[test]
fn test_point_on_west_shore_takes_western_basin() {
    // (9.9, 20.2) snaps to (10.0, 20.0), land; (9.5, *) is basin 1.
    let grid = island();
    assert_eq!(resolve(Coordinate::new(9.9, 20.2), &grid), 1);
}

#[test]
fn test_point_on_east_shore_takes_eastern_basin() {
    // (10.6, 20.3) snaps to (10.5, 20.5), land; (11.0, *) is basin 2.
    let grid = island();
    match BasinResolver::new(&grid).resolve_detailed(Coordinate::new(10.6, 20.3)) {
        BasinResolution::Nearest { tag, grid_point, .. } => {
            assert_eq!(tag, 2);
            assert_eq!(grid_point.longitude, 11.0);
        }
        other => panic!("expected Nearest, got {:?}", other),
    }
}

#[test]
fn test_all_land_box_returns_minus_one() {
    let land = BasinMask::from_fn(0.0, 0.0, 5, 5, |_, _| None);
    assert_eq!(resolve(Coordinate::new(1.1, 1.1), &land), -1);
}

// ---------------------------------------------------------------------------
// Shared grid
// ---------------------------------------------------------------------------

#[test]
fn test_grid_is_shareable_across_threads() {
    fn assert_sync<T: Send + Sync>() {}
    assert_sync::<BasinMask>();

    let grid = island();
    let normalizer = CoordinateNormalizer::default();
    let inputs: Vec<(f64, f64)> = (0..64).map(|i| (8.0 + (i % 16) as f64 * 0.3, 18.5 + (i / 16) as f64)).collect();

    let sequential: Vec<i32> = inputs
        .iter()
        .map(|&(lon, lat)| resolve(normalizer.normalize(lon, lat).0, &grid))
        .collect();

    let parallel: Vec<i32> = std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .chunks(16)
            .map(|chunk| {
                let grid = &grid;
                let normalizer = &normalizer;
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|&(lon, lat)| resolve(normalizer.normalize(lon, lat).0, grid))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().flat_map(|h| h.join().expect("worker panicked")).collect()
    });

    assert_eq!(sequential, parallel);
}

#[test]
fn test_repeated_queries_are_stable() {
    let grid = island();
    let first = grid.lookup(10.75, 20.25);
    for _ in 0..10 {
        assert_eq!(grid.lookup(10.75, 20.25), first);
    }
}
