//! Nearest-valid-basin resolution.
//!
//! A float position is classified by the basin tag of its nearest grid
//! point. Floats close to shore often snap to a land cell; in that case the
//! four grid points surrounding the position are examined and the closest
//! one carrying a tag wins.
//!
//! The surrounding points are always visited in the same order:
//!
//! ```text
//!   (lon_floor, lat_floor) → (lon_floor, lat_ceil) → (lon_ceil, lat_ceil) → (lon_ceil, lat_floor)
//! ```
//!
//! and an exact distance tie keeps the earlier point, so results are
//! reproducible run to run.

use crate::basin::grid::BasinGrid;
use crate::geodesic::{DistanceMetric, GreatCircle};
use crate::model::{Coordinate, GRID_SPACING_DEG, NO_BASIN};

/// How a basin tag was obtained for a coordinate.
#[derive(Debug, Clone, PartialEq)]
pub enum BasinResolution {
    /// The coordinate's own grid point carries a tag.
    Direct(i32),
    /// The own grid point is land; this is the closest tagged surrounding point.
    Nearest { tag: i32, grid_point: Coordinate, distance_miles: f64 },
    /// The own grid point and all four surrounding points are land.
    NoValidBasin,
}

impl BasinResolution {
    /// Basin value to store: the tag, or `NO_BASIN` (-1).
    pub fn tag(&self) -> i32 {
        match self {
            BasinResolution::Direct(tag) => *tag,
            BasinResolution::Nearest { tag, .. } => *tag,
            BasinResolution::NoValidBasin => NO_BASIN,
        }
    }
}

/// The four grid-aligned points surrounding `coordinate`, in resolution order.
///
/// A coordinate lying exactly on a grid line yields duplicate points.
pub fn surrounding_grid_points(coordinate: Coordinate, spacing: f64) -> [Coordinate; 4] {
    let lon_floor = (coordinate.longitude / spacing).floor() * spacing;
    let lon_ceil = (coordinate.longitude / spacing).ceil() * spacing;
    let lat_floor = (coordinate.latitude / spacing).floor() * spacing;
    let lat_ceil = (coordinate.latitude / spacing).ceil() * spacing;

    [
        Coordinate::new(lon_floor, lat_floor),
        Coordinate::new(lon_floor, lat_ceil),
        Coordinate::new(lon_ceil, lat_ceil),
        Coordinate::new(lon_ceil, lat_floor),
    ]
}

/// Resolves coordinates against a loaded basin grid.
///
/// Holds only shared references, so one resolver can be used from any
/// number of threads when the grid and metric are `Sync`.
pub struct BasinResolver<'g, G: ?Sized, D = GreatCircle> {
    grid: &'g G,
    metric: D,
}

impl<'g, G: BasinGrid + ?Sized> BasinResolver<'g, G, GreatCircle> {
    pub fn new(grid: &'g G) -> Self {
        Self { grid, metric: GreatCircle }
    }
}

impl<'g, G: BasinGrid + ?Sized, D: DistanceMetric> BasinResolver<'g, G, D> {
    pub fn with_metric(grid: &'g G, metric: D) -> Self {
        Self { grid, metric }
    }

    /// Basin tag for a normalized coordinate, or -1 if it is land-locked.
    pub fn resolve(&self, coordinate: Coordinate) -> i32 {
        self.resolve_detailed(coordinate).tag()
    }

    pub fn resolve_detailed(&self, coordinate: Coordinate) -> BasinResolution {
        if let Some(tag) = self.grid.lookup(coordinate.longitude, coordinate.latitude) {
            return BasinResolution::Direct(tag);
        }

        let mut best: Option<(i32, Coordinate, f64)> = None;
        for point in surrounding_grid_points(coordinate, GRID_SPACING_DEG) {
            let Some(tag) = self.grid.lookup(point.longitude, point.latitude) else {
                continue;
            };
            let distance = self.metric.distance_miles(coordinate, point);
            // Strictly closer only: ties keep the earlier point.
            match best {
                Some((_, _, closest)) if closest <= distance => {}
                _ => best = Some((tag, point, distance)),
            }
        }

        match best {
            Some((tag, grid_point, distance_miles)) => {
                BasinResolution::Nearest { tag, grid_point, distance_miles }
            }
            None => BasinResolution::NoValidBasin,
        }
    }
}

/// Resolve a single coordinate with the great-circle metric.
pub fn resolve<G: BasinGrid + ?Sized>(coordinate: Coordinate, grid: &G) -> i32 {
    BasinResolver::new(grid).resolve(coordinate)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
