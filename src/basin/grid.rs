//! In-memory basin classification grid.
//!
//! The grid is a dense, regularly spaced raster of basin tags. Land and
//! unmapped cells hold NaN. It is loaded once at startup from a plain
//! `longitude,latitude,basin_tag` CSV export of the basin mask and is never
//! mutated afterwards, so a single instance can be shared by reference
//! across threads.

use std::path::Path;

use crate::model::{GridError, GRID_SPACING_DEG};

/// Tolerance used when checking that axis values sit on grid steps.
const AXIS_TOLERANCE: f64 = 1e-6;

/// Nearest-point basin lookup.
pub trait BasinGrid {
    /// Tag of the grid point nearest to (`longitude`, `latitude`), or `None`
    /// if that point is land / no data.
    fn lookup(&self, longitude: f64, latitude: f64) -> Option<i32>;
}

/// Dense basin raster, stored row-major (latitude rows, longitude columns).
#[derive(Debug, Clone)]
pub struct BasinMask {
    lon_origin: f64,
    lat_origin: f64,
    spacing: f64,
    n_lon: usize,
    n_lat: usize,
    tags: Vec<f64>,
}

impl BasinMask {
    /// Build a mask from raw tags. `tags.len()` must equal `n_lon * n_lat`,
    /// and `spacing` must be the 0.5° basin grid step.
    pub fn new(
        lon_origin: f64,
        lat_origin: f64,
        spacing: f64,
        n_lon: usize,
        n_lat: usize,
        tags: Vec<f64>,
    ) -> Result<Self, GridError> {
        if n_lon == 0 || n_lat == 0 {
            return Err(GridError::Empty);
        }
        if (spacing - GRID_SPACING_DEG).abs() > AXIS_TOLERANCE {
            return Err(GridError::UnsupportedSpacing { found: spacing });
        }
        if tags.len() != n_lon * n_lat {
            return Err(GridError::Parse {
                line: 0,
                message: format!(
                    "expected {} x {} = {} tags, got {}",
                    n_lon,
                    n_lat,
                    n_lon * n_lat,
                    tags.len()
                ),
            });
        }
        Ok(Self { lon_origin, lat_origin, spacing, n_lon, n_lat, tags })
    }

    /// Build a 0.5° mask by evaluating `tag_at(longitude, latitude)` at every
    /// grid point. Mostly useful for synthetic grids in tests. Zero counts
    /// are raised to one.
    pub fn from_fn<F>(lon_origin: f64, lat_origin: f64, n_lon: usize, n_lat: usize, tag_at: F) -> Self
    where
        F: Fn(f64, f64) -> Option<i32>,
    {
        let (n_lon, n_lat) = (n_lon.max(1), n_lat.max(1));
        let mut tags = Vec::with_capacity(n_lon * n_lat);
        for j in 0..n_lat {
            let lat = lat_origin + j as f64 * GRID_SPACING_DEG;
            for i in 0..n_lon {
                let lon = lon_origin + i as f64 * GRID_SPACING_DEG;
                tags.push(tag_at(lon, lat).map(f64::from).unwrap_or(f64::NAN));
            }
        }
        Self { lon_origin, lat_origin, spacing: GRID_SPACING_DEG, n_lon, n_lat, tags }
    }

    /// Read a CSV basin mask from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GridError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_csv(&text)
    }

    /// Parse a `longitude,latitude,basin_tag` CSV export.
    ///
    /// The first line is a header. Empty, `NaN`, or `null` tags mark land.
    /// Grid points missing from the file are treated as land as well, so
    /// exports that drop all-land rows still load.
    pub fn from_csv(csv: &str) -> Result<Self, GridError> {
        let mut points: Vec<(f64, f64, f64)> = Vec::new();

        for (i, line) in csv.lines().enumerate() {
            if i == 0 || line.trim().is_empty() {
                continue; // Skip header or empty lines
            }
            let line_no = i + 1;

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() < 3 {
                return Err(GridError::Parse {
                    line: line_no,
                    message: format!("expected 3 fields, got {}", fields.len()),
                });
            }

            let parse_axis = |name: &str, s: &str| -> Result<f64, GridError> {
                s.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| GridError::Parse {
                        line: line_no,
                        message: format!("invalid {} '{}'", name, s),
                    })
            };

            let lon = parse_axis("longitude", fields[0])?;
            let lat = parse_axis("latitude", fields[1])?;
            let tag = match fields[2] {
                "" | "null" => f64::NAN,
                s => s.parse::<f64>().map_err(|_| GridError::Parse {
                    line: line_no,
                    message: format!("invalid basin tag '{}'", s),
                })?,
            };

            points.push((lon, lat, tag));
        }

        if points.is_empty() {
            return Err(GridError::Empty);
        }

        let lons = regular_axis("longitude", points.iter().map(|p| p.0).collect())?;
        let lats = regular_axis("latitude", points.iter().map(|p| p.1).collect())?;

        let (lon_origin, n_lon) = lons;
        let (lat_origin, n_lat) = lats;
        let mut tags = vec![f64::NAN; n_lon * n_lat];
        for (lon, lat, tag) in points {
            let i = ((lon - lon_origin) / GRID_SPACING_DEG).round() as usize;
            let j = ((lat - lat_origin) / GRID_SPACING_DEG).round() as usize;
            tags[j * n_lon + i] = tag;
        }

        Self::new(lon_origin, lat_origin, GRID_SPACING_DEG, n_lon, n_lat, tags)
    }

    /// Number of grid points carrying a basin tag.
    pub fn ocean_cell_count(&self) -> usize {
        self.tags.iter().filter(|t| !t.is_nan()).count()
    }

    /// Total number of grid points.
    pub fn cell_count(&self) -> usize {
        self.tags.len()
    }

    /// (min longitude, min latitude, max longitude, max latitude) of the grid points.
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        (
            self.lon_origin,
            self.lat_origin,
            self.lon_origin + (self.n_lon - 1) as f64 * self.spacing,
            self.lat_origin + (self.n_lat - 1) as f64 * self.spacing,
        )
    }

    /// Index of the nearest grid point along one axis.
    ///
    /// Halfway values round up (toward +∞). Values beyond the grid clamp
    /// to the edge point.
    fn nearest_index(origin: f64, spacing: f64, count: usize, value: f64) -> usize {
        let steps = ((value - origin) / spacing + 0.5).floor();
        // f64::max discards NaN, so a NaN query lands on index 0.
        steps.max(0.0).min((count - 1) as f64) as usize
    }
}

impl BasinGrid for BasinMask {
    fn lookup(&self, longitude: f64, latitude: f64) -> Option<i32> {
        let i = Self::nearest_index(self.lon_origin, self.spacing, self.n_lon, longitude);
        let j = Self::nearest_index(self.lat_origin, self.spacing, self.n_lat, latitude);
        let tag = self.tags[j * self.n_lon + i];
        if tag.is_nan() { None } else { Some(tag as i32) }
    }
}

/// Sort and de-duplicate axis values, check they sit on 0.5° steps, and
/// return (origin, number of grid points).
fn regular_axis(axis: &'static str, mut values: Vec<f64>) -> Result<(f64, usize), GridError> {
    values.sort_by(f64::total_cmp);
    values.dedup_by(|a, b| (*a - *b).abs() < AXIS_TOLERANCE);

    for pair in values.windows(2) {
        let gap = pair[1] - pair[0];
        let steps = gap / GRID_SPACING_DEG;
        if (steps - steps.round()).abs() > AXIS_TOLERANCE {
            return Err(GridError::IrregularSpacing { axis, expected: GRID_SPACING_DEG, found: gap });
        }
    }

    let origin = values[0];
    let last = values[values.len() - 1];
    let count = ((last - origin) / GRID_SPACING_DEG).round() as usize + 1;
    Ok((origin, count))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
