//! Raw float position cleaning.
//!
//! Float files report positions that are sometimes NaN, sometimes one of a
//! handful of fill values, and sometimes a longitude past the antimeridian.
//! `CoordinateNormalizer` turns any raw pair into a coordinate that can be
//! stored, returning an advisory warning instead of failing. Callers decide
//! whether to surface the warning.

use std::fmt;

use crate::model::{Coordinate, SENTINEL_COORDINATE};

// ---------------------------------------------------------------------------
// Fill sentinels
// ---------------------------------------------------------------------------

/// Official Argo fill value, followed by values seen in the wild.
pub const DEFAULT_LONGITUDE_FILLS: [f64; 3] = [99999.0, -999.999, -999.0];
pub const DEFAULT_LATITUDE_FILLS: [f64; 3] = [99999.0, -99.999, -999.0];

/// A fixed set of numeric encodings that mean "missing".
#[derive(Debug, Clone, PartialEq)]
pub struct FillSentinelSet {
    values: Vec<f64>,
}

impl FillSentinelSet {
    pub fn new(values: &[f64]) -> Self {
        Self { values: values.to_vec() }
    }

    /// Exact comparison; fill values are written verbatim by the data source.
    pub fn contains(&self, value: f64) -> bool {
        self.values.iter().any(|&fill| fill == value)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory produced when a raw position had to be repaired.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationWarning {
    /// NaN, infinite, or fill-valued input replaced by the sentinel coordinate.
    InvalidCoordinate { longitude: f64, latitude: f64 },
    /// Longitude outside [-180, 180] wrapped by one turn.
    OutOfRangeLongitude { original: f64, wrapped: f64 },
}

impl fmt::Display for LocationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationWarning::InvalidCoordinate { longitude, latitude } => write!(
                f,
                "LONGITUDE={}, LATITUDE={}, setting to {},{}",
                longitude, latitude, SENTINEL_COORDINATE.longitude, SENTINEL_COORDINATE.latitude
            ),
            LocationWarning::OutOfRangeLongitude { original, wrapped } => {
                write!(f, "mutating longitude {} to {}", original, wrapped)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Validates and repairs raw (longitude, latitude) pairs.
#[derive(Debug, Clone)]
pub struct CoordinateNormalizer {
    longitude_fills: FillSentinelSet,
    latitude_fills: FillSentinelSet,
}

impl Default for CoordinateNormalizer {
    fn default() -> Self {
        Self::new(
            FillSentinelSet::new(&DEFAULT_LONGITUDE_FILLS),
            FillSentinelSet::new(&DEFAULT_LATITUDE_FILLS),
        )
    }
}

impl CoordinateNormalizer {
    pub fn new(longitude_fills: FillSentinelSet, latitude_fills: FillSentinelSet) -> Self {
        Self { longitude_fills, latitude_fills }
    }

    /// Returns a storable coordinate and, if the input was repaired, why.
    ///
    /// Rules, in order:
    ///   - NaN, infinite, or fill value in either component → (0, -90)
    ///   - longitude < -180 → longitude + 360
    ///   - longitude > 180  → longitude - 360
    ///   - otherwise unchanged
    ///
    /// Latitude is only checked against its fill values, never range-corrected.
    pub fn normalize(&self, longitude: f64, latitude: f64) -> (Coordinate, Option<LocationWarning>) {
        if !longitude.is_finite()
            || !latitude.is_finite()
            || self.longitude_fills.contains(longitude)
            || self.latitude_fills.contains(latitude)
        {
            return (
                SENTINEL_COORDINATE,
                Some(LocationWarning::InvalidCoordinate { longitude, latitude }),
            );
        }

        let wrapped = if longitude < -180.0 {
            longitude + 360.0
        } else if longitude > 180.0 {
            longitude - 360.0
        } else {
            return (Coordinate::new(longitude, latitude), None);
        };

        (
            Coordinate::new(wrapped, latitude),
            Some(LocationWarning::OutOfRangeLongitude { original: longitude, wrapped }),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> CoordinateNormalizer {
        CoordinateNormalizer::default()
    }

    // --- Invalid input ------------------------------------------------------

    #[test]
    fn test_every_longitude_fill_maps_to_sentinel() {
        for fill in DEFAULT_LONGITUDE_FILLS {
            let (coord, warning) = normalizer().normalize(fill, 40.0);
            assert_eq!(coord, SENTINEL_COORDINATE, "longitude fill {} should be rejected", fill);
            assert!(matches!(warning, Some(LocationWarning::InvalidCoordinate { .. })));
        }
    }

    #[test]
    fn test_every_latitude_fill_maps_to_sentinel() {
        for fill in DEFAULT_LATITUDE_FILLS {
            let (coord, _) = normalizer().normalize(-30.0, fill);
            assert_eq!(coord, SENTINEL_COORDINATE, "latitude fill {} should be rejected", fill);
        }
    }

    #[test]
    fn test_fill_sets_are_axis_specific() {
        // -99.999 is a latitude fill but a perfectly good longitude.
        let (coord, warning) = normalizer().normalize(-99.999, 10.0);
        assert_eq!(coord, Coordinate::new(-99.999, 10.0));
        assert!(warning.is_none());

        // -999.999 is a longitude fill; as a latitude it is not a fill and
        // latitude is never range-corrected.
        let (coord, _) = normalizer().normalize(10.0, -999.999);
        assert_eq!(coord, Coordinate::new(10.0, -999.999));
    }

    #[test]
    fn test_nan_in_either_component_maps_to_sentinel() {
        assert_eq!(normalizer().normalize(f64::NAN, 10.0).0, SENTINEL_COORDINATE);
        assert_eq!(normalizer().normalize(10.0, f64::NAN).0, SENTINEL_COORDINATE);
        assert_eq!(normalizer().normalize(f64::NAN, f64::NAN).0, SENTINEL_COORDINATE);
    }

    #[test]
    fn test_infinite_longitude_maps_to_sentinel() {
        assert_eq!(normalizer().normalize(f64::INFINITY, 10.0).0, SENTINEL_COORDINATE);
        assert_eq!(normalizer().normalize(f64::NEG_INFINITY, 10.0).0, SENTINEL_COORDINATE);
    }

    #[test]
    fn test_longitude_fill_wins_over_valid_latitude() {
        let (coord, _) = normalizer().normalize(99999.0, 40.0);
        assert_eq!(coord, Coordinate::new(0.0, -90.0));
    }

    // --- Wrapping -----------------------------------------------------------

    #[test]
    fn test_longitude_below_range_wraps_east() {
        let (coord, warning) = normalizer().normalize(-190.0, 12.5);
        assert_eq!(coord, Coordinate::new(170.0, 12.5));
        assert_eq!(
            warning,
            Some(LocationWarning::OutOfRangeLongitude { original: -190.0, wrapped: 170.0 })
        );
    }

    #[test]
    fn test_longitude_above_range_wraps_west() {
        let (coord, _) = normalizer().normalize(190.0, -12.5);
        assert_eq!(coord, Coordinate::new(-170.0, -12.5));

        let (coord, _) = normalizer().normalize(185.0, 40.0);
        assert_eq!(coord, Coordinate::new(-175.0, 40.0));
    }

    #[test]
    fn test_wrap_is_a_single_turn() {
        let (coord, _) = normalizer().normalize(-600.0, 0.0);
        assert_eq!(coord.longitude, -240.0);
    }

    // --- Pass-through -------------------------------------------------------

    #[test]
    fn test_in_range_values_pass_through_without_warning() {
        for (lon, lat) in [(-180.0, -90.0), (180.0, 90.0), (0.0, 0.0), (-89.9956, 40.5614)] {
            let (coord, warning) = normalizer().normalize(lon, lat);
            assert_eq!(coord, Coordinate::new(lon, lat));
            assert!(warning.is_none(), "({}, {}) should not warn", lon, lat);
        }
    }

    #[test]
    fn test_out_of_range_latitude_is_preserved() {
        let (coord, warning) = normalizer().normalize(20.0, 95.0);
        assert_eq!(coord, Coordinate::new(20.0, 95.0));
        assert!(warning.is_none());
    }

    #[test]
    fn test_custom_fill_sets_replace_defaults() {
        let n = CoordinateNormalizer::new(FillSentinelSet::new(&[-1.0]), FillSentinelSet::new(&[]));
        assert_eq!(n.normalize(-1.0, 5.0).0, SENTINEL_COORDINATE);
        assert_eq!(n.normalize(99999.0, 5.0).0, Coordinate::new(99999.0 - 360.0, 5.0));
    }

    #[test]
    fn test_warning_message_names_inputs() {
        let (_, warning) = normalizer().normalize(99999.0, 40.0);
        let message = warning.expect("fill should warn").to_string();
        assert!(message.contains("LONGITUDE=99999"));
        assert!(message.contains("LATITUDE=40"));
    }
}
