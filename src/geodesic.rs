/// Surface distance between coordinates.
///
/// The basin resolver only compares distances against each other, so any
/// metric that orders candidates the way the globe does is acceptable.
/// `GreatCircle` uses the haversine formula on the mean Earth radius.

use crate::model::Coordinate;

/// Mean Earth radius in statute miles (IUGG mean radius, 6371.0088 km).
pub const EARTH_MEAN_RADIUS_MILES: f64 = 3958.7613;

/// Something that can measure the distance between two coordinates, in miles.
pub trait DistanceMetric {
    fn distance_miles(&self, from: Coordinate, to: Coordinate) -> f64;
}

/// Haversine great-circle distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreatCircle;

impl DistanceMetric for GreatCircle {
    fn distance_miles(&self, from: Coordinate, to: Coordinate) -> f64 {
        great_circle_miles(from, to)
    }
}

/// Great-circle distance in miles between two coordinates.
pub fn great_circle_miles(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = (to.latitude - from.latitude).to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_MEAN_RADIUS_MILES * c
}
