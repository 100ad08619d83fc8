//! Planar distance and centroid helpers.
//!
//! Latitude and longitude are treated as flat Cartesian coordinates. This
//! only holds at neighborhood scale, and the default radius is calibrated
//! for it.

use safety_watch_report_models::Location;

/// Euclidean distance between two points in degree space.
#[must_use]
pub fn distance(a: Location, b: Location) -> f64 {
    (a.latitude - b.latitude).hypot(a.longitude - b.longitude)
}

/// Whether `b` lies within `radius` degrees of `a`, boundary included.
#[must_use]
pub fn within(a: Location, b: Location, radius: f64) -> bool {
    distance(a, b) <= radius
}

/// Coordinate-wise mean of `points`, or `None` if there are none.
#[allow(clippy::cast_precision_loss)]
pub fn centroid(points: impl IntoIterator<Item = Location>) -> Option<Location> {
    let (count, lat_sum, lng_sum) = points
        .into_iter()
        .fold((0_usize, 0.0, 0.0), |(count, lat, lng), p| {
            (count + 1, lat + p.latitude, lng + p.longitude)
        });

    (count > 0).then(|| Location::new(lat_sum / count as f64, lng_sum / count as f64))
}
