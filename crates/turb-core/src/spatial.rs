//! Spherical geometry helpers: distances, longitude handling, point-in-polygon.

use crate::models::Waypoint;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MI: f64 = 3_959.0;

/// Central angle between two points in radians (haversine formula).
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
pub fn central_angle(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * a.clamp(0.0, 1.0).sqrt().asin()
}

/// Calculate distance between two points in meters using Haversine formula.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    EARTH_RADIUS_M * central_angle(lat1, lon1, lat2, lon2)
}

/// Great-circle distance in statute miles.
pub fn distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    EARTH_RADIUS_MI * central_angle(lat1, lon1, lat2, lon2)
}

/// Wrap a longitude into [-180, 180].
pub fn normalize_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid maps +180 to -180; keep the sign the caller asked for.
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Ray-casting point-in-polygon test.
///
/// `polygon` vertices are `[lat, lon]`; the ring may be open or closed.
/// Points exactly on an edge follow the half-open crossing rule, so a
/// vertex-adjacent point is classified the same way every time.
pub fn point_in_polygon(lat: f64, lon: f64, polygon: &[[f64; 2]]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let yi = polygon[i][0];
        let xi = polygon[i][1];
        let yj = polygon[j][0];
        let xj = polygon[j][1];

        if ((yi > lat) != (yj > lat)) && (lon < (xj - xi) * (lat - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Arithmetic mean of a set of waypoints, `None` when empty.
pub fn mean_position(points: &[Waypoint]) -> Option<Waypoint> {
    if points.is_empty() {
        return None;
    }
    let count = points.len() as f64;
    let lat = points.iter().map(|p| p.lat).sum::<f64>() / count;
    let lon = points.iter().map(|p| p.lon).sum::<f64>() / count;
    Some(Waypoint::new(lat, lon))
}

/// Vertex mean of a `[lat, lon]` ring.
pub fn polygon_centroid(polygon: &[[f64; 2]]) -> Option<Waypoint> {
    if polygon.is_empty() {
        return None;
    }
    let count = polygon.len() as f64;
    let lat = polygon.iter().map(|v| v[0]).sum::<f64>() / count;
    let lon = polygon.iter().map(|v| v[1]).sum::<f64>() / count;
    Some(Waypoint::new(lat, lon))
}

/// Split a raw waypoint sequence into display segments wherever consecutive
/// longitudes jump by more than 180 degrees.
///
/// The stored route is never unwrapped; renderers call this when drawing.
pub fn split_at_antimeridian(points: &[Waypoint]) -> Vec<Vec<Waypoint>> {
    let mut segments: Vec<Vec<Waypoint>> = Vec::new();
    let mut current: Vec<Waypoint> = Vec::new();
    for point in points {
        if let Some(prev) = current.last() {
            if (point.lon - prev.lon).abs() > 180.0 {
                segments.push(std::mem::take(&mut current));
            }
        }
        current.push(*point);
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}
