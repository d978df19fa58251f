//! Great-circle waypoint generation between two airports.

use thiserror::Error;

use crate::models::Waypoint;
use crate::spatial::{central_angle, normalize_longitude};

/// Default number of segments between departure and arrival.
pub const DEFAULT_WAYPOINT_COUNT: usize = 15;

/// Below this central angle (radians) the endpoints are treated as identical.
const DEGENERATE_ANGLE_RAD: f64 = 1e-12;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RouteError {
    #[error("waypoint count must be at least 1")]
    InvalidWaypointCount,
    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },
}

/// Sample `count + 1` points along the great circle from `from` to `to`.
///
/// Longitudes are normalised into [-180, 180] before interpolation and the
/// output keeps the raw interpolated values; nothing is unwrapped across the
/// antimeridian (see [`crate::spatial::split_at_antimeridian`]).
pub fn generate_great_circle_path(
    from: Waypoint,
    to: Waypoint,
    count: usize,
) -> Result<Vec<Waypoint>, RouteError> {
    if count == 0 {
        return Err(RouteError::InvalidWaypointCount);
    }
    validate(&from)?;
    validate(&to)?;

    let lon1 = normalize_longitude(from.lon);
    let lon2 = normalize_longitude(to.lon);
    let d = central_angle(from.lat, lon1, to.lat, lon2);

    if d < DEGENERATE_ANGLE_RAD {
        return Ok(vec![Waypoint::new(to.lat, lon2); count + 1]);
    }

    let phi1 = from.lat.to_radians();
    let lambda1 = lon1.to_radians();
    let phi2 = to.lat.to_radians();
    let lambda2 = lon2.to_radians();
    let sin_d = d.sin();

    let mut waypoints = Vec::with_capacity(count + 1);
    for i in 0..=count {
        let fraction = i as f64 / count as f64;
        let a = ((1.0 - fraction) * d).sin() / sin_d;
        let b = (fraction * d).sin() / sin_d;

        let x = a * phi1.cos() * lambda1.cos() + b * phi2.cos() * lambda2.cos();
        let y = a * phi1.cos() * lambda1.sin() + b * phi2.cos() * lambda2.sin();
        let z = a * phi1.sin() + b * phi2.sin();

        let lat = z.atan2((x * x + y * y).sqrt()).to_degrees();
        let lon = y.atan2(x).to_degrees();
        waypoints.push(Waypoint::new(lat, lon));
    }

    Ok(waypoints)
}

fn validate(point: &Waypoint) -> Result<(), RouteError> {
    if !point.lat.is_finite() || !point.lon.is_finite() || point.lat.abs() > 90.0 {
        return Err(RouteError::InvalidCoordinate {
            lat: point.lat,
            lon: point.lon,
        });
    }
    Ok(())
}
