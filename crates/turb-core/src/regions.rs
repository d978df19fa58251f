//! Named lat/lon boxes: advisory feed coverage and coarse region labels.

use crate::models::Waypoint;

/// Inclusive lat/lon rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBox {
    pub name: &'static str,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBox {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// Airspace the advisory feed is published for.
pub const US_COVERAGE: [GeoBox; 3] = [
    GeoBox {
        name: "Continental United States",
        min_lat: 24.0,
        max_lat: 49.5,
        min_lon: -125.0,
        max_lon: -66.0,
    },
    GeoBox {
        name: "Alaska",
        min_lat: 51.0,
        max_lat: 71.5,
        min_lon: -180.0,
        max_lon: -129.0,
    },
    GeoBox {
        name: "Hawaii",
        min_lat: 18.5,
        max_lat: 22.5,
        min_lon: -161.0,
        max_lon: -154.5,
    },
];

/// Region labels, first match wins.
pub const REGIONS: [GeoBox; 9] = [
    GeoBox {
        name: "Northern United States & Canada",
        min_lat: 45.0,
        max_lat: 90.0,
        min_lon: -180.0,
        max_lon: -60.0,
    },
    GeoBox {
        name: "Central United States",
        min_lat: 25.0,
        max_lat: 45.0,
        min_lon: -180.0,
        max_lon: -60.0,
    },
    GeoBox {
        name: "Southern United States & Mexico",
        min_lat: 15.0,
        max_lat: 25.0,
        min_lon: -180.0,
        max_lon: -60.0,
    },
    GeoBox {
        name: "Western Europe",
        min_lat: 35.0,
        max_lat: 60.0,
        min_lon: -10.0,
        max_lon: 40.0,
    },
    GeoBox {
        name: "Eastern Europe & Western Asia",
        min_lat: 35.0,
        max_lat: 60.0,
        min_lon: 40.0,
        max_lon: 100.0,
    },
    GeoBox {
        name: "Central Asia & Indian Subcontinent",
        min_lat: 20.0,
        max_lat: 45.0,
        min_lon: 60.0,
        max_lon: 120.0,
    },
    GeoBox {
        name: "East Asia & Pacific",
        min_lat: 20.0,
        max_lat: 45.0,
        min_lon: 120.0,
        max_lon: 180.0,
    },
    GeoBox {
        name: "Tropical & Southern Hemisphere",
        min_lat: -60.0,
        max_lat: 20.0,
        min_lon: -180.0,
        max_lon: 180.0,
    },
    GeoBox {
        name: "Arctic Region",
        min_lat: 60.0,
        max_lat: 90.0,
        min_lon: -180.0,
        max_lon: 180.0,
    },
];

pub const GENERAL_AREA: &str = "General area";
pub const AREA_NOT_SPECIFIED: &str = "Area not specified";

/// Region name for a coordinate.
pub fn region_label(lat: f64, lon: f64) -> &'static str {
    REGIONS
        .iter()
        .find(|region| region.contains(lat, lon))
        .map(|region| region.name)
        .unwrap_or(GENERAL_AREA)
}

/// Region name for the mean position of `points`.
pub fn region_for_points(points: &[Waypoint]) -> &'static str {
    crate::spatial::mean_position(points)
        .map(|mean| region_label(mean.lat, mean.lon))
        .unwrap_or(AREA_NOT_SPECIFIED)
}

pub fn in_us_coverage(lat: f64, lon: f64) -> bool {
    US_COVERAGE.iter().any(|b| b.contains(lat, lon))
}

/// True when at least one point lies inside the advisory feed's coverage.
pub fn any_in_us_coverage(points: &[Waypoint]) -> bool {
    points.iter().any(|p| in_us_coverage(p.lat, p.lon))
}

/// Loose comparison of an advisory's area text against a derived region label.
pub fn area_matches_region(area_label: &str, region: &str) -> bool {
    let area = area_label.trim().to_ascii_lowercase();
    let region = region.trim().to_ascii_lowercase();
    if area.is_empty()
        || region.is_empty()
        || area == AREA_NOT_SPECIFIED.to_ascii_lowercase()
        || region == GENERAL_AREA.to_ascii_lowercase()
    {
        return false;
    }
    area == region || area.contains(&region) || region.contains(&area)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn us_airports_are_covered() {
        assert!(in_us_coverage(40.6413, -73.7781)); // JFK
        assert!(in_us_coverage(61.1743, -149.9963)); // ANC
        assert!(in_us_coverage(21.3187, -157.9225)); // HNL
    }

    #[test]
    fn europe_is_not_covered() {
        let lhr_cdg = [Waypoint::new(51.47, -0.4543), Waypoint::new(49.0097, 2.5479)];
        assert!(!any_in_us_coverage(&lhr_cdg));
    }

    #[test]
    fn region_labels_follow_table_order() {
        assert_eq!(region_label(38.0, -95.0), "Central United States");
        assert_eq!(region_label(47.0, -100.0), "Northern United States & Canada");
        assert_eq!(region_label(50.0, 2.0), "Western Europe");
        assert_eq!(region_label(-33.9, 151.2), "Tropical & Southern Hemisphere");
        assert_eq!(region_label(-80.0, 0.0), GENERAL_AREA);
    }

    #[test]
    fn area_match_is_case_insensitive_and_ignores_placeholders() {
        assert!(area_matches_region("CENTRAL UNITED STATES", "Central United States"));
        assert!(!area_matches_region(AREA_NOT_SPECIFIED, "Central United States"));
        assert!(!area_matches_region("Western Europe", "Central United States"));
        assert!(!area_matches_region("General area", GENERAL_AREA));
    }
}
