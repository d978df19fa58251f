//! Altitude weather model: derive flight-level estimates from a surface reading.
//!
//! Standard lapse-rate approximations with fixed constants. They are
//! deliberately not configurable per request.

use crate::models::{AltitudeBand, WeatherReading};

/// Wind grows 0.8x per 10,000 ft above the surface reading...
pub const WIND_GAIN_PER_10K_FT: f64 = 0.8;
/// ...up to this multiple of the surface wind.
pub const WIND_MULTIPLIER_CAP: f64 = 2.5;
/// Temperature drop in degrees F per 1,000 ft.
pub const LAPSE_RATE_F_PER_1K_FT: f64 = 11.7;
/// Scale height for the barometric approximation, in feet.
pub const PRESSURE_SCALE_HEIGHT_FT: f64 = 7_400.0;

/// Single altitude sampled for the cruise phase.
pub const CRUISE_REFERENCE_FT: f64 = 35_000.0;
/// Width of each band sampled during climb and descent.
pub const TERMINAL_BAND_STEP_FT: f64 = 5_000.0;
/// Ceiling of the climb/descent sampling span.
pub const TERMINAL_CEILING_FT: f64 = 30_000.0;

pub fn wind_multiplier(altitude_ft: f64) -> f64 {
    (1.0 + (altitude_ft.max(0.0) / 10_000.0) * WIND_GAIN_PER_10K_FT).min(WIND_MULTIPLIER_CAP)
}

pub fn wind_at_altitude(base_wind_mph: f64, altitude_ft: f64) -> f64 {
    base_wind_mph * wind_multiplier(altitude_ft)
}

pub fn temperature_at_altitude(base_temp_f: f64, altitude_ft: f64) -> f64 {
    base_temp_f - (altitude_ft / 1_000.0) * LAPSE_RATE_F_PER_1K_FT
}

pub fn pressure_at_altitude(base_pressure_hpa: f64, altitude_ft: f64) -> f64 {
    base_pressure_hpa * (-altitude_ft / PRESSURE_SCALE_HEIGHT_FT).exp()
}

/// The six 5,000 ft bands from the surface to 30,000 ft.
pub fn terminal_sample_bands() -> Vec<AltitudeBand> {
    let count = (TERMINAL_CEILING_FT / TERMINAL_BAND_STEP_FT).round() as usize;
    (0..count)
        .map(|i| {
            let floor = i as f64 * TERMINAL_BAND_STEP_FT;
            AltitudeBand::new(floor, floor + TERMINAL_BAND_STEP_FT)
        })
        .collect()
}

/// Representative altitude for a band (its midpoint).
pub fn band_sample_altitude(band: &AltitudeBand) -> f64 {
    (band.min_ft + band.max_ft) / 2.0
}

impl WeatherReading {
    /// Reading adjusted to `altitude_ft` with the full wind multiplier.
    pub fn at_altitude(&self, altitude_ft: f64) -> WeatherReading {
        WeatherReading {
            wind_speed_mph: wind_at_altitude(self.wind_speed_mph, altitude_ft),
            temperature_f: temperature_at_altitude(self.temperature_f, altitude_ft),
            humidity_pct: self.humidity_pct,
            pressure_hpa: pressure_at_altitude(self.pressure_hpa, altitude_ft),
            description: self.description.clone(),
        }
    }

    /// Reading adjusted to `altitude_ft` but keeping the surface wind.
    ///
    /// Used for climb and descent, where the multiplier overstates low-level wind.
    pub fn at_altitude_surface_wind(&self, altitude_ft: f64) -> WeatherReading {
        WeatherReading {
            wind_speed_mph: self.wind_speed_mph,
            ..self.at_altitude(altitude_ft)
        }
    }
}
