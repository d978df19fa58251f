//! Airport lookup: OpenFlights CSV merged over a built-in table, plus a TTL cache.

use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::cache::TtlCache;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

pub trait AirportResolver: Send + Sync {
    /// Case-insensitive IATA lookup.
    fn resolve(&self, code: &str) -> Option<Airport>;
}

#[derive(Debug, Error)]
pub enum AirportLoadError {
    #[error("failed to read airport file: {0}")]
    Io(#[from] std::io::Error),
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// (code, name, city, country, lat, lon)
const FALLBACK_AIRPORTS: &[(&str, &str, &str, &str, f64, f64)] = &[
    ("JFK", "John F. Kennedy International Airport", "New York", "United States", 40.6413, -73.7781),
    ("LAX", "Los Angeles International Airport", "Los Angeles", "United States", 33.9416, -118.4085),
    ("ORD", "O'Hare International Airport", "Chicago", "United States", 41.9786, -87.9048),
    ("ATL", "Hartsfield-Jackson Atlanta International Airport", "Atlanta", "United States", 33.6407, -84.4277),
    ("DFW", "Dallas/Fort Worth International Airport", "Dallas", "United States", 32.8968, -97.0380),
    ("DEN", "Denver International Airport", "Denver", "United States", 39.8561, -104.6737),
    ("SFO", "San Francisco International Airport", "San Francisco", "United States", 37.6189, -122.3750),
    ("MIA", "Miami International Airport", "Miami", "United States", 25.7932, -80.2906),
    ("SEA", "Seattle-Tacoma International Airport", "Seattle", "United States", 47.4502, -122.3088),
    ("LAS", "Harry Reid International Airport", "Las Vegas", "United States", 36.0840, -115.1537),
    ("MCO", "Orlando International Airport", "Orlando", "United States", 28.4312, -81.3081),
    ("BOS", "Boston Logan International Airport", "Boston", "United States", 42.3656, -71.0096),
    ("IAH", "George Bush Intercontinental Airport", "Houston", "United States", 29.9902, -95.3368),
    ("EWR", "Newark Liberty International Airport", "Newark", "United States", 40.6895, -74.1745),
    ("MSP", "Minneapolis-Saint Paul International Airport", "Minneapolis", "United States", 44.8848, -93.2223),
    ("DTW", "Detroit Metropolitan Airport", "Detroit", "United States", 42.2162, -83.3554),
    ("PHX", "Phoenix Sky Harbor International Airport", "Phoenix", "United States", 33.4342, -112.0116),
    ("CLT", "Charlotte Douglas International Airport", "Charlotte", "United States", 35.2144, -80.9473),
    ("IAD", "Washington Dulles International Airport", "Washington", "United States", 38.9531, -77.4565),
    ("SLC", "Salt Lake City International Airport", "Salt Lake City", "United States", 40.7899, -111.9791),
    ("SAN", "San Diego International Airport", "San Diego", "United States", 32.7338, -117.1933),
    ("HNL", "Daniel K. Inouye International Airport", "Honolulu", "United States", 21.3245, -157.9251),
    ("ANC", "Ted Stevens Anchorage International Airport", "Anchorage", "United States", 61.1744, -149.9964),
    ("LHR", "London Heathrow Airport", "London", "United Kingdom", 51.4700, -0.4543),
    ("CDG", "Charles de Gaulle Airport", "Paris", "France", 49.0097, 2.5479),
    ("AMS", "Amsterdam Airport Schiphol", "Amsterdam", "Netherlands", 52.3105, 4.7683),
    ("FRA", "Frankfurt Airport", "Frankfurt", "Germany", 50.0379, 8.5622),
    ("MAD", "Adolfo Suarez Madrid-Barajas Airport", "Madrid", "Spain", 40.4983, -3.5676),
    ("FCO", "Leonardo da Vinci International Airport", "Rome", "Italy", 41.8045, 12.2508),
    ("ZRH", "Zurich Airport", "Zurich", "Switzerland", 47.4588, 8.5559),
    ("IST", "Istanbul Airport", "Istanbul", "Turkey", 41.2751, 28.7519),
    ("DXB", "Dubai International Airport", "Dubai", "United Arab Emirates", 25.2532, 55.3657),
    ("DOH", "Hamad International Airport", "Doha", "Qatar", 25.2730, 51.6081),
    ("DEL", "Indira Gandhi International Airport", "New Delhi", "India", 28.5562, 77.1000),
    ("BOM", "Chhatrapati Shivaji Maharaj International Airport", "Mumbai", "India", 19.0896, 72.8656),
    ("SIN", "Singapore Changi Airport", "Singapore", "Singapore", 1.3644, 103.9915),
    ("HKG", "Hong Kong International Airport", "Hong Kong", "China", 22.3080, 113.9185),
    ("PEK", "Beijing Capital International Airport", "Beijing", "China", 40.0799, 116.6031),
    ("ICN", "Incheon International Airport", "Seoul", "South Korea", 37.4602, 126.4407),
    ("NRT", "Narita International Airport", "Tokyo", "Japan", 35.7720, 140.3929),
    ("HND", "Haneda Airport", "Tokyo", "Japan", 35.5494, 139.7798),
    ("SYD", "Sydney Airport", "Sydney", "Australia", -33.9399, 151.1753),
    ("AKL", "Auckland Airport", "Auckland", "New Zealand", -37.0082, 174.7850),
    ("YVR", "Vancouver International Airport", "Vancouver", "Canada", 49.1967, -123.1815),
    ("YYZ", "Toronto Pearson International Airport", "Toronto", "Canada", 43.6777, -79.6248),
    ("MEX", "Mexico City International Airport", "Mexico City", "Mexico", 19.4363, -99.0721),
    ("GRU", "Sao Paulo/Guarulhos International Airport", "Sao Paulo", "Brazil", -23.4356, -46.4731),
];

/// Map an OpenFlights `airports.dat` record (IATA in column 4, lat/lon in 6/7).
pub fn parse_openflights_record(record: &StringRecord) -> Option<Airport> {
    let field = |index: usize| record.get(index).map(str::trim).unwrap_or_default();
    let code = normalize_code(field(4));
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    let lat: f64 = field(6).parse().ok()?;
    let lon: f64 = field(7).parse().ok()?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }
    Some(Airport {
        code,
        name: field(1).to_string(),
        city: field(2).to_string(),
        country: field(3).to_string(),
        lat,
        lon,
    })
}

/// Static airport dataset owned by the caller.
#[derive(Debug, Clone, Default)]
pub struct AirportDirectory {
    airports: HashMap<String, Airport>,
}

impl AirportDirectory {
    /// Built-in table of major airports.
    pub fn with_fallback() -> Self {
        let airports = FALLBACK_AIRPORTS
            .iter()
            .map(|(code, name, city, country, lat, lon)| {
                (
                    code.to_string(),
                    Airport {
                        code: code.to_string(),
                        name: name.to_string(),
                        city: city.to_string(),
                        country: country.to_string(),
                        lat: *lat,
                        lon: *lon,
                    },
                )
            })
            .collect();
        Self { airports }
    }

    /// Merge CSV rows over the current entries; returns how many rows loaded.
    pub fn merge_reader<R: Read>(&mut self, reader: R) -> usize {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut loaded = 0;
        for airport in rdr
            .records()
            .filter_map(Result::ok)
            .filter_map(|record| parse_openflights_record(&record))
        {
            self.airports.insert(airport.code.clone(), airport);
            loaded += 1;
        }
        loaded
    }

    pub fn merge_csv(&mut self, text: &str) -> usize {
        self.merge_reader(text.as_bytes())
    }

    pub fn load_csv_file(&mut self, path: impl AsRef<Path>) -> Result<usize, AirportLoadError> {
        let file = File::open(path)?;
        Ok(self.merge_reader(BufReader::new(file)))
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}

impl AirportResolver for AirportDirectory {
    fn resolve(&self, code: &str) -> Option<Airport> {
        self.airports.get(&normalize_code(code)).cloned()
    }
}

/// TTL cache in front of another resolver. Misses are not cached.
pub struct CachedAirportResolver<R> {
    inner: R,
    cache: TtlCache<String, Airport>,
}

impl<R: AirportResolver> CachedAirportResolver<R> {
    pub fn new(inner: R, ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner,
            cache: TtlCache::new(ttl, max_entries),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

impl<R: AirportResolver> AirportResolver for CachedAirportResolver<R> {
    fn resolve(&self, code: &str) -> Option<Airport> {
        let key = normalize_code(code);
        if let Some(airport) = self.cache.get(&key) {
            return Some(airport);
        }

        let airport = self.inner.resolve(&key)?;
        self.cache.insert(key, airport.clone());
        Some(airport)
    }
}
