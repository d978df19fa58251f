//! Advisory feed normalisation: hazard/severity codes and the XML and
//! JSON/GeoJSON parsers that produce [`AdvisoryRecord`]s.
//!
//! Parsers are independent; [`parse_feed`] only picks one.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use thiserror::Error;

use crate::models::{AdvisoryRecord, AltitudeBand, HazardType};
use crate::regions::{region_label, AREA_NOT_SPECIFIED};
use crate::severity::SeverityLevel;
use crate::spatial::polygon_centroid;

#[derive(Debug, Error)]
pub enum FeedParseError {
    #[error("advisory feed is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unrecognised advisory feed shape")]
    UnexpectedShape,
    #[error("empty advisory feed body")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Xml,
    Json,
}

impl FeedFormat {
    /// Pick a parser from the content type, falling back to sniffing the body.
    pub fn detect(content_type: Option<&str>, body: &str) -> Option<FeedFormat> {
        if let Some(content_type) = content_type {
            let content_type = content_type.to_ascii_lowercase();
            if content_type.contains("html") {
                return None;
            }
            if content_type.contains("xml") {
                return Some(FeedFormat::Xml);
            }
            if content_type.contains("json") {
                return Some(FeedFormat::Json);
            }
        }
        let head = body.trim_start();
        match head.chars().next() {
            Some('<') if looks_like_html(head) => None,
            Some('<') => Some(FeedFormat::Xml),
            Some('[') | Some('{') => Some(FeedFormat::Json),
            _ => None,
        }
    }
}

fn looks_like_html(head: &str) -> bool {
    let prefix: String = head.chars().take(16).collect::<String>().to_ascii_lowercase();
    prefix.starts_with("<!doctype html") || prefix.starts_with("<html")
}

/// Normalise a published hazard code (`TURB-HI`, `ICG`, `MTW`, `LLWS`, ...).
pub fn normalize_hazard_type(raw: &str) -> HazardType {
    let code = raw.trim().to_ascii_uppercase();
    if code.is_empty() {
        return HazardType::Unknown;
    }
    if code.starts_with("TURB") {
        HazardType::Turbulence
    } else if code.starts_with("ICG") || code == "ICING" {
        HazardType::Icing
    } else if code.contains("MTW") || code == "MOUNTAIN WAVE" {
        HazardType::MountainWave
    } else if code.contains("LLWS") || code == "LOW LEVEL WIND SHEAR" {
        HazardType::LowLevelWindShear
    } else {
        HazardType::Unknown
    }
}

/// Normalise a severity code. Unknown or missing codes mean `Moderate`.
pub fn normalize_severity(raw: Option<&str>) -> SeverityLevel {
    let Some(raw) = raw else {
        return SeverityLevel::Moderate;
    };
    let code = raw.trim().to_ascii_uppercase();
    if code.contains("SEV") {
        SeverityLevel::Severe
    } else if code.contains("MOD") {
        SeverityLevel::Moderate
    } else if code.contains("LGT") || code.contains("LIGHT") {
        SeverityLevel::Light
    } else {
        SeverityLevel::Moderate
    }
}

/// Parse a single altitude token: `SFC`, `FL180`, `18000`.
pub fn parse_altitude_token(token: &str) -> Option<f64> {
    let token = token.trim().to_ascii_uppercase();
    if token == "SFC" || token == "SURFACE" {
        return Some(0.0);
    }
    if let Some(level) = token.strip_prefix("FL") {
        return level.trim().parse::<f64>().ok().map(|fl| fl * 100.0);
    }
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an altitude range such as `FL180-FL450` or `SFC-10000`.
///
/// Unparseable text yields [`AltitudeBand::UNBOUNDED`]; a missing upper bound
/// leaves the band open to the top.
pub fn parse_altitude_text(text: &str) -> AltitudeBand {
    let mut parts = text.splitn(2, '-');
    let min = parts.next().and_then(parse_altitude_token);
    let max = parts.next().and_then(parse_altitude_token);
    match (min, max) {
        (Some(min), Some(max)) => AltitudeBand::new(min, max),
        (Some(min), None) => AltitudeBand::new(min, AltitudeBand::UNBOUNDED.max_ft),
        _ => AltitudeBand::UNBOUNDED,
    }
}

/// Area label for an advisory: polygon centroid region, else feed text.
fn area_label_for(polygon: &[[f64; 2]], feed_area: Option<&str>) -> String {
    if let Some(center) = polygon_centroid(polygon) {
        return region_label(center.lat, center.lon).to_string();
    }
    feed_area
        .map(str::trim)
        .filter(|area| !area.is_empty())
        .unwrap_or(AREA_NOT_SPECIFIED)
        .to_string()
}

// ========== XML ==========

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("advisory regex pattern is valid"))
}

fn product_root_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)<(response|data|GAIRMET)\b")
}

fn gairmet_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?is)<GAIRMET\b[^>]*>(.*?)</GAIRMET>")
}

fn point_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?is)<point\b[^>]*>(.*?)</point>")
}

fn element_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?is)<([A-Za-z_][\w.-]*)\b[^>]*>([^<]*)</([A-Za-z_][\w.-]*)>")
}

fn empty_element_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?is)<([A-Za-z_][\w.-]*)\b([^>]*?)/?>")
}

fn attribute_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r#"([A-Za-z_][\w.-]*)\s*=\s*"([^"]*)""#)
}

/// Text content of the first `<tag>..</tag>` in `xml`.
fn xml_text(xml: &str, tag: &str) -> Option<String> {
    element_re()
        .captures_iter(xml)
        .find(|caps| caps[1].eq_ignore_ascii_case(tag) && caps[3].eq_ignore_ascii_case(tag))
        .map(|caps| caps[2].trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Attributes of the first `<tag ...>` in `xml`.
fn xml_attributes(xml: &str, tag: &str) -> Option<Vec<(String, String)>> {
    empty_element_re()
        .captures_iter(xml)
        .find(|caps| caps[1].eq_ignore_ascii_case(tag))
        .map(|caps| {
            attribute_re()
                .captures_iter(&caps[2])
                .map(|attr| (attr[1].to_ascii_lowercase(), attr[2].to_string()))
                .collect()
        })
}

fn attribute<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Parse an XML G-AIRMET product document.
///
/// Entries without a `<hazard>` element are skipped. A document with no
/// `<response>`, `<data>` or `<GAIRMET>` element (an HTML error page, say)
/// is rejected rather than read as an empty product.
pub fn parse_xml_feed(xml: &str) -> Result<Vec<AdvisoryRecord>, FeedParseError> {
    if xml.trim().is_empty() {
        return Err(FeedParseError::Empty);
    }
    if !product_root_re().is_match(xml) {
        return Err(FeedParseError::UnexpectedShape);
    }
    Ok(gairmet_block_re()
        .captures_iter(xml)
        .filter_map(|caps| parse_xml_entry(&caps[1]))
        .collect())
}

fn parse_xml_entry(entry: &str) -> Option<AdvisoryRecord> {
    let hazard_attrs = xml_attributes(entry, "hazard")?;
    let raw_hazard = attribute(&hazard_attrs, "type")?.trim().to_string();
    if raw_hazard.is_empty() {
        return None;
    }
    let severity = normalize_severity(attribute(&hazard_attrs, "severity"));

    let altitude = match xml_attributes(entry, "altitude") {
        Some(attrs) => {
            let min = attribute(&attrs, "min_ft_msl").and_then(parse_altitude_token);
            let max = attribute(&attrs, "max_ft_msl").and_then(parse_altitude_token);
            AltitudeBand::new(
                min.unwrap_or(AltitudeBand::UNBOUNDED.min_ft),
                max.unwrap_or(AltitudeBand::UNBOUNDED.max_ft),
            )
        }
        None => AltitudeBand::UNBOUNDED,
    };

    let polygon: Vec<[f64; 2]> = point_re()
        .captures_iter(entry)
        .filter_map(|point| {
            let lat = xml_text(&point[1], "latitude")?.parse::<f64>().ok()?;
            let lon = xml_text(&point[1], "longitude")?.parse::<f64>().ok()?;
            (lat.is_finite() && lon.is_finite()).then_some([lat, lon])
        })
        .collect();

    Some(AdvisoryRecord {
        hazard_type: normalize_hazard_type(&raw_hazard),
        raw_hazard,
        severity,
        altitude,
        area_label: area_label_for(&polygon, xml_text(entry, "area_desc").as_deref()),
        polygon,
        valid_time: xml_text(entry, "valid_time"),
        product: xml_text(entry, "product"),
    })
}

// ========== JSON / GeoJSON ==========

fn str_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn altitude_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_altitude_token(s),
        _ => None,
    }
}

fn json_altitude(obj: &Map<String, Value>) -> AltitudeBand {
    match obj.get("altitude") {
        Some(Value::Object(alt)) => {
            let min = alt.get("min").and_then(altitude_value);
            let max = alt.get("max").and_then(altitude_value);
            return AltitudeBand::new(
                min.unwrap_or(AltitudeBand::UNBOUNDED.min_ft),
                max.unwrap_or(AltitudeBand::UNBOUNDED.max_ft),
            );
        }
        Some(Value::String(text)) => return parse_altitude_text(text),
        _ => {}
    }

    let base = obj.get("base").and_then(altitude_value);
    let top = obj.get("top").and_then(altitude_value);
    if base.is_none() && top.is_none() {
        return AltitudeBand::UNBOUNDED;
    }
    AltitudeBand::new(
        base.unwrap_or(AltitudeBand::UNBOUNDED.min_ft),
        top.unwrap_or(AltitudeBand::UNBOUNDED.max_ft),
    )
}

/// `coords` as `[{lat, lon}]` or `[[lat, lon]]`.
fn json_coords(value: &Value) -> Vec<[f64; 2]> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(point) => {
                let lat = point.get("lat").and_then(Value::as_f64)?;
                let lon = point
                    .get("lon")
                    .or_else(|| point.get("lng"))
                    .and_then(Value::as_f64)?;
                Some([lat, lon])
            }
            Value::Array(pair) if pair.len() >= 2 => {
                Some([pair[0].as_f64()?, pair[1].as_f64()?])
            }
            _ => None,
        })
        .collect()
}

/// Outer ring of a GeoJSON Polygon/MultiPolygon, converted to `[lat, lon]`.
fn geojson_ring(geometry: &Value) -> Vec<[f64; 2]> {
    let kind = geometry.get("type").and_then(Value::as_str).unwrap_or_default();
    let coordinates = geometry.get("coordinates");
    let ring = match kind {
        "Polygon" => coordinates.and_then(|c| c.get(0)),
        "MultiPolygon" => coordinates.and_then(|c| c.get(0)).and_then(|p| p.get(0)),
        _ => None,
    };
    ring.and_then(Value::as_array)
        .map(|vertices| {
            vertices
                .iter()
                .filter_map(|v| Some([v.get(1)?.as_f64()?, v.get(0)?.as_f64()?]))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_json_entry(obj: &Map<String, Value>, geometry: Option<&Value>) -> Option<AdvisoryRecord> {
    let raw_hazard = str_field(obj, &["hazard", "hazardType", "hazard_type"])?.to_string();

    let mut polygon = geometry.map(geojson_ring).unwrap_or_default();
    if polygon.is_empty() {
        if let Some(coords) = obj.get("coords") {
            polygon = json_coords(coords);
        }
    }

    Some(AdvisoryRecord {
        hazard_type: normalize_hazard_type(&raw_hazard),
        raw_hazard,
        severity: normalize_severity(str_field(obj, &["severity", "intensity"])),
        altitude: json_altitude(obj),
        area_label: area_label_for(&polygon, str_field(obj, &["area", "areaLabel", "area_label"])),
        polygon,
        valid_time: str_field(obj, &["validTime", "valid_time"]).map(str::to_string),
        product: str_field(obj, &["product"]).map(str::to_string),
    })
}

/// Parse a JSON array of advisory objects or a GeoJSON FeatureCollection.
pub fn parse_json_feed(body: &str) -> Result<Vec<AdvisoryRecord>, FeedParseError> {
    if body.trim().is_empty() {
        return Err(FeedParseError::Empty);
    }
    let root: Value = serde_json::from_str(body)?;

    if let Some(features) = root.get("features").and_then(Value::as_array) {
        return Ok(features
            .iter()
            .filter_map(|feature| {
                let props = feature.get("properties")?.as_object()?;
                parse_json_entry(props, feature.get("geometry"))
            })
            .collect());
    }

    match root {
        Value::Array(items) => Ok(items
            .iter()
            .filter_map(|item| parse_json_entry(item.as_object()?, None))
            .collect()),
        _ => Err(FeedParseError::UnexpectedShape),
    }
}

/// Select a parser for `body` and run it.
pub fn parse_feed(
    body: &str,
    content_type: Option<&str>,
) -> Result<Vec<AdvisoryRecord>, FeedParseError> {
    match FeedFormat::detect(content_type, body) {
        Some(FeedFormat::Xml) => parse_xml_feed(body),
        Some(FeedFormat::Json) => parse_json_feed(body),
        None if body.trim().is_empty() => Err(FeedParseError::Empty),
        None => Err(FeedParseError::UnexpectedShape),
    }
}
