use std::collections::HashMap;

use thiserror::Error;

use crate::domain::{CoordinateError, GeoPoint, Polygon};

/// Path under the share-link origin that resumes a saved zone
pub const RESUME_PATH: &str = "/index.html";

const PARAM_STORE_LAT: &str = "storelat";
const PARAM_STORE_LON: &str = "storelong";

/// A share link that failed to decode. Decode failures are fatal for the
/// resumed session: without valid seed coordinates there is nothing to
/// verify against, and falling back to a default location would silently
/// check the wrong zone.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("share link is missing the {0:?} parameter")]
    MissingParam(&'static str),
    #[error("share link parameter {param:?} is not a number: {value:?}")]
    InvalidFloat { param: &'static str, value: String },
    #[error("share link parameter {param:?} is not a \"<lat>,<lon>\" pair: {value:?}")]
    InvalidPair { param: &'static str, value: String },
    #[error("share link parameter {param:?} is out of range: {source}")]
    OutOfRange {
        param: &'static str,
        source: CoordinateError,
    },
}

/// Store location and polygon decoded from a share link, ready to seed a
/// verify-only session.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSeed {
    pub store: GeoPoint,
    pub polygon: Polygon,
}

/// Encode a completed zone as a resumable share link.
///
/// The parameter set and ordering (`storelat`, `storelong`, `v1`..`v4`)
/// are part of the link format; reordering or renaming them breaks
/// resumption of previously shared links.
pub fn encode(origin: &str, store: GeoPoint, polygon: &Polygon) -> String {
    let v = polygon.vertices();
    format!(
        "{origin}{RESUME_PATH}?{PARAM_STORE_LAT}={}&{PARAM_STORE_LON}={}&v1={}&v2={}&v3={}&v4={}",
        store.lat(),
        store.lon(),
        v[0],
        v[1],
        v[2],
        v[3],
    )
}

/// Decode the six required share-link parameters back into a zone.
///
/// The exact inverse of [`encode`] for any valid zone, up to
/// floating-point text precision.
pub fn decode(params: &HashMap<String, String>) -> Result<ZoneSeed, DecodeError> {
    let lat = require_float(params, PARAM_STORE_LAT)?;
    let lon = require_float(params, PARAM_STORE_LON)?;
    let store = GeoPoint::new(lat, lon).map_err(|source| {
        let param = match source {
            CoordinateError::LongitudeOutOfRange(_) => PARAM_STORE_LON,
            _ => PARAM_STORE_LAT,
        };
        DecodeError::OutOfRange { param, source }
    })?;

    let v1 = require_pair(params, "v1")?;
    let v2 = require_pair(params, "v2")?;
    let v3 = require_pair(params, "v3")?;
    let v4 = require_pair(params, "v4")?;

    Ok(ZoneSeed {
        store,
        polygon: Polygon::from_corners([v1, v2, v3, v4]),
    })
}

/// Split a share link (or a bare query string) into its parameter map.
///
/// Coordinates contain only digits, signs, dots and commas, all of which
/// are literal in a query string, so no percent-decoding is involved.
pub fn parse_query(raw: &str) -> HashMap<String, String> {
    let query = raw.split_once('?').map(|(_, q)| q).unwrap_or(raw);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn require_float(params: &HashMap<String, String>, param: &'static str) -> Result<f64, DecodeError> {
    let value = params
        .get(param)
        .ok_or(DecodeError::MissingParam(param))?;
    value.parse().map_err(|_| DecodeError::InvalidFloat {
        param,
        value: value.clone(),
    })
}

fn require_pair(
    params: &HashMap<String, String>,
    param: &'static str,
) -> Result<GeoPoint, DecodeError> {
    let value = params
        .get(param)
        .ok_or(DecodeError::MissingParam(param))?;
    GeoPoint::parse_pair(value).map_err(|source| match source {
        CoordinateError::MalformedPair(_) => DecodeError::InvalidPair {
            param,
            value: value.clone(),
        },
        out_of_range => DecodeError::OutOfRange {
            param,
            source: out_of_range,
        },
    })
}
