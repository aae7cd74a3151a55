use std::fmt;

use thiserror::Error;

/// Validation failures for raw coordinate input
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("expected \"<lat>,<lon>\", got {0:?}")]
    MalformedPair(String),
}

/// A WGS84 coordinate, validated on construction and immutable afterwards.
///
/// Out-of-range input is an error, never clamped, so every `GeoPoint` that
/// exists carries plausible coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Create a point from latitude/longitude in degrees.
    ///
    /// # Returns
    /// * `Err(CoordinateError)` if either value is non-finite or outside
    ///   the valid WGS84 range
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Parse a `"<lat>,<lon>"` pair, the wire format used by share-link
    /// vertex parameters and `--vertex` arguments.
    pub fn parse_pair(raw: &str) -> Result<Self, CoordinateError> {
        let (lat, lon) = raw
            .split_once(',')
            .ok_or_else(|| CoordinateError::MalformedPair(raw.to_string()))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| CoordinateError::MalformedPair(raw.to_string()))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| CoordinateError::MalformedPair(raw.to_string()))?;
        Self::new(lat, lon)
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl fmt::Display for GeoPoint {
    /// Formats as `<lat>,<lon>`, the same pair format `parse_pair` reads
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_valid_range() {
        let point = GeoPoint::new(-34.6037, -58.3816).unwrap();
        assert_eq!(point.lat(), -34.6037);
        assert_eq!(point.lon(), -58.3816);
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert_eq!(
            GeoPoint::new(91.0, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            GeoPoint::new(0.0, -180.5),
            Err(CoordinateError::LongitudeOutOfRange(-180.5))
        );
    }

    #[test]
    fn test_new_rejects_nan() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_parse_pair() {
        let point = GeoPoint::parse_pair("-34.6037,-58.3816").unwrap();
        assert_eq!(point.lat(), -34.6037);
        assert_eq!(point.lon(), -58.3816);
    }

    #[test]
    fn test_parse_pair_rejects_garbage() {
        assert!(matches!(
            GeoPoint::parse_pair("no comma here"),
            Err(CoordinateError::MalformedPair(_))
        ));
        assert!(matches!(
            GeoPoint::parse_pair("12.0,north"),
            Err(CoordinateError::MalformedPair(_))
        ));
        assert!(matches!(
            GeoPoint::parse_pair("95.0,10.0"),
            Err(CoordinateError::LatitudeOutOfRange(_))
        ));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let point = GeoPoint::new(40.4168, -3.7038).unwrap();
        assert_eq!(GeoPoint::parse_pair(&point.to_string()).unwrap(), point);
    }
}
