use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::thread;
use std::time::Duration;

use crate::config::NominatimConfig;
use crate::domain::GeoPoint;

/// Structured address fields collected by the wizard forms.
#[derive(Debug, Clone)]
pub struct AddressQuery {
    pub country: String,
    pub city: String,
    pub street: String,
    pub house_number: String,
    pub postal_code: String,
}

/// Address-search capability the wizard drives.
///
/// `Ok(None)` means the service answered cleanly with zero candidates;
/// transport and protocol failures are `Err`.
pub trait Geocoder {
    fn geocode(&self, query: &AddressQuery) -> Result<Option<GeoPoint>>;
}

#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
}

/// Blocking Nominatim client.
///
/// Sends the structured search the wizard forms map onto (street + house
/// number, city, country, postal code) and takes the first candidate.
pub struct NominatimGeocoder {
    client: reqwest::blocking::Client,
    url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &NominatimConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode(&self, query: &AddressQuery) -> Result<Option<GeoPoint>> {
        // Rate limiting - Nominatim requires max 1 request per second
        thread::sleep(Duration::from_secs(1));

        let street = format!("{} {}", query.street, query.house_number);

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("format", "json"),
                ("limit", "1"),
                ("street", street.as_str()),
                ("city", query.city.as_str()),
                ("country", query.country.as_str()),
                ("postalcode", query.postal_code.as_str()),
            ])
            .send()
            .context("Failed to send request to Nominatim API")?;

        if !response.status().is_success() {
            bail!("Nominatim API returned error status: {}", response.status());
        }

        let results: Vec<NominatimResult> = response
            .json()
            .context("Failed to parse Nominatim JSON response")?;

        let Some(first) = results.into_iter().next() else {
            return Ok(None);
        };

        let lat: f64 = first
            .lat
            .parse()
            .context("Failed to parse latitude from Nominatim response")?;
        let lon: f64 = first
            .lon
            .parse()
            .context("Failed to parse longitude from Nominatim response")?;

        let point = GeoPoint::new(lat, lon)
            .context(format!("Nominatim returned unusable coordinates for {:?}", first.display_name))?;

        Ok(Some(point))
    }
}
