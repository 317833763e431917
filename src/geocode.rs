//! Postcode → coordinate lookup for the station map.
//!
//! Each lookup is a blocking HTTP request to a Nominatim-compatible search
//! endpoint, restricted to one country. Results are not cached and failed
//! lookups are not retried: the map simply skips postcodes that cannot be
//! resolved and reports a warning for each.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::GeocoderSettings;
use crate::data::model::FuelDataset;
use crate::error::GeocodeError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Resolves a postcode (or any place string) to a single coordinate pair.
pub trait Geocoder {
    fn resolve(&self, postcode: &str) -> Result<Coordinates, GeocodeError>;
}

// ---------------------------------------------------------------------------
// Nominatim adapter
// ---------------------------------------------------------------------------

/// One entry of a Nominatim `format=json` search response. Coordinates come
/// back as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
    country: String,
}

impl NominatimGeocoder {
    pub fn new(settings: &GeocoderSettings) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            country: settings.country.clone(),
        })
    }
}

impl Geocoder for NominatimGeocoder {
    fn resolve(&self, postcode: &str) -> Result<Coordinates, GeocodeError> {
        log::debug!("Geocoding postcode {postcode} ({})", self.country);
        let http_err = |source| GeocodeError::Http {
            postcode: postcode.to_string(),
            source,
        };

        let places: Vec<Place> = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", postcode),
                ("countrycodes", self.country.as_str()),
                ("format", "json"),
                ("limit", "1"),
            ])
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(http_err)?
            .json()
            .map_err(http_err)?;

        first_place(places, postcode)
    }
}

fn first_place(places: Vec<Place>, postcode: &str) -> Result<Coordinates, GeocodeError> {
    let place = places
        .into_iter()
        .next()
        .ok_or_else(|| GeocodeError::NotFound(postcode.to_string()))?;

    match (place.lat.trim().parse::<f64>(), place.lon.trim().parse::<f64>()) {
        (Ok(latitude), Ok(longitude)) => Ok(Coordinates {
            latitude,
            longitude,
        }),
        _ => Err(GeocodeError::BadCoordinate(postcode.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Map markers for a filtered view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub postcode: String,
    pub position: Coordinates,
}

/// Outcome of one "Show Map" press.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapReport {
    pub markers: Vec<MapMarker>,
    /// One user-facing message per postcode that could not be placed.
    pub warnings: Vec<String>,
}

/// Distinct postcodes of a view, in order of first appearance.
pub fn distinct_postcodes(dataset: &FuelDataset, rows: &[usize]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    dataset
        .rows(rows)
        .filter(|rec| seen.insert(rec.postcode.as_str()))
        .map(|rec| rec.postcode.clone())
        .collect()
}

/// Resolve each postcode in turn. Failures become warnings and never stop the
/// remaining lookups.
pub fn locate_postcodes(geocoder: &dyn Geocoder, postcodes: &[String]) -> MapReport {
    let mut report = MapReport::default();
    for postcode in postcodes {
        match geocoder.resolve(postcode) {
            Ok(position) => report.markers.push(MapMarker {
                postcode: postcode.clone(),
                position,
            }),
            Err(e) => {
                log::warn!("{e}");
                report.warnings.push(e.to_string());
            }
        }
    }
    log::info!(
        "Placed {} of {} postcodes on the map",
        report.markers.len(),
        postcodes.len()
    );
    report
}
