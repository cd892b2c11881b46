//! Forward geocoding for the search box, backed by MapTiler.
//!
//! See <https://docs.maptiler.com/cloud/api/geocoding/>

use airmap_shared::models::Coordinate;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::{Error, Result};

/// Queries shorter than this (after trimming) are not sent.
pub const MIN_QUERY_LEN: usize = 2;
/// Results offered to the user per query.
pub const RESULT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeFeature {
    pub center: Coordinate,
    pub place_name: String,
    pub text: String,
    pub properties: Value,
}

impl GeocodeFeature {
    /// Stable id for the result list, `"lon,lat"`.
    pub fn id(&self) -> String {
        format!("{},{}", self.center.longitude, self.center.latitude)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    center: [f64; 2],
    #[serde(default)]
    place_name: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    properties: Value,
}

impl From<RawFeature> for GeocodeFeature {
    fn from(raw: RawFeature) -> Self {
        GeocodeFeature {
            center: Coordinate::new(raw.center[0], raw.center[1]),
            place_name: raw.place_name,
            text: raw.text,
            properties: raw.properties,
        }
    }
}

/// Build `{base}/geocoding/{query}.json?key={key}` with the query percent-encoded
/// as a single path segment.
pub fn build_geocoding_url(base_url: &str, query: &str, api_key: &str) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(base_url).map_err(|e| Error::InvalidUrl {
        message: format!("{}: {}", base_url, e),
    })?;
    url.path_segments_mut()
        .map_err(|_| Error::InvalidUrl {
            message: format!("{} cannot be a base", base_url),
        })?
        .pop_if_empty()
        .push("geocoding")
        .push(&format!("{}.json", query));
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url)
}

pub fn parse_geocoding(body: &str) -> Result<Vec<GeocodeFeature>> {
    let resp: GeocodingResponse =
        serde_json::from_str(body).map_err(|e| Error::invalid_response(e.to_string()))?;
    Ok(resp
        .features
        .into_iter()
        .take(RESULT_LIMIT)
        .map(GeocodeFeature::from)
        .collect())
}

#[derive(Debug, Clone)]
pub struct GeocoderClient {
    http: reqwest::Client,
    config: Config,
}

impl GeocoderClient {
    pub fn new(config: Config) -> Self {
        GeocoderClient {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn with_http(http: reqwest::Client, config: Config) -> Self {
        GeocoderClient { http, config }
    }

    /// Look up `query`, failing on transport or schema errors.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] if the URL, request or response body is bad.
    pub async fn try_forward_geocode(&self, query: &str) -> Result<Vec<GeocodeFeature>> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let url = build_geocoding_url(
            &self.config.maptiler_base_url,
            query,
            &self.config.maptiler_key.resolve(),
        )?;
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
            });
        }
        let body = resp.text().await?;
        parse_geocoding(&body)
    }

    /// Best-effort lookup for the search box: failures are logged and yield no results.
    pub async fn forward_geocode(&self, query: &str) -> Vec<GeocodeFeature> {
        match self.try_forward_geocode(query).await {
            Ok(features) => features,
            Err(e) => {
                tracing::error!(query, error = %e, "Failed to forward geocode");
                Vec::new()
            }
        }
    }

    /// Reverse lookups are not offered; the search box only needs forward results.
    pub async fn reverse_geocode(&self, coordinate: Coordinate) -> Vec<GeocodeFeature> {
        tracing::debug!(%coordinate, "Reverse geocoding request ignored");
        Vec::new()
    }
}
