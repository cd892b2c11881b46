use airmap_shared::models::{Coordinate, PollutantReading};
use chrono::DateTime;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{Error, Result};

/// Build the air-pollution request URL for a coordinate.
pub fn build_air_pollution_url(base_url: &str, coordinate: Coordinate, api_key: &str) -> String {
    format!(
        "{}/data/2.5/air_pollution?lat={}&lon={}&appid={}",
        base_url.trim_end_matches('/'),
        coordinate.latitude,
        coordinate.longitude,
        api_key
    )
}

// Types mirroring the air-pollution response

#[derive(Debug, Clone, Deserialize)]
pub struct AirPollutionResponse {
    pub list: Vec<PollutionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollutionEntry {
    #[serde(default)]
    pub dt: Option<i64>,
    pub main: MainIndex,
    pub components: Components,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainIndex {
    pub aqi: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Components {
    pub co: f64,
    pub no2: f64,
    pub o3: f64,
    pub pm2_5: f64,
    pub pm10: f64,
}

impl AirPollutionResponse {
    /// Take `list[0]` as the reading for `coordinate`.
    pub fn into_reading(self, coordinate: Coordinate) -> Result<PollutantReading> {
        let entry = self
            .list
            .into_iter()
            .next()
            .ok_or_else(|| Error::invalid_response("response list is empty"))?;
        let c = entry.components;
        Ok(PollutantReading {
            coordinate,
            co: c.co,
            no2: c.no2,
            o3: c.o3,
            pm2_5: c.pm2_5,
            pm10: c.pm10,
            provider_index: entry.main.aqi,
            measured_at: entry.dt.and_then(|secs| DateTime::from_timestamp(secs, 0)),
        })
    }
}

/// Parse and validate a raw response body.
pub fn parse_air_pollution(body: &str, coordinate: Coordinate) -> Result<PollutantReading> {
    let resp: AirPollutionResponse =
        serde_json::from_str(body).map_err(|e| Error::invalid_response(e.to_string()))?;
    resp.into_reading(coordinate)
}

/// Client for the air-pollution endpoint.
#[derive(Debug, Clone)]
pub struct PollutionClient {
    http: reqwest::Client,
    config: Config,
}

impl PollutionClient {
    pub fn new(config: Config) -> Self {
        PollutionClient {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn with_http(http: reqwest::Client, config: Config) -> Self {
        PollutionClient { http, config }
    }

    /// Fetch the current reading at `coordinate`.
    ///
    /// The API key is resolved here, per request.
    pub async fn fetch(&self, coordinate: Coordinate) -> Result<PollutantReading> {
        let url = build_air_pollution_url(
            &self.config.pollution_base_url,
            coordinate,
            &self.config.pollution_key.resolve(),
        );

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        parse_air_pollution(&body, coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{spawn_upstream, UpstreamReply};

    const SAMPLE: &str = r#"{"coord":{"lon":-0.1278,"lat":51.5074},"list":[{"main":{"aqi":2},"components":{"co":200,"no":0.1,"no2":10,"o3":30,"so2":1.2,"pm2_5":40,"pm10":60,"nh3":0.5},"dt":1700000000}]}"#;

    fn london() -> Coordinate {
        Coordinate::new(-0.1278, 51.5074)
    }

    // --- URL builder ---

    #[test]
    fn test_build_air_pollution_url() {
        assert_eq!(
            build_air_pollution_url("https://api.openweathermap.org", london(), "key123"),
            "https://api.openweathermap.org/data/2.5/air_pollution?lat=51.5074&lon=-0.1278&appid=key123"
        );
    }

    #[test]
    fn test_build_air_pollution_url_trims_trailing_slash() {
        let url = build_air_pollution_url("http://localhost:8080/", Coordinate::new(1.0, 2.0), "");
        assert_eq!(url, "http://localhost:8080/data/2.5/air_pollution?lat=2&lon=1&appid=");
    }

    // --- Response validation ---

    #[test]
    fn test_parse_full_response() {
        let reading = parse_air_pollution(SAMPLE, london()).unwrap();
        assert_eq!(reading.provider_index, 2);
        assert!((reading.co - 200.0).abs() < 1e-9);
        assert!((reading.pm2_5 - 40.0).abs() < 1e-9);
        assert!((reading.pm10 - 60.0).abs() < 1e-9);
        assert_eq!(reading.coordinate, london());
        assert_eq!(reading.measured_at.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_parse_without_timestamp() {
        let body = r#"{"list":[{"main":{"aqi":1},"components":{"co":1,"no2":2,"o3":3,"pm2_5":4,"pm10":5}}]}"#;
        let reading = parse_air_pollution(body, london()).unwrap();
        assert!(reading.measured_at.is_none());
    }

    #[test]
    fn test_parse_empty_list_is_invalid() {
        let err = parse_air_pollution(r#"{"list":[]}"#, london()).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse { .. }));
    }

    #[test]
    fn test_parse_missing_list_is_invalid() {
        let err = parse_air_pollution(r#"{"cod":401,"message":"Invalid API key"}"#, london())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResponse { .. }));
    }

    #[test]
    fn test_parse_missing_component_is_invalid() {
        let body = r#"{"list":[{"main":{"aqi":1},"components":{"co":1,"no2":2,"o3":3,"pm10":5}}]}"#;
        let err = parse_air_pollution(body, london()).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse { .. }));
    }

    #[test]
    fn test_parse_non_json_is_invalid() {
        let err = parse_air_pollution("<html>bad gateway</html>", london()).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse { .. }));
    }

    // --- HTTP ---

    #[tokio::test]
    async fn test_fetch_success() {
        let upstream = spawn_upstream(UpstreamReply::ok(SAMPLE)).await;
        let client = PollutionClient::new(Config::with_base_url(&upstream.base_url, "k"));

        let reading = client.fetch(london()).await.unwrap();
        assert!((reading.pm2_5 - 40.0).abs() < 1e-9);

        let seen = upstream.requests();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].starts_with("/data/2.5/air_pollution?"));
        assert!(seen[0].contains("lat=51.5074"));
        assert!(seen[0].contains("lon=-0.1278"));
        assert!(seen[0].contains("appid=k"));
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_status() {
        let upstream = spawn_upstream(UpstreamReply::status(500, "oops")).await;
        let client = PollutionClient::new(Config::with_base_url(&upstream.base_url, "k"));

        let err = client.fetch(london()).await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 500 }));
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_fetch_unauthorized_is_status() {
        let upstream = spawn_upstream(UpstreamReply::status(401, r#"{"cod":401}"#)).await;
        let client = PollutionClient::new(Config::with_base_url(&upstream.base_url, ""));

        let err = client.fetch(london()).await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 401 }));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_is_network() {
        let client = PollutionClient::new(Config::with_base_url("http://127.0.0.1:1", "k"));
        let err = client.fetch(london()).await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }
}
