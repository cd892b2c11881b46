//! Event wiring between the map, its controls and the pollution overlay.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use airmap_shared::models::Coordinate;

use crate::api::PollutionClient;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::geocoder::{GeocodeFeature, GeocoderClient};
use crate::layers::{
    buildings_layer, buildings_source, first_label_layer_id, BUILDINGS_LAYER_ID,
    BUILDINGS_SOURCE_ID,
};
use crate::map::{CameraOptions, MapView};
use crate::overlay::{PollutionLayer, UpdateOutcome};

pub const INITIAL_ZOOM: f64 = 2.0;

pub const FOLLOW_ZOOM: f64 = 15.5;
pub const FOLLOW_PITCH: f64 = 45.0;
pub const FOLLOW_BEARING: f64 = -17.6;
pub const FOLLOW_DURATION: Duration = Duration::from_millis(2000);

/// Camera move used whenever the map follows a new position.
pub fn follow_camera(center: Coordinate) -> CameraOptions {
    CameraOptions {
        center,
        zoom: FOLLOW_ZOOM,
        pitch: FOLLOW_PITCH,
        bearing: FOLLOW_BEARING,
        duration: FOLLOW_DURATION,
    }
}

pub fn tiles_url(config: &Config) -> String {
    format!(
        "{}/tiles/v3/tiles.json?key={}",
        config.maptiler_base_url.trim_end_matches('/'),
        config.maptiler_key.resolve()
    )
}

/// One map instance plus everything that writes to it.
pub struct MapSession<M: MapView> {
    map: Arc<Mutex<M>>,
    pollution: PollutionLayer,
    geocoder: GeocoderClient,
    config: Config,
}

impl<M: MapView> MapSession<M> {
    pub fn new(map: M, config: Config) -> Self {
        let http = reqwest::Client::new();
        let pollution_client = PollutionClient::with_http(http.clone(), config.clone());
        MapSession {
            map: Arc::new(Mutex::new(map)),
            pollution: PollutionLayer::new(pollution_client),
            geocoder: GeocoderClient::with_http(http, config.clone()),
            config,
        }
    }

    pub fn map(&self) -> &Arc<Mutex<M>> {
        &self.map
    }

    pub fn geocoder(&self) -> &GeocoderClient {
        &self.geocoder
    }

    /// Map finished loading: add extruded buildings beneath the first text label.
    ///
    /// A repeated load event leaves the existing building layer alone.
    pub fn on_load(&self) -> Result<()> {
        let mut view = self
            .map
            .lock()
            .map_err(|_| Error::render("map state lock poisoned"))?;

        let before = first_label_layer_id(&view.style_layers());
        if !view.has_source(BUILDINGS_SOURCE_ID) {
            view.add_source(BUILDINGS_SOURCE_ID, buildings_source(tiles_url(&self.config)))?;
        }
        if view.has_layer(BUILDINGS_LAYER_ID) {
            return Ok(());
        }
        view.add_layer(buildings_layer(), before.as_deref())?;
        tracing::info!(before = ?before, "Added 3D building layer");
        Ok(())
    }

    /// The map is being torn down: drop the overlay so nothing is left behind.
    pub fn on_unmount(&self) -> Result<()> {
        self.pollution.clear(&self.map)
    }

    /// New fix from the geolocation control.
    pub async fn on_geolocate(&self, longitude: f64, latitude: f64) -> UpdateOutcome {
        tracing::info!(longitude, latitude, "Location updated");
        self.follow(Coordinate::new(longitude, latitude)).await
    }

    /// The user picked a geocoder result.
    pub async fn on_search_result(&self, feature: &GeocodeFeature) -> UpdateOutcome {
        tracing::info!(place = %feature.place_name, "Search result selected");
        self.follow(feature.center).await
    }

    async fn follow(&self, center: Coordinate) -> UpdateOutcome {
        match self.map.lock() {
            Ok(mut view) => {
                if let Err(e) = view.ease_to(follow_camera(center)) {
                    tracing::warn!(error = %e, "Failed to move camera");
                }
            }
            Err(_) => tracing::warn!("Map state lock poisoned, camera not moved"),
        }
        self.pollution
            .update(&self.map, center.longitude, center.latitude)
            .await
    }
}
