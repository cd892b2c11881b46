//! Air-quality overlay lifecycle.
//!
//! At most one overlay exists per map. [`OverlaySlot`] owns it and swaps it
//! in one step under the map lock; [`PollutionLayer`] sequences the fetch
//! and drops results that a newer trigger has already superseded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use airmap_shared::calc::{calculate_aqi, interpolate_radius};
use airmap_shared::color::{category_for_aqi, color_for_aqi};
use airmap_shared::models::{
    AirQualityIndex, AqiCategory, CategoryColor, Coordinate, PollutantReading,
};

use crate::api::PollutionClient;
use crate::error::{Error, Result};
use crate::layers::{
    pollution_circle_layer, pollution_label_layer, pollution_source, POLLUTION_LAYER_IDS,
    POLLUTION_SOURCE_ID, RADIUS_STOPS,
};
use crate::map::MapView;

/// What is currently drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayHandle {
    pub coordinate: Coordinate,
    pub reading: PollutantReading,
    pub aqi: AirQualityIndex,
    pub category: AqiCategory,
    pub color: CategoryColor,
    /// Circle radius at the zoom the overlay was installed at.
    pub radius_px: f64,
    pub ticket: u64,
}

#[derive(Debug)]
pub enum UpdateOutcome {
    /// Map not ready; nothing was touched.
    NotLoaded,
    Installed(OverlayHandle),
    /// A later trigger was issued while this fetch was in flight.
    Superseded { ticket: u64 },
    /// Fetch, validation or map mutation failed; the map has no overlay.
    Failed(Error),
}

/// Zero or one overlay on a map.
#[derive(Debug, Default)]
pub struct OverlaySlot {
    active: Option<OverlayHandle>,
}

impl OverlaySlot {
    pub fn active(&self) -> Option<&OverlayHandle> {
        self.active.as_ref()
    }

    /// Remove the overlay layers and source if present. Safe to call repeatedly.
    pub fn clear<M: MapView + ?Sized>(&mut self, map: &mut M) -> Result<()> {
        self.active = None;
        for id in POLLUTION_LAYER_IDS.iter().rev() {
            if map.has_layer(id) {
                map.remove_layer(id)?;
            }
        }
        if map.has_source(POLLUTION_SOURCE_ID) {
            map.remove_source(POLLUTION_SOURCE_ID)?;
        }
        Ok(())
    }

    /// Swap whatever is drawn for an overlay built from `reading`.
    ///
    /// On a failed install the partial overlay is removed again, so the map
    /// ends with either the new overlay or none.
    pub fn replace<M: MapView + ?Sized>(
        &mut self,
        map: &mut M,
        reading: &PollutantReading,
        aqi: AirQualityIndex,
        ticket: u64,
    ) -> Result<OverlayHandle> {
        self.clear(map)?;

        if let Err(e) = install(map, reading, aqi) {
            if let Err(cleanup) = self.clear(map) {
                tracing::warn!(error = %cleanup, "Failed to remove partial pollution overlay");
            }
            return Err(e);
        }

        let handle = OverlayHandle {
            coordinate: reading.coordinate,
            reading: reading.clone(),
            aqi,
            category: category_for_aqi(aqi),
            color: color_for_aqi(aqi),
            radius_px: interpolate_radius(map.zoom(), RADIUS_STOPS[0], RADIUS_STOPS[1]),
            ticket,
        };
        self.active = Some(handle.clone());
        Ok(handle)
    }
}

fn install<M: MapView + ?Sized>(
    map: &mut M,
    reading: &PollutantReading,
    aqi: AirQualityIndex,
) -> Result<()> {
    map.add_source(POLLUTION_SOURCE_ID, pollution_source(reading, aqi))?;
    map.add_layer(pollution_circle_layer(aqi), None)?;
    map.add_layer(pollution_label_layer(), None)?;
    Ok(())
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| Error::render("map state lock poisoned"))
}

/// Fetches readings and keeps the map's overlay in step with the latest trigger.
#[derive(Debug)]
pub struct PollutionLayer {
    client: PollutionClient,
    latest_ticket: AtomicU64,
    slot: Mutex<OverlaySlot>,
}

impl PollutionLayer {
    pub fn new(client: PollutionClient) -> Self {
        PollutionLayer {
            client,
            latest_ticket: AtomicU64::new(0),
            slot: Mutex::new(OverlaySlot::default()),
        }
    }

    pub fn active(&self) -> Option<OverlayHandle> {
        self.slot.lock().ok().and_then(|s| s.active().cloned())
    }

    /// Remove the overlay from `map`.
    pub fn clear<M: MapView>(&self, map: &Mutex<M>) -> Result<()> {
        let mut view = lock(map)?;
        lock(&self.slot)?.clear(&mut *view)
    }

    /// Refresh the overlay for a new position.
    ///
    /// Never fails: errors are logged and reported as [`UpdateOutcome::Failed`].
    pub async fn update<M: MapView>(
        &self,
        map: &Mutex<M>,
        longitude: f64,
        latitude: f64,
    ) -> UpdateOutcome {
        let coordinate = Coordinate::new(longitude, latitude);
        match self.try_update(map, coordinate).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(longitude, latitude, error = %e, "Pollution overlay update failed");
                UpdateOutcome::Failed(e)
            }
        }
    }

    async fn try_update<M: MapView>(
        &self,
        map: &Mutex<M>,
        coordinate: Coordinate,
    ) -> Result<UpdateOutcome> {
        let ticket = {
            let mut view = lock(map)?;
            if !view.is_loaded() {
                tracing::debug!(%coordinate, "Map not loaded, skipping pollution update");
                return Ok(UpdateOutcome::NotLoaded);
            }
            let ticket = self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1;
            lock(&self.slot)?.clear(&mut *view)?;
            ticket
        };

        let reading = self.client.fetch(coordinate).await?;
        let aqi = calculate_aqi(reading.pm2_5);

        let mut view = lock(map)?;
        if self.latest_ticket.load(Ordering::SeqCst) != ticket {
            tracing::debug!(ticket, %coordinate, "Discarding superseded pollution reading");
            return Ok(UpdateOutcome::Superseded { ticket });
        }
        let handle = lock(&self.slot)?.replace(&mut *view, &reading, aqi, ticket)?;

        tracing::info!(
            longitude = coordinate.longitude,
            latitude = coordinate.latitude,
            aqi = aqi.value(),
            category = %handle.category,
            "Installed pollution overlay"
        );
        Ok(UpdateOutcome::Installed(handle))
    }
}
