//! Air-quality overlay for a browser map.
//!
//! Readings come from the OpenWeatherMap air-pollution API, the index and
//! colors from [`airmap_shared`]. The map itself is reached only through
//! [`map::MapView`]; [`headless::HeadlessMap`] implements it in memory.

pub mod api;
pub mod config;
pub mod error;
pub mod geocoder;
pub mod headless;
pub mod layers;
pub mod map;
pub mod overlay;
pub mod session;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
