use crate::models::{AirQualityIndex, Breakpoint};

/// EPA PM2.5 breakpoints (µg/m³, 24h), Good through Hazardous.
/// The last row doubles as the catch-all for anything above 350.4.
pub const PM25_BREAKPOINTS: [Breakpoint; 7] = [
    bp(0.0, 12.0, 0, 50),
    bp(12.1, 35.4, 51, 100),
    bp(35.5, 55.4, 101, 150),
    bp(55.5, 150.4, 151, 200),
    bp(150.5, 250.4, 201, 300),
    bp(250.5, 350.4, 301, 400),
    bp(350.5, 500.4, 401, 500),
];

const fn bp(conc_lo: f64, conc_hi: f64, index_lo: u32, index_hi: u32) -> Breakpoint {
    Breakpoint {
        conc_lo,
        conc_hi,
        index_lo,
        index_hi,
    }
}

/// Pick the band for a concentration: first row whose upper bound is >= `pm25`,
/// falling back to the last row.
pub fn breakpoint_for(pm25: f64) -> &'static Breakpoint {
    PM25_BREAKPOINTS
        .iter()
        .find(|b| pm25 <= b.conc_hi)
        .unwrap_or(&PM25_BREAKPOINTS[PM25_BREAKPOINTS.len() - 1])
}

/// Derive the AQI from a PM2.5 concentration by linear interpolation inside its band.
///
/// Negative and NaN concentrations are read as 0. Values past 500.4 are not
/// clamped and keep extrapolating along the last band.
pub fn calculate_aqi(pm25: f64) -> AirQualityIndex {
    let pm25 = if pm25.is_nan() { 0.0 } else { pm25.max(0.0) };
    let b = breakpoint_for(pm25);
    let index_span = f64::from(b.index_hi - b.index_lo);
    let conc_span = b.conc_hi - b.conc_lo;
    let index = f64::from(b.index_lo) + (pm25 - b.conc_lo) * index_span / conc_span;
    // Just above a band's upper edge (e.g. 12.05) the next band's formula dips
    // below its own index_lo, never below zero.
    AirQualityIndex(index.round().max(0.0) as u32)
}

/// Circle radius at a given zoom, linear between two (zoom, radius) stops and
/// held constant outside them.
pub fn interpolate_radius(zoom: f64, low: (f64, f64), high: (f64, f64)) -> f64 {
    let (z0, r0) = low;
    let (z1, r1) = high;
    let span = z1 - z0;
    if span <= 0.0 {
        return r0;
    }
    let t = ((zoom - z0) / span).clamp(0.0, 1.0);
    r0 + t * (r1 - r0)
}
