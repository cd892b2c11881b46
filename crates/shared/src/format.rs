use crate::models::{AirQualityIndex, PollutantReading};

/// Decimal places used for concentrations on the map label.
pub const CONCENTRATION_PRECISION: usize = 2;

pub fn format_concentration(value: f64) -> String {
    format!("{:.*}", CONCENTRATION_PRECISION, value)
}

/// Multi-line label drawn under the overlay circle.
pub fn format_overlay_label(reading: &PollutantReading, aqi: AirQualityIndex) -> String {
    let rows = [
        ("CO", reading.co),
        ("NO₂", reading.no2),
        ("O₃", reading.o3),
        ("PM2.5", reading.pm2_5),
        ("PM10", reading.pm10),
    ];
    let mut out = format!("AQI: {}", aqi);
    for (name, value) in rows {
        out.push('\n');
        out.push_str(&format!("{}: {}", name, format_concentration(value)));
    }
    out
}
