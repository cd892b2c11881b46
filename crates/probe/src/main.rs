use airmap_overlay::config::Config;
use airmap_overlay::headless::HeadlessMap;
use airmap_overlay::overlay::{OverlayHandle, UpdateOutcome};
use airmap_overlay::session::{MapSession, INITIAL_ZOOM};
use airmap_shared::format::format_concentration;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: cargo run -p airmap-probe -- (--lat <lat> --lon <lon> | --query <place>) [--style]";

fn get_arg(flag: &str) -> Option<String> {
    std::env::args().skip_while(|a| a != flag).nth(1)
}

fn has_flag(flag: &str) -> bool {
    std::env::args().any(|a| a == flag)
}

fn get_f64_arg(flag: &str) -> Option<f64> {
    get_arg(flag).map(|raw| {
        raw.parse().unwrap_or_else(|_| {
            eprintln!("Error: {flag} expects a number, got {raw}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        })
    })
}

fn format_report(handle: &OverlayHandle) -> String {
    let r = &handle.reading;
    let mut out = String::new();
    out.push_str("=== Air Quality ===\n");
    out.push_str(&format!("  Location: {}\n", handle.coordinate));
    if let Some(at) = r.measured_at {
        out.push_str(&format!("  Measured: {}\n", at.to_rfc3339()));
    }
    out.push_str(&format!("  AQI (PM2.5): {} ({})\n", handle.aqi, handle.category));
    out.push_str(&format!("  Provider index: {}/5\n", r.provider_index));
    out.push_str(&format!("  Overlay color: {}\n\n", handle.color.to_css()));

    out.push_str("=== Concentrations (µg/m³) ===\n");
    for (name, value) in [
        ("CO", r.co),
        ("NO2", r.no2),
        ("O3", r.o3),
        ("PM2.5", r.pm2_5),
        ("PM10", r.pm10),
    ] {
        out.push_str(&format!("  {:<6}{}\n", name, format_concentration(value)));
    }
    out
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let mut map = HeadlessMap::new(INITIAL_ZOOM);
    map.load(Vec::new());
    let session = MapSession::new(map, Config::from_env());
    if let Err(e) = session.on_load() {
        eprintln!("Warning: failed to add building layer: {e}");
    }

    let outcome = match (get_arg("--query"), get_f64_arg("--lat"), get_f64_arg("--lon")) {
        (Some(query), _, _) => {
            let results = session.geocoder().forward_geocode(&query).await;
            let Some(place) = results.first() else {
                eprintln!("No places found for {query}");
                std::process::exit(1);
            };
            eprintln!("Using {} ({})", place.place_name, place.center);
            session.on_search_result(place).await
        }
        (None, Some(lat), Some(lon)) => session.on_geolocate(lon, lat).await,
        _ => {
            eprintln!("Error: either --query or both --lat and --lon are required");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    match outcome {
        UpdateOutcome::Installed(handle) => print!("{}", format_report(&handle)),
        UpdateOutcome::Failed(e) => {
            eprintln!("Failed to update air quality overlay: {e}");
            std::process::exit(1);
        }
        UpdateOutcome::NotLoaded | UpdateOutcome::Superseded { .. } => {
            eprintln!("Overlay was not installed");
            std::process::exit(1);
        }
    }

    if has_flag("--style") {
        let style = match session.map().lock() {
            Ok(view) => view.to_style_json(),
            Err(_) => {
                eprintln!("Map state lock poisoned");
                std::process::exit(1);
            }
        };
        match serde_json::to_string_pretty(&style) {
            Ok(json) => println!("\n{json}"),
            Err(e) => eprintln!("Failed to serialize style: {e}"),
        }
    }
}
