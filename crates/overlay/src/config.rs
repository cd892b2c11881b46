pub const DEFAULT_POLLUTION_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_MAPTILER_BASE_URL: &str = "https://api.maptiler.com";

pub const OPENWEATHER_KEY_VAR: &str = "OPENWEATHER_API_KEY";
pub const MAPTILER_KEY_VAR: &str = "MAPTILER_API_KEY";

/// Where an API key comes from.
///
/// `Env` keys are looked up on every request so a key exported after start-up
/// is picked up without rebuilding the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKey {
    Env(&'static str),
    Fixed(String),
}

impl ApiKey {
    /// Current key value; an unset variable yields an empty key and the
    /// upstream rejects the request.
    pub fn resolve(&self) -> String {
        match self {
            ApiKey::Env(var) => std::env::var(var).unwrap_or_default(),
            ApiKey::Fixed(key) => key.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub pollution_base_url: String,
    pub pollution_key: ApiKey,
    pub maptiler_base_url: String,
    pub maptiler_key: ApiKey,
}

impl Config {
    pub fn from_env() -> Self {
        let pollution_base_url = std::env::var("AIRMAP_POLLUTION_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_POLLUTION_BASE_URL.to_string());
        let maptiler_base_url = std::env::var("AIRMAP_MAPTILER_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_MAPTILER_BASE_URL.to_string());
        Config {
            pollution_base_url,
            pollution_key: ApiKey::Env(OPENWEATHER_KEY_VAR),
            maptiler_base_url,
            maptiler_key: ApiKey::Env(MAPTILER_KEY_VAR),
        }
    }

    /// Config pointing both upstreams at `base_url` with fixed keys.
    pub fn with_base_url(base_url: &str, key: &str) -> Self {
        Config {
            pollution_base_url: base_url.to_string(),
            pollution_key: ApiKey::Fixed(key.to_string()),
            maptiler_base_url: base_url.to_string(),
            maptiler_key: ApiKey::Fixed(key.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::from_env()
    }
}
