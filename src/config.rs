use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::language::Language;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub default_language: Language,
    pub request_timeout: Duration,
    pub db_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let api_base_url: String = try_load("RESTAURANT_API_URL", DEFAULT_API_URL.to_string());
        let timeout_secs: u64 = try_load("RESTAURANT_REQUEST_TIMEOUT_SECS", 15);

        Self {
            api_base_url: normalize_base_url(&api_base_url),
            default_language: try_load("RESTAURANT_DEFAULT_LANG", Language::En),
            request_timeout: Duration::from_secs(timeout_secs),
            db_path: PathBuf::from(try_load::<String>(
                "RESTAURANT_DB_PATH",
                "restaurant_console.db".to_string(),
            )),
        }
    }

    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: normalize_base_url(&api_base_url.into()),
            default_language: Language::En,
            request_timeout: Duration::from_secs(15),
            db_path: PathBuf::from("restaurant_console.db"),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = var(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };

    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
        default
    })
}
