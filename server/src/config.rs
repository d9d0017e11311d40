use std::{env, fmt::Display, str::FromStr};

use tracing::{error, info, warn};

pub struct Config {
    pub port: u16,
    pub store_url: String,
    pub store_anon_key: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PETMAP_PORT", "3000"),
            store_url: require("PETMAP_STORE_URL"),
            store_anon_key: require("PETMAP_STORE_ANON_KEY"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| ())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

/// A missing value is a configuration error but not fatal: startup
/// continues with an empty value and store requests fail until the
/// variable is provided.
fn require(key: &str) -> String {
    var(key).unwrap_or_else(|_| {
        error!("{key} not set, store requests will fail");
        String::new()
    })
}
