//! Configuration management

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "facility-tv-board";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub board: BoardConfig,

    #[serde(default)]
    pub weather: WeatherConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            upstream: UpstreamConfig::default(),
            board: BoardConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}

fn default_port() -> u16 {
    8090
}

/// The ticketing service that serves the TV snapshot.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub data_path: String,
    /// Seeds the key store when nothing has been provisioned yet
    pub access_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8787".to_string(),
            data_path: "/api/tv/data".to_string(),
            access_key: None,
            timeout_secs: 10,
        }
    }
}

/// Board timings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub refresh_secs: u64,
    pub show_delay_ms: u64,
    pub hide_delay_ms: u64,
    pub cycle_secs: u64,
    pub idle_secs: u64,
    pub startup_grace_secs: u64,
    pub banner_refresh_secs: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            refresh_secs: 60,
            show_delay_ms: 500,
            hide_delay_ms: 300,
            cycle_secs: 10,
            idle_secs: 15,
            startup_grace_secs: 2,
            banner_refresh_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub enabled: bool,
    pub base_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub refresh_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.open-meteo.com".to_string(),
            latitude: 45.5017,
            longitude: -73.5673,
            timezone: "America/Toronto".to_string(),
            refresh_secs: 600,
        }
    }
}

/// Get config directory (XDG_CONFIG_HOME or platform default)
pub fn get_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TVB_CONFIG_DIR") {
        return PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library/Application Support")
                .join(APP_DIR_NAME);
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_DIR_NAME);
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".config").join(APP_DIR_NAME);
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join(APP_DIR_NAME);
        }
    }

    PathBuf::from(".")
}

/// Get data directory (XDG_DATA_HOME or platform default)
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TVB_DATA_DIR") {
        return PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library/Application Support")
                .join(APP_DIR_NAME);
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join(APP_DIR_NAME);
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".local/share").join(APP_DIR_NAME);
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("LOCALAPPDATA") {
            return PathBuf::from(appdata).join(APP_DIR_NAME);
        }
    }

    PathBuf::from("./data")
}

pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_dir())
}

/// Layer defaults, `config.{toml,json}` in `config_dir`, then `TVB_*` env vars.
pub fn load_config_from(config_dir: &Path) -> Result<Config> {
    let mut builder = ::config::Config::builder()
        .set_default("port", default_port() as i64)?
        .add_source(
            ::config::File::with_name(&config_dir.join("config").to_string_lossy()).required(false),
        )
        // TVB_PORT, TVB_UPSTREAM__BASE_URL, TVB_BOARD__CYCLE_SECS, ...
        .add_source(
            ::config::Environment::with_prefix("TVB")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    // Port precedence: TVB_PORT > PORT > config file > default
    if let Ok(port) = std::env::var("TVB_PORT") {
        if let Ok(port_num) = port.parse::<u16>() {
            builder = builder.set_override("port", port_num as i64)?;
        }
    } else if let Ok(port) = std::env::var("PORT") {
        if let Ok(port_num) = port.parse::<u16>() {
            builder = builder.set_override("port", port_num as i64)?;
        }
    }

    let config = builder.build()?;

    Ok(config.try_deserialize()?)
}
