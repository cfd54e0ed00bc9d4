//! Weather adapter - current conditions from open-meteo
//!
//! Low-frequency poll feeding the header ticker. A failed poll keeps the
//! previous reading on screen.

use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::board::tickers::WeatherReading;
use crate::bus::{BusEvent, SharedBus};
use crate::config::WeatherConfig;

const WEATHER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("weather service returned HTTP {0}")]
    Status(u16),
    #[error("invalid weather URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: f64,
    weather_code: u16,
}

#[derive(Clone)]
pub struct WeatherAdapter {
    config: WeatherConfig,
    http: Client,
    bus: SharedBus,
    last: Arc<RwLock<Option<WeatherReading>>>,
    running: Arc<RwLock<bool>>,
    shutdown: Arc<RwLock<CancellationToken>>,
}

impl WeatherAdapter {
    pub fn new(config: WeatherConfig, bus: SharedBus) -> Self {
        Self {
            config,
            http: Client::builder()
                .timeout(WEATHER_TIMEOUT)
                .build()
                .unwrap_or_default(),
            bus,
            last: Arc::new(RwLock::new(None)),
            running: Arc::new(RwLock::new(false)),
            shutdown: Arc::new(RwLock::new(CancellationToken::new())),
        }
    }

    fn forecast_url(&self) -> Result<Url, WeatherError> {
        let mut url = Url::parse(&self.config.base_url)?.join("/v1/forecast")?;
        url.query_pairs_mut()
            .append_pair("latitude", &self.config.latitude.to_string())
            .append_pair("longitude", &self.config.longitude.to_string())
            .append_pair("current", "temperature_2m,weather_code")
            .append_pair("timezone", &self.config.timezone);
        Ok(url)
    }

    pub async fn fetch_current(&self) -> Result<WeatherReading, WeatherError> {
        let response = self.http.get(self.forecast_url()?).send().await?;
        if !response.status().is_success() {
            return Err(WeatherError::Status(response.status().as_u16()));
        }
        let forecast: ForecastResponse = response.json().await?;
        Ok(WeatherReading::new(
            forecast.current.temperature_2m,
            forecast.current.weather_code,
        ))
    }

    pub async fn last_reading(&self) -> Option<WeatherReading> {
        *self.last.read().await
    }

    async fn poll_once(&self) {
        match self.fetch_current().await {
            Ok(reading) => {
                tracing::debug!("Weather: {} ({:?})", reading.label(), reading.kind);
                *self.last.write().await = Some(reading);
                self.bus.publish(BusEvent::WeatherUpdated { reading });
            }
            Err(e) => tracing::warn!("Weather update failed: {}", e),
        }
    }

    async fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    async fn start_internal(&self) -> anyhow::Result<()> {
        {
            let mut running = self.running.write().await;
            if *running {
                return Ok(());
            }
            *running = true;
        }

        let shutdown = {
            let mut token = self.shutdown.write().await;
            *token = CancellationToken::new();
            token.clone()
        };

        let adapter = self.clone();
        let every = Duration::from_secs(self.config.refresh_secs.max(60));
        tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => adapter.poll_once().await,
                }
            }
            tracing::debug!("Weather loop stopped");
        });

        tracing::info!(
            "Weather adapter started ({}, {})",
            self.config.latitude,
            self.config.longitude
        );
        Ok(())
    }

    async fn stop_internal(&self) {
        self.shutdown.read().await.cancel();
        *self.running.write().await = false;
    }
}

crate::impl_startable!(WeatherAdapter, "weather", is_enabled);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_url_requests_current_conditions() {
        let adapter = WeatherAdapter::new(WeatherConfig::default(), crate::bus::create_bus());
        let url = adapter.forecast_url().unwrap();
        assert_eq!(url.path(), "/v1/forecast");
        let query = url.query().unwrap_or_default();
        assert!(query.contains("latitude=45.5017"));
        assert!(query.contains("current=temperature_2m%2Cweather_code"));
        assert!(query.contains("timezone=America%2FToronto"));
    }

    #[test]
    fn decodes_open_meteo_payload() {
        let body = r#"{"latitude":45.5,"current":{"time":"2026-10-16T09:00",
            "temperature_2m":7.4,"weather_code":3}}"#;
        let forecast: ForecastResponse = serde_json::from_str(body).unwrap();
        let current = forecast.current;
        let reading = WeatherReading::new(current.temperature_2m, current.weather_code);
        assert_eq!(reading.temperature, 7);
        assert_eq!(reading.label(), "7°");
    }
}
