//! Clock face and weather reading shown in the board header.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Header clock text for one minute of wall-clock time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClockFace {
    /// `14:05`
    pub time: String,
    /// `Friday 16 Oct`
    pub date: String,
    /// `16 October 2026`, above the Today list
    pub long_date: String,
}

impl ClockFace {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            time: now.format("%H:%M").to_string(),
            date: now.format("%A %-d %b").to_string(),
            long_date: now.format("%-d %B %Y").to_string(),
        }
    }
}

/// WMO weather interpretation code bucket, as reported by open-meteo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherKind {
    Clear,
    PartlyCloudy,
    Fog,
    Rain,
    Snow,
    Showers,
    Storm,
}

impl WeatherKind {
    pub fn from_code(code: u16) -> Self {
        match code {
            1..=3 => Self::PartlyCloudy,
            45..=48 => Self::Fog,
            51..=67 => Self::Rain,
            71..=77 => Self::Snow,
            80..=82 => Self::Showers,
            95.. => Self::Storm,
            _ => Self::Clear,
        }
    }

    /// Font Awesome icon class.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Clear => "fa-sun",
            Self::PartlyCloudy => "fa-cloud-sun",
            Self::Fog => "fa-smog",
            Self::Rain => "fa-cloud-rain",
            Self::Snow => "fa-snowflake",
            Self::Showers => "fa-cloud-showers-heavy",
            Self::Storm => "fa-bolt",
        }
    }

    /// Text colour class for icon and temperature.
    pub fn tone(self) -> &'static str {
        match self {
            Self::Clear => "text-yellow-400",
            Self::PartlyCloudy => "text-blue-200",
            Self::Fog => "text-slate-400",
            Self::Rain => "text-blue-400",
            Self::Snow => "text-sky-400",
            Self::Showers => "text-blue-500",
            Self::Storm => "text-yellow-500",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Whole degrees Celsius
    pub temperature: i32,
    pub kind: WeatherKind,
}

impl WeatherReading {
    pub fn new(temperature_c: f64, code: u16) -> Self {
        Self {
            temperature: temperature_c.round() as i32,
            kind: WeatherKind::from_code(code),
        }
    }

    pub fn label(&self) -> String {
        format!("{}°", self.temperature)
    }
}
