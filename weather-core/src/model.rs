use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// An AccuWeather location: the opaque key used in forecast URLs plus a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Location {
    pub key: String,
    pub name: String,
}

impl Location {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self { key: key.into(), name: name.into() }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.key)
    }
}

/// Precipitation expected within a forecast window.
#[derive(Debug, Clone, PartialEq)]
pub struct Precipitation {
    /// e.g. "Rain", "Snow", "Ice", "Mixed".
    pub kind: String,
    /// e.g. "Light", "Moderate", "Heavy".
    pub intensity: Option<String>,
    /// Only reported for day/night halves.
    pub hours: Option<f64>,
}

/// Forecast for the next hour.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyForecast {
    pub starts_at: DateTime<FixedOffset>,
    pub phrase: String,
    pub temperature: f64,
    pub precipitation_probability: u8,
    pub precipitation: Option<Precipitation>,
}

/// One half (day or night) of a daily forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct HalfDay {
    pub phrase: String,
    pub precipitation_probability: u8,
    pub precipitation: Option<Precipitation>,
}

/// Forecast for the current day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast {
    pub date: DateTime<FixedOffset>,
    pub minimum: f64,
    pub maximum: f64,
    pub day: HalfDay,
    pub night: HalfDay,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Forecast {
    Hourly(HourlyForecast),
    Daily(DailyForecast),
}

/// Receipt returned by the SMS gateway for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub sid: String,
    pub status: String,
    pub created_at: Option<DateTime<FixedOffset>>,
}
