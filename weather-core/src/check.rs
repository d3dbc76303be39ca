//! Check types and the notification decision.
//!
//! Everything in here is pure: the same check, location, forecast and
//! thresholds always produce the same [`Decision`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{DailyForecast, Forecast, HalfDay, HourlyForecast, Location, Precipitation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckType {
    Hourly,
    Daily,
    Nightly,
}

/// Which forecast a check needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    NextHour,
    Today,
}

impl CheckType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckType::Hourly => "hourly",
            CheckType::Daily => "daily",
            CheckType::Nightly => "nightly",
        }
    }

    pub const fn all() -> &'static [CheckType] {
        &[CheckType::Hourly, CheckType::Daily, CheckType::Nightly]
    }

    pub fn window(&self) -> Window {
        match self {
            CheckType::Hourly => Window::NextHour,
            CheckType::Daily | CheckType::Nightly => Window::Today,
        }
    }

    pub fn rule(&self, thresholds: &Thresholds) -> CheckRule {
        match self {
            CheckType::Hourly => CheckRule::NextHour {
                min_probability: thresholds.precipitation_probability,
            },
            CheckType::Daily => CheckRule::DaySummary,
            CheckType::Nightly => {
                CheckRule::NightSummary { freeze_below: thresholds.freeze_warning }
            }
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid check type '{0}'. Valid check types: hourly, daily, nightly.")]
pub struct ParseCheckTypeError(String);

impl FromStr for CheckType {
    type Err = ParseCheckTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.to_lowercase();

        CheckType::all()
            .iter()
            .copied()
            .find(|check| check.as_str() == token)
            .ok_or_else(|| ParseCheckTypeError(s.to_string()))
    }
}

/// Tunable thresholds, read from the `[thresholds]` table of the settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Hourly checks notify once the precipitation probability reaches this percentage,
    /// even if AccuWeather does not flag precipitation yet.
    pub precipitation_probability: u8,

    /// Nightly checks append a freeze warning when the low is at or below this.
    pub freeze_warning: Option<f64>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { precipitation_probability: 50, freeze_warning: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CheckRule {
    NextHour { min_probability: u8 },
    DaySummary,
    NightSummary { freeze_below: Option<f64> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub notify: bool,
    pub message: String,
}

impl Decision {
    pub fn quiet() -> Self {
        Self { notify: false, message: String::new() }
    }

    pub fn send(message: String) -> Self {
        Self { notify: true, message }
    }
}

/// Map a forecast to a notify decision and message.
///
/// A forecast of the wrong shape for the check (daily data for an hourly
/// check or the reverse) yields a quiet decision.
pub fn decide(
    check: CheckType,
    location: &Location,
    forecast: &Forecast,
    thresholds: &Thresholds,
) -> Decision {
    match (check.rule(thresholds), forecast) {
        (CheckRule::NextHour { min_probability }, Forecast::Hourly(hour)) => {
            next_hour(location, hour, min_probability)
        }
        (CheckRule::DaySummary, Forecast::Daily(daily)) => day_summary(location, daily),
        (CheckRule::NightSummary { freeze_below }, Forecast::Daily(daily)) => {
            night_summary(location, daily, freeze_below)
        }
        _ => Decision::quiet(),
    }
}

fn next_hour(location: &Location, hour: &HourlyForecast, min_probability: u8) -> Decision {
    let name = location.name.to_uppercase();

    if let Some(precip) = &hour.precipitation {
        return Decision::send(format!(
            "{name}: {} expected over the next hour.",
            describe(precip)
        ));
    }

    if hour.precipitation_probability >= min_probability {
        return Decision::send(format!(
            "{name}: {}% chance of precipitation over the next hour.",
            hour.precipitation_probability
        ));
    }

    Decision::quiet()
}

fn day_summary(location: &Location, daily: &DailyForecast) -> Decision {
    let mut parts = vec![
        format!("Today's forecast for {}:", location.name),
        sentence(&daily.day.phrase),
        format!("High of {} degrees.", whole_degrees(daily.maximum)),
    ];
    parts.extend(half_day_precipitation(&daily.day));

    Decision::send(parts.join(" "))
}

fn night_summary(
    location: &Location,
    daily: &DailyForecast,
    freeze_below: Option<f64>,
) -> Decision {
    let mut parts = vec![
        format!("Tonight's forecast for {}:", location.name),
        sentence(&daily.night.phrase),
        format!("Low of {} degrees.", whole_degrees(daily.minimum)),
    ];
    parts.extend(half_day_precipitation(&daily.night));

    if freeze_below.is_some_and(|limit| daily.minimum <= limit) {
        parts.push("Freeze warning.".to_string());
    }

    Decision::send(parts.join(" "))
}

fn half_day_precipitation(half: &HalfDay) -> Option<String> {
    let precip = half.precipitation.as_ref()?;
    let text = match precip.hours {
        Some(hours) => format!("{} expected for {hours} hours.", describe(precip)),
        None => format!("{} expected.", describe(precip)),
    };
    Some(text)
}

/// "Moderate rain", or "Rain" when no intensity is reported.
fn describe(precip: &Precipitation) -> String {
    let kind = precip.kind.to_lowercase();
    match &precip.intensity {
        Some(intensity) => format!("{intensity} {kind}"),
        None => capitalize(&kind),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn sentence(phrase: &str) -> String {
    let phrase = phrase.trim();
    if phrase.ends_with('.') { phrase.to_string() } else { format!("{phrase}.") }
}

fn whole_degrees(value: f64) -> i64 {
    value.trunc() as i64
}
