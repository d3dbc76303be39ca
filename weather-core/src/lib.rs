//! Core library for the `weather-alert` task.
//!
//! This crate defines:
//! - Configuration: credentials from the environment, settings from an optional TOML file
//! - The AccuWeather forecast provider and the Twilio notifier
//! - Check types and the pure notification decision
//! - `run_check`, a single fetch → decide → notify pass
//!
//! It is used by `weather-alert-cli`, but the runner works with any
//! [`ForecastProvider`] and [`Notifier`].

pub mod check;
pub mod config;
pub mod error;
pub mod model;
pub mod notifier;
pub mod provider;
pub mod runner;

pub use check::{CheckType, Decision, Thresholds, decide};
pub use config::{Config, Credentials, Settings, TwilioCredentials};
pub use error::{AlertError, ConfigError, RequestError, Service};
pub use model::{
    DailyForecast, Forecast, HalfDay, HourlyForecast, Location, Precipitation, SentMessage,
};
pub use notifier::{LogNotifier, Notifier, twilio::TwilioNotifier};
pub use provider::{ForecastProvider, accuweather::AccuWeatherProvider};
pub use runner::{Outcome, run_check};
