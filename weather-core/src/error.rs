use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Remote API a request was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Forecast,
    Location,
    Sms,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Forecast => "AccuWeather forecast",
            Service::Location => "AccuWeather location search",
            Service::Sms => "Twilio message",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single outbound HTTP call.
///
/// Transport errors are stored without their URL, since the AccuWeather key
/// travels as a query parameter.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Failed to send {service} request: {source}")]
    Transport {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} request failed with status {status}: {body}")]
    Status {
        service: Service,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse {service} response: {source}")]
    Decode {
        service: Service,
        #[source]
        source: serde_json::Error,
    },

    #[error("{service} response contained no data")]
    Empty { service: Service },
}

impl RequestError {
    pub(crate) fn transport(service: Service, source: reqwest::Error) -> Self {
        RequestError::Transport { service, source: source.without_url() }
    }

    pub(crate) fn status(service: Service, status: reqwest::StatusCode, body: &str) -> Self {
        RequestError::Status { service, status, body: truncate_body(body) }
    }

    pub fn service(&self) -> Service {
        match self {
            RequestError::Transport { service, .. }
            | RequestError::Status { service, .. }
            | RequestError::Decode { service, .. }
            | RequestError::Empty { service } => *service,
        }
    }
}

/// A check run that could not complete. Both variants end the invocation.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Forecast fetch failed: {0}")]
    Fetch(RequestError),

    #[error("Notification dispatch failed: {0}")]
    Dispatch(RequestError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Env. variable {0} not found. Make sure it has been set in the current environment.")]
    MissingVar(&'static str),

    #[error("Env. variable {0} is set but empty.")]
    EmptyVar(&'static str),

    #[error(
        "No location configured.\n\
         Hint: set DEFAULT_LOCATION_KEY and DEFAULT_LOCATION_NAME, add a [location] table \
         to the settings file, or pass --location <query>."
    )]
    MissingLocation,

    #[error("Settings file not found: {}", .0.display())]
    SettingsNotFound(PathBuf),

    #[error("Failed to read settings file {}: {source}", .path.display())]
    ReadSettings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {}: {source}", .path.display())]
    ParseSettings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid setting {field} in {}: {reason}", .path.display())]
    InvalidSetting {
        path: PathBuf,
        field: &'static str,
        reason: &'static str,
    },

    #[error("Could not determine platform config directory")]
    NoConfigDir,
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
