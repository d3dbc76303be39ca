use directories::ProjectDirs;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{check::Thresholds, error::ConfigError, model::Location};

pub const ACCUWEATHER_API_KEY: &str = "ACCUWEATHER_API_KEY";
pub const TWILIO_ACCOUNT_SID: &str = "TWILIO_ACCOUNT_SID";
pub const TWILIO_AUTH_TOKEN: &str = "TWILIO_AUTH_TOKEN";
pub const FROM_PHONE_NUMBER: &str = "FROM_PHONE_NUMBER";
pub const TO_PHONE_NUMBER: &str = "TO_PHONE_NUMBER";
pub const DEFAULT_LOCATION_KEY: &str = "DEFAULT_LOCATION_KEY";
pub const DEFAULT_LOCATION_NAME: &str = "DEFAULT_LOCATION_NAME";

pub const ACCUWEATHER_BASE_URL: &str = "http://dataservice.accuweather.com";
pub const TWILIO_BASE_URL: &str = "https://api.twilio.com";

/// Secrets, only ever read from the environment.
#[derive(Debug)]
pub struct Credentials {
    pub weather_api_key: SecretString,
    /// Absent for dry runs.
    pub twilio: Option<TwilioCredentials>,
}

#[derive(Debug)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: SecretString,
    pub from: String,
    pub to: String,
}

impl Credentials {
    /// Read credentials through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F, require_sms: bool) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let weather_api_key = SecretString::from(required(&lookup, ACCUWEATHER_API_KEY)?);

        let twilio = if require_sms {
            Some(TwilioCredentials {
                account_sid: required(&lookup, TWILIO_ACCOUNT_SID)?,
                auth_token: SecretString::from(required(&lookup, TWILIO_AUTH_TOKEN)?),
                from: required(&lookup, FROM_PHONE_NUMBER)?,
                to: required(&lookup, TO_PHONE_NUMBER)?,
            })
        } else {
            None
        };

        Ok(Self { weather_api_key, twilio })
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name).ok_or(ConfigError::MissingVar(name))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::EmptyVar(name));
    }
    Ok(value.to_string())
}

/// Non-secret settings, optionally stored on disk.
///
/// Example TOML:
/// ```toml
/// metric = false
///
/// [location]
/// key = "347810"
/// name = "Denver"
///
/// [thresholds]
/// precipitation_probability = 60
/// freeze_warning = 32.0
/// ```
///
/// Unknown keys are rejected, so an `api_key` put here by mistake fails loudly
/// instead of being silently ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub location: Option<Location>,
    pub thresholds: Thresholds,
    /// Ask AccuWeather for metric units.
    pub metric: bool,
    pub accuweather_base_url: String,
    pub twilio_base_url: String,
    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            location: None,
            thresholds: Thresholds::default(),
            metric: false,
            accuweather_base_url: ACCUWEATHER_BASE_URL.to_string(),
            twilio_base_url: TWILIO_BASE_URL.to_string(),
            http_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the default location if `path` is `None`.
    ///
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::settings_file_path()?, false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::SettingsNotFound(path));
            }
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|source| ConfigError::ReadSettings { path: path.clone(), source })?;

        let settings: Settings = toml::from_str(&contents)
            .map_err(|source| ConfigError::ParseSettings { path: path.clone(), source })?;

        settings
            .validate()
            .map_err(|(field, reason)| ConfigError::InvalidSetting { path, field, reason })?;

        Ok(settings)
    }

    /// Returns the offending field and why it was rejected.
    fn validate(&self) -> Result<(), (&'static str, &'static str)> {
        if self.http_timeout_secs == 0 {
            return Err(("http_timeout_secs", "must be greater than zero"));
        }
        if self.thresholds.precipitation_probability > 100 {
            return Err(("thresholds.precipitation_probability", "must be a percentage (0-100)"));
        }
        Ok(())
    }

    /// Path to the default settings file.
    pub fn settings_file_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("dev", "weather-alert", "weather-alert")
            .ok_or(ConfigError::NoConfigDir)?;

        Ok(dirs.config_dir().join("settings.toml"))
    }

    /// `DEFAULT_LOCATION_KEY`/`DEFAULT_LOCATION_NAME` take precedence over the file.
    /// Setting only one of the pair is an error.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match (lookup(DEFAULT_LOCATION_KEY), lookup(DEFAULT_LOCATION_NAME)) {
            (None, None) => Ok(()),
            (Some(_), None) => Err(ConfigError::MissingVar(DEFAULT_LOCATION_NAME)),
            (None, Some(_)) => Err(ConfigError::MissingVar(DEFAULT_LOCATION_KEY)),
            (Some(_), Some(_)) => {
                let key = required(&lookup, DEFAULT_LOCATION_KEY)?;
                let name = required(&lookup, DEFAULT_LOCATION_NAME)?;
                self.location = Some(Location { key, name });
                Ok(())
            }
        }
    }

    pub fn default_location(&self) -> Result<&Location, ConfigError> {
        self.location.as_ref().ok_or(ConfigError::MissingLocation)
    }

    /// Shared HTTP client for both APIs.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.http_timeout_secs))
            .build()
    }
}

/// Everything a check run needs, loaded once at process start.
#[derive(Debug)]
pub struct Config {
    pub credentials: Credentials,
    pub settings: Settings,
}

impl Config {
    /// Load settings from disk and credentials from the process environment.
    pub fn load(settings_path: Option<&Path>, require_sms: bool) -> Result<Self, ConfigError> {
        let settings = Settings::load(settings_path)?;
        Self::from_lookup(settings, |name| std::env::var(name).ok(), require_sms)
    }

    pub fn from_lookup<F>(
        mut settings: Settings,
        lookup: F,
        require_sms: bool,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        settings.apply_env_overrides(&lookup)?;
        let credentials = Credentials::from_lookup(&lookup, require_sms)?;
        Ok(Self { credentials, settings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn full_env() -> impl Fn(&str) -> Option<String> + use<> {
        env(&[
            (ACCUWEATHER_API_KEY, "weather-secret"),
            (TWILIO_ACCOUNT_SID, "AC123"),
            (TWILIO_AUTH_TOKEN, "twilio-secret"),
            (FROM_PHONE_NUMBER, "+15550001111"),
            (TO_PHONE_NUMBER, "+15550002222"),
            (DEFAULT_LOCATION_KEY, "347810"),
            (DEFAULT_LOCATION_NAME, "Denver"),
        ])
    }

    #[test]
    fn credentials_from_full_env() {
        let creds = Credentials::from_lookup(full_env(), true).expect("credentials must load");

        assert_eq!(creds.weather_api_key.expose_secret(), "weather-secret");
        let twilio = creds.twilio.expect("twilio credentials required");
        assert_eq!(twilio.account_sid, "AC123");
        assert_eq!(twilio.auth_token.expose_secret(), "twilio-secret");
        assert_eq!(twilio.to, "+15550002222");
    }

    #[test]
    fn missing_twilio_var_is_reported_by_name() {
        let lookup = env(&[(ACCUWEATHER_API_KEY, "k"), (TWILIO_ACCOUNT_SID, "AC123")]);
        let err = Credentials::from_lookup(lookup, true).unwrap_err();

        assert!(matches!(err, ConfigError::MissingVar(TWILIO_AUTH_TOKEN)));
        assert!(err.to_string().contains("TWILIO_AUTH_TOKEN"));
    }

    #[test]
    fn dry_run_needs_only_weather_key() {
        let creds = Credentials::from_lookup(env(&[(ACCUWEATHER_API_KEY, "k")]), false)
            .expect("weather key is enough");
        assert!(creds.twilio.is_none());
    }

    #[test]
    fn blank_var_is_rejected() {
        let err = Credentials::from_lookup(env(&[(ACCUWEATHER_API_KEY, "  ")]), false).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyVar(ACCUWEATHER_API_KEY)));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = Config::from_lookup(Settings::default(), full_env(), true).unwrap();
        let printed = format!("{config:?}");

        assert!(!printed.contains("weather-secret"));
        assert!(!printed.contains("twilio-secret"));
        assert!(printed.contains("REDACTED"));
    }

    #[test]
    fn env_location_overrides_file() {
        let mut settings = Settings {
            location: Some(Location::new("1", "Somewhere")),
            ..Default::default()
        };
        settings.apply_env_overrides(full_env()).unwrap();

        assert_eq!(settings.location, Some(Location::new("347810", "Denver")));
    }

    #[test]
    fn half_configured_location_is_an_error() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env_overrides(env(&[(DEFAULT_LOCATION_KEY, "347810")]))
            .unwrap_err();

        assert!(matches!(err, ConfigError::MissingVar(DEFAULT_LOCATION_NAME)));
    }

    #[test]
    fn default_location_errors_when_not_set() {
        let settings = Settings::default();
        let err = settings.default_location().unwrap_err();
        assert!(err.to_string().contains("No location configured"));
    }

    #[test]
    fn settings_from_toml() {
        let settings: Settings = toml::from_str(
            r#"
            metric = true
            http_timeout_secs = 5

            [location]
            key = "347810"
            name = "Denver"

            [thresholds]
            precipitation_probability = 65
            "#,
        )
        .unwrap();

        assert!(settings.metric);
        assert_eq!(settings.http_timeout_secs, 5);
        assert_eq!(settings.thresholds.precipitation_probability, 65);
        assert_eq!(settings.accuweather_base_url, ACCUWEATHER_BASE_URL);
        assert_eq!(settings.default_location().unwrap().name, "Denver");
    }

    #[test]
    fn secrets_in_settings_file_are_rejected() {
        let result: Result<Settings, _> = toml::from_str(r#"api_key = "oops""#);
        assert!(result.is_err());
    }

    #[test]
    fn load_explicit_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[location]\nkey = \"2626\"\nname = \"Boulder\"\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.location, Some(Location::new("2626", "Boulder")));
    }

    #[test]
    fn missing_explicit_settings_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::SettingsNotFound(_)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "http_timeout_secs = 0\n").unwrap();

        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { field: "http_timeout_secs", .. }));
        assert!(err.to_string().contains("must be greater than zero"));
    }

    #[test]
    fn probability_over_hundred_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[thresholds]\nprecipitation_probability = 120\n").unwrap();

        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidSetting { field: "thresholds.precipitation_probability", .. }
        ));
    }

    #[test]
    fn invalid_settings_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "metric = \"yes\"").unwrap();

        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("settings.toml"));
    }
}
