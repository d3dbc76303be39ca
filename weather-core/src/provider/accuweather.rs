use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    config::ACCUWEATHER_BASE_URL,
    error::{RequestError, Service},
    model::{DailyForecast, HalfDay, HourlyForecast, Location, Precipitation},
};

use super::ForecastProvider;

/// AccuWeather forecast and location APIs.
/// Reference: <https://developer.accuweather.com/apis>
#[derive(Debug)]
pub struct AccuWeatherProvider {
    api_key: SecretString,
    base_url: String,
    metric: bool,
    http: Client,
}

impl AccuWeatherProvider {
    pub fn new(api_key: SecretString, http: Client) -> Self {
        Self {
            api_key,
            base_url: ACCUWEATHER_BASE_URL.to_string(),
            metric: false,
            http,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_metric(mut self, metric: bool) -> Self {
        self.metric = metric;
        self
    }

    fn forecast_query(&self) -> Vec<(&str, &str)> {
        let mut query = vec![("apikey", self.api_key.expose_secret()), ("details", "true")];
        if self.metric {
            query.push(("metric", "true"));
        }
        query
    }

    /// Error bodies echo the request path and query (`"Reference"`), key included.
    fn redact(&self, body: &str) -> String {
        let key = self.api_key.expose_secret();
        if key.is_empty() { body.to_string() } else { body.replace(key, "[REDACTED]") }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        service: Service,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, RequestError> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| RequestError::transport(service, e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| RequestError::transport(service, e))?;

        if !status.is_success() {
            return Err(RequestError::status(service, status, &self.redact(&body)));
        }

        serde_json::from_str(&body).map_err(|source| RequestError::Decode { service, source })
    }
}

#[async_trait]
impl ForecastProvider for AccuWeatherProvider {
    async fn hourly(&self, location: &Location) -> Result<HourlyForecast, RequestError> {
        let url = format!("{}/forecasts/v1/hourly/1hour/{}", self.base_url, location.key);
        debug!(location = %location.key, "requesting hourly forecast");

        let hours: Vec<AwHour> =
            self.get_json(Service::Forecast, &url, &self.forecast_query()).await?;
        let hour =
            hours.into_iter().next().ok_or(RequestError::Empty { service: Service::Forecast })?;

        Ok(hour.into())
    }

    async fn daily(&self, location: &Location) -> Result<DailyForecast, RequestError> {
        let url = format!("{}/forecasts/v1/daily/1day/{}", self.base_url, location.key);
        debug!(location = %location.key, "requesting daily forecast");

        let parsed: AwDailyResponse =
            self.get_json(Service::Forecast, &url, &self.forecast_query()).await?;
        let day = parsed
            .daily_forecasts
            .into_iter()
            .next()
            .ok_or(RequestError::Empty { service: Service::Forecast })?;

        Ok(day.into())
    }

    async fn search_location(&self, query: &str) -> Result<Location, RequestError> {
        let url = format!("{}/locations/v1/cities/search", self.base_url);
        debug!(query, "searching location");

        let params = [("q", query), ("apikey", self.api_key.expose_secret())];
        let results: Vec<AwLocation> = self.get_json(Service::Location, &url, &params).await?;
        let first =
            results.into_iter().next().ok_or(RequestError::Empty { service: Service::Location })?;

        Ok(Location { key: first.key, name: first.localized_name })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwValue {
    value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwHour {
    date_time: DateTime<FixedOffset>,
    icon_phrase: String,
    has_precipitation: bool,
    precipitation_type: Option<String>,
    precipitation_intensity: Option<String>,
    #[serde(default)]
    precipitation_probability: u8,
    temperature: AwValue,
}

impl From<AwHour> for HourlyForecast {
    fn from(hour: AwHour) -> Self {
        HourlyForecast {
            starts_at: hour.date_time,
            phrase: hour.icon_phrase,
            temperature: hour.temperature.value,
            precipitation_probability: hour.precipitation_probability,
            precipitation: precipitation(
                hour.has_precipitation,
                hour.precipitation_type,
                hour.precipitation_intensity,
                None,
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwTemperatureRange {
    minimum: AwValue,
    maximum: AwValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwHalfDay {
    icon_phrase: String,
    long_phrase: Option<String>,
    has_precipitation: bool,
    precipitation_type: Option<String>,
    precipitation_intensity: Option<String>,
    #[serde(default)]
    precipitation_probability: u8,
    hours_of_precipitation: Option<f64>,
}

impl From<AwHalfDay> for HalfDay {
    fn from(half: AwHalfDay) -> Self {
        HalfDay {
            phrase: half.long_phrase.unwrap_or(half.icon_phrase),
            precipitation_probability: half.precipitation_probability,
            precipitation: precipitation(
                half.has_precipitation,
                half.precipitation_type,
                half.precipitation_intensity,
                half.hours_of_precipitation,
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwDay {
    date: DateTime<FixedOffset>,
    temperature: AwTemperatureRange,
    day: AwHalfDay,
    night: AwHalfDay,
}

impl From<AwDay> for DailyForecast {
    fn from(day: AwDay) -> Self {
        DailyForecast {
            date: day.date,
            minimum: day.temperature.minimum.value,
            maximum: day.temperature.maximum.value,
            day: day.day.into(),
            night: day.night.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwDailyResponse {
    daily_forecasts: Vec<AwDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwLocation {
    key: String,
    localized_name: String,
}

fn precipitation(
    has_precipitation: bool,
    kind: Option<String>,
    intensity: Option<String>,
    hours: Option<f64>,
) -> Option<Precipitation> {
    has_precipitation.then(|| Precipitation {
        kind: kind.unwrap_or_else(|| "Precipitation".to_string()),
        intensity,
        hours,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hour_without_precipitation_fields() {
        let hour: AwHour = serde_json::from_str(
            r#"{
                "DateTime": "2024-01-15T13:00:00-07:00",
                "IconPhrase": "Sunny",
                "HasPrecipitation": false,
                "Temperature": { "Value": 41.0, "Unit": "F", "UnitType": 18 }
            }"#,
        )
        .unwrap();

        let forecast = HourlyForecast::from(hour);
        assert_eq!(forecast.precipitation, None);
        assert_eq!(forecast.precipitation_probability, 0);
        assert_eq!(forecast.phrase, "Sunny");
    }

    #[test]
    fn half_day_falls_back_to_icon_phrase() {
        let half: AwHalfDay = serde_json::from_str(
            r#"{
                "IconPhrase": "Snow",
                "HasPrecipitation": true,
                "PrecipitationType": "Snow",
                "HoursOfPrecipitation": 4.5
            }"#,
        )
        .unwrap();

        let half = HalfDay::from(half);
        assert_eq!(half.phrase, "Snow");
        let precip = half.precipitation.expect("precipitation expected");
        assert_eq!(precip.kind, "Snow");
        assert_eq!(precip.intensity, None);
        assert_eq!(precip.hours, Some(4.5));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider = AccuWeatherProvider::new(SecretString::from("k"), Client::new())
            .with_base_url("http://localhost:8080/");
        assert_eq!(provider.base_url, "http://localhost:8080");
    }

    #[test]
    fn redact_replaces_api_key() {
        let provider = AccuWeatherProvider::new(SecretString::from("abc123"), Client::new());
        let body = r#"{"Reference":"/forecasts/v1/hourly/1hour/1?apikey=abc123&details=true"}"#;

        let redacted = provider.redact(body);
        assert!(!redacted.contains("abc123"));
        assert!(redacted.contains("apikey=[REDACTED]&details=true"));
    }

    #[test]
    fn metric_adds_query_param() {
        let provider =
            AccuWeatherProvider::new(SecretString::from("k"), Client::new()).with_metric(true);
        assert!(provider.forecast_query().contains(&("metric", "true")));
    }
}
