use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    check::Window,
    error::RequestError,
    model::{DailyForecast, Forecast, HourlyForecast, Location},
};

pub mod accuweather;

#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Forecast for the next hour at `location`.
    async fn hourly(&self, location: &Location) -> Result<HourlyForecast, RequestError>;

    /// Forecast for today at `location`.
    async fn daily(&self, location: &Location) -> Result<DailyForecast, RequestError>;

    /// Resolve a free-text query to a location. The first match wins.
    async fn search_location(&self, query: &str) -> Result<Location, RequestError>;

    /// Fetch the forecast covering `window`.
    async fn forecast(
        &self,
        location: &Location,
        window: Window,
    ) -> Result<Forecast, RequestError> {
        match window {
            Window::NextHour => self.hourly(location).await.map(Forecast::Hourly),
            Window::Today => self.daily(location).await.map(Forecast::Daily),
        }
    }
}
