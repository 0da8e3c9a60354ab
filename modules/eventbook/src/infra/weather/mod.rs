//! Forecast provider boundary.
//!
//! Event detail views can be enriched with forecast records fetched for
//! the event's coordinates. The provider is an external collaborator
//! behind [`ForecastProvider`]; the in-tree implementation talks to
//! Open-Meteo, tests substitute their own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::domain::error::DomainError;

mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Forecast horizons supported by the provider, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum ForecastDays {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "3")]
    Three,
    #[default]
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "14")]
    Fourteen,
    #[serde(rename = "16")]
    Sixteen,
}

impl ForecastDays {
    #[must_use]
    pub fn days(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Three => 3,
            Self::Seven => 7,
            Self::Fourteen => 14,
            Self::Sixteen => 16,
        }
    }
}

/// One hour of forecast data. Field names follow the provider's variable
/// names so records pass through unrenamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HourlyForecast {
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = "date-time")]
    pub time: OffsetDateTime,
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub dew_point_2m: f64,
    pub apparent_temperature: f64,
    pub precipitation_probability: f64,
    pub precipitation: f64,
    pub rain: f64,
    pub snowfall: f64,
    pub snow_depth: f64,
    pub wind_speed_80m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_180m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_temperature_6cm: Option<f64>,
}

/// One calendar day of hourly records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyForecast {
    /// ISO-8601 calendar date.
    pub date: String,
    pub hourly_data: Vec<HourlyForecast>,
}

/// External forecast collaborator, called with coordinates.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: ForecastDays,
    ) -> Result<Vec<DailyForecast>, DomainError>;
}

/// Provider used when weather integration is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledForecast;

#[async_trait]
impl ForecastProvider for DisabledForecast {
    async fn forecast(
        &self,
        _latitude: f64,
        _longitude: f64,
        _days: ForecastDays,
    ) -> Result<Vec<DailyForecast>, DomainError> {
        Err(DomainError::upstream("weather integration is disabled"))
    }
}
