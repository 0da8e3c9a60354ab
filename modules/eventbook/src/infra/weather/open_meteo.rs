use async_trait::async_trait;
use serde::Deserialize;
use time::PrimitiveDateTime;
use time::macros::format_description;

use super::{DailyForecast, ForecastDays, ForecastProvider, HourlyForecast};
use crate::domain::error::DomainError;

const HOURLY_VARIABLES: &str = "temperature_2m,relative_humidity_2m,dew_point_2m,\
apparent_temperature,precipitation_probability,precipitation,rain,snowfall,snow_depth,\
wind_speed_80m,temperature_180m,soil_temperature_6cm";

/// Open-Meteo forecast client.
pub struct OpenMeteoClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.open-meteo.com";

    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: HourlyBlock,
}

/// The provider answers column-wise: one array per variable, aligned by
/// index with `time`.
#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    temperature_2m: Vec<f64>,
    relative_humidity_2m: Vec<f64>,
    dew_point_2m: Vec<f64>,
    apparent_temperature: Vec<f64>,
    precipitation_probability: Vec<f64>,
    precipitation: Vec<f64>,
    rain: Vec<f64>,
    snowfall: Vec<f64>,
    snow_depth: Vec<f64>,
    wind_speed_80m: Vec<f64>,
    #[serde(default)]
    temperature_180m: Option<Vec<f64>>,
    #[serde(default)]
    soil_temperature_6cm: Option<Vec<f64>>,
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: ForecastDays,
    ) -> Result<Vec<DailyForecast>, DomainError> {
        let response = self
            .http
            .get(format!("{}/v1/forecast", self.base_url))
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("hourly", HOURLY_VARIABLES.to_owned()),
                ("forecast_days", days.days().to_string()),
            ])
            .send()
            .await
            .map_err(|e| DomainError::upstream(format!("forecast request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::upstream(format!(
                "forecast provider answered {status}"
            )));
        }

        let payload: ForecastResponse = response
            .json()
            .await
            .map_err(|e| DomainError::upstream(format!("malformed forecast payload: {e}")))?;

        tracing::debug!(hours = payload.hourly.time.len(), "fetched forecast");
        into_daily(payload.hourly)
    }
}

fn into_daily(block: HourlyBlock) -> Result<Vec<DailyForecast>, DomainError> {
    let hours = block.time.len();
    let aligned = [
        block.temperature_2m.len(),
        block.relative_humidity_2m.len(),
        block.dew_point_2m.len(),
        block.apparent_temperature.len(),
        block.precipitation_probability.len(),
        block.precipitation.len(),
        block.rain.len(),
        block.snowfall.len(),
        block.snow_depth.len(),
        block.wind_speed_80m.len(),
    ]
    .iter()
    .all(|len| *len == hours);
    if !aligned {
        return Err(DomainError::upstream(
            "forecast provider answered misaligned hourly arrays",
        ));
    }

    let mut hourly = Vec::with_capacity(hours);
    for i in 0..hours {
        hourly.push(HourlyForecast {
            time: parse_hour(&block.time[i])?,
            temperature_2m: block.temperature_2m[i],
            relative_humidity_2m: block.relative_humidity_2m[i],
            dew_point_2m: block.dew_point_2m[i],
            apparent_temperature: block.apparent_temperature[i],
            precipitation_probability: block.precipitation_probability[i],
            precipitation: block.precipitation[i],
            rain: block.rain[i],
            snowfall: block.snowfall[i],
            snow_depth: block.snow_depth[i],
            wind_speed_80m: block.wind_speed_80m[i],
            temperature_180m: block.temperature_180m.as_ref().and_then(|v| v.get(i).copied()),
            soil_temperature_6cm: block
                .soil_temperature_6cm
                .as_ref()
                .and_then(|v| v.get(i).copied()),
        });
    }

    Ok(hourly
        .chunks(24)
        .map(|day| DailyForecast {
            date: day
                .first()
                .map_or_else(String::new, |h| h.time.date().to_string()),
            hourly_data: day.to_vec(),
        })
        .collect())
}

/// The provider sends local ISO-8601 stamps without seconds or offset,
/// e.g. `2024-05-01T13:00`; they are taken as UTC.
fn parse_hour(raw: &str) -> Result<time::OffsetDateTime, DomainError> {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]");
    PrimitiveDateTime::parse(raw, &format)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| DomainError::upstream(format!("unparseable forecast timestamp '{raw}': {e}")))
}
