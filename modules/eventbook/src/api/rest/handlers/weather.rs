use axum::Json;
use axum::extract::{Query, State};

use super::super::dto::WeatherQuery;
use super::super::{ApiResult, AppState};
use crate::infra::weather::DailyForecast;

pub async fn weather_data(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> ApiResult<Json<Vec<DailyForecast>>> {
    let forecast = state
        .service
        .weather_forecast(
            query.latitude,
            query.longitude,
            query.time_interval.unwrap_or_default(),
        )
        .await?;
    Ok(Json(forecast))
}
