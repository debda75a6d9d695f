// HTTP request handlers
use crate::domain::speedometer::{LocationSample, SpeedometerState};
use crate::domain::unit::Unit;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::infrastructure::json_mapper::{speedometer_to_view, units_to_view};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct SpeedLimitRequest {
    pub value: f64,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Supported units in cycle order
pub async fn list_units(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let units = units_to_view(state.speedometer_service.model());
    unwrap_response(json_response(&units, accepts_brotli(&headers)).await)
}

/// Current speedometer state
pub async fn get_speedometer(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let snapshot = state.speedometer_service.snapshot().await;
    speedometer_response(&state, snapshot, &headers).await
}

/// Apply a location sample from the device
pub async fn ingest_sample(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(sample): Json<LocationSample>,
) -> Response {
    let snapshot = state.speedometer_service.ingest(sample).await;
    speedometer_response(&state, snapshot, &headers).await
}

pub async fn next_unit(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let result = state.speedometer_service.next_unit().await;
    service_response(&state, result, &headers).await
}

/// `PUT /unit/:unit` takes a raw key (`metersPerSecond`) or an abbreviation.
/// Abbreviations with a slash must be sent percent-encoded (`km%2Fh`, `m%2Fs`);
/// the path segment is decoded before parsing.
pub async fn select_unit(
    Path(unit): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let unit = match unit.parse::<Unit>() {
        Ok(unit) => unit,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let result = state.speedometer_service.select_unit(unit).await;
    service_response(&state, result, &headers).await
}

pub async fn toggle_speed_limit(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let result = state.speedometer_service.toggle_speed_limit().await;
    service_response(&state, result, &headers).await
}

pub async fn set_speed_limit(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<SpeedLimitRequest>,
) -> Response {
    let result = state.speedometer_service.set_speed_limit(request.value).await;
    service_response(&state, result, &headers).await
}

/// Stream the speedometer state (snapshot, then one chunk per change)
pub async fn stream_speedometer(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rx = state.streaming_service.stream_readings().await;
    stream_from_receiver(rx, state.coordinate_format, accepts_brotli(&headers)).await
}

async fn service_response(
    state: &AppState,
    result: anyhow::Result<SpeedometerState>,
    headers: &HeaderMap,
) -> Response {
    match result {
        Ok(snapshot) => speedometer_response(state, snapshot, headers).await,
        Err(e) => {
            tracing::error!("Failed to persist settings: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn speedometer_response(
    state: &AppState,
    snapshot: SpeedometerState,
    headers: &HeaderMap,
) -> Response {
    let view = speedometer_to_view(snapshot, state.coordinate_format);
    unwrap_response(json_response(&view, accepts_brotli(headers)).await)
}

fn unwrap_response(result: Result<Response, StatusCode>) -> Response {
    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::speedometer_service::{SpeedometerOptions, SpeedometerService};
    use crate::application::streaming_service::StreamingSpeedometerService;
    use crate::domain::coordinates::CoordinateFormat;
    use crate::domain::speed::SpeedModel;
    use crate::infrastructure::memory_settings::MemorySettingsStore;

    async fn app_state() -> Arc<AppState> {
        let speedometer_service = SpeedometerService::load(
            Arc::new(MemorySettingsStore::new()),
            SpeedModel::default(),
            SpeedometerOptions::default(),
        )
        .await
        .unwrap();

        Arc::new(AppState {
            streaming_service: StreamingSpeedometerService::new(speedometer_service.clone()),
            speedometer_service,
            coordinate_format: CoordinateFormat::DegreesMinutesSeconds,
        })
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ingest_then_read() {
        let state = app_state().await;
        let sample = LocationSample {
            latitude: 52.520008,
            longitude: 13.404954,
            speed: 27.78,
            horizontal_accuracy: 4.0,
            timestamp: None,
        };

        let response = ingest_sample(HeaderMap::new(), State(state.clone()), Json(sample)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(get_speedometer(HeaderMap::new(), State(state)).await).await;
        assert_eq!(json["displayMode"], "tracking");
        assert_eq!(json["speed"]["display"], "100");
        assert_eq!(json["coordinates"]["formattedLatitude"], "52° 31' 12.03\" N");
    }

    #[tokio::test]
    async fn test_select_unknown_unit_is_bad_request() {
        let state = app_state().await;
        let response = select_unit(Path("leagues".to_string()), HeaderMap::new(), State(state)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_select_unit_by_abbreviation() {
        let state = app_state().await;
        let response = select_unit(Path("kn".to_string()), HeaderMap::new(), State(state)).await;
        let json = body_json(response).await;
        assert_eq!(json["unit"], "knots");
    }

    #[tokio::test]
    async fn test_select_unit_by_slash_abbreviation() {
        let state = app_state().await;
        let response =
            select_unit(Path("m/s".to_string()), HeaderMap::new(), State(state.clone())).await;
        assert_eq!(body_json(response).await["unit"], "metersPerSecond");

        let response = select_unit(Path("km/h".to_string()), HeaderMap::new(), State(state)).await;
        let json = body_json(response).await;
        assert_eq!(json["unit"], "kilometersPerHour");
        assert_eq!(json["abbreviation"], "km/h");
    }

    #[tokio::test]
    async fn test_speed_limit_endpoints() {
        let state = app_state().await;

        let response = set_speed_limit(
            HeaderMap::new(),
            State(state.clone()),
            Json(SpeedLimitRequest { value: 50.0 }),
        )
        .await;
        let json = body_json(response).await;
        assert_eq!(json["speedLimit"]["displayWithUnit"], "50 km/h");

        let json = body_json(toggle_speed_limit(HeaderMap::new(), State(state)).await).await;
        assert!(json["speedLimit"].is_null());
    }

    #[tokio::test]
    async fn test_list_units() {
        let state = app_state().await;
        let json = body_json(list_units(HeaderMap::new(), State(state)).await).await;
        assert_eq!(json.as_array().map(|a| a.len()), Some(4));
        assert_eq!(json[1]["abbreviation"], "mph");
    }
}
