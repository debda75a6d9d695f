// Mapper to convert domain models to JSON views
use crate::application::streaming_service::StreamMessage;
use crate::domain::coordinates::{CoordinateFormat, Coordinates};
use crate::domain::speed::{Speed, SpeedModel};
use crate::domain::speedometer::{DisplayMode, SpeedometerState};
use crate::domain::unit::{Unit, UNITS};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedView {
    pub raw_meters_per_second: f64,
    pub unit: Unit,
    pub rounded_value: i64,
    pub display: String,
    pub display_with_unit: String,
    pub fillment: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatesView {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_latitude: String,
    pub formatted_longitude: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedometerView {
    pub display_mode: &'static str,
    pub unit: Unit,
    pub abbreviation: &'static str,
    pub speed: Option<SpeedView>,
    pub coordinates: Option<CoordinatesView>,
    pub speed_limit: Option<SpeedView>,
    pub limit_exceeded: bool,
    pub fixed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitView {
    pub unit: Unit,
    pub abbreviation: &'static str,
    pub conversion_factor: f64,
    pub reference_max: f64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "state", rename_all = "camelCase")]
pub enum StreamMessageView {
    Snapshot(SpeedometerView),
    Update(SpeedometerView),
}

pub fn speedometer_to_view(state: SpeedometerState, format: CoordinateFormat) -> SpeedometerView {
    let limit_exceeded = state.limit_exceeded();
    let display_mode = match state.display_mode {
        DisplayMode::Acquiring => "acquiring",
        DisplayMode::Tracking => "tracking",
    };

    SpeedometerView {
        display_mode,
        unit: state.unit,
        abbreviation: state.unit.abbreviation(),
        speed: state.speed.map(speed_to_view),
        coordinates: state.coordinates.map(|c| coordinates_to_view(c, format)),
        speed_limit: state.speed_limit.map(speed_to_view),
        limit_exceeded,
        fixed_at: state.fixed_at,
        updated_at: state.updated_at,
    }
}

pub fn stream_message_to_view(message: StreamMessage, format: CoordinateFormat) -> StreamMessageView {
    match message {
        StreamMessage::Snapshot(state) => {
            StreamMessageView::Snapshot(speedometer_to_view(state, format))
        }
        StreamMessage::Update(state) => StreamMessageView::Update(speedometer_to_view(state, format)),
    }
}

pub fn units_to_view(model: &SpeedModel) -> Vec<UnitView> {
    UNITS
        .iter()
        .map(|unit| UnitView {
            unit: *unit,
            abbreviation: unit.abbreviation(),
            conversion_factor: unit.conversion_factor(),
            reference_max: model.reference_max(*unit),
        })
        .collect()
}

fn speed_to_view(speed: Speed) -> SpeedView {
    SpeedView {
        raw_meters_per_second: speed.raw_meters_per_second(),
        unit: speed.unit(),
        rounded_value: speed.rounded_value(),
        display: speed.display().to_string(),
        display_with_unit: speed.display_with_unit().to_string(),
        fillment: speed.fillment(),
    }
}

fn coordinates_to_view(coordinates: Coordinates, format: CoordinateFormat) -> CoordinatesView {
    let formatted = coordinates.formatted(format);
    CoordinatesView {
        latitude: coordinates.latitude,
        longitude: coordinates.longitude,
        formatted_latitude: formatted.latitude,
        formatted_longitude: formatted.longitude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speedometer_view_json() {
        let model = SpeedModel::default();
        let mut state = SpeedometerState::new(
            Unit::KilometersPerHour,
            Some(model.from_display_value(100.0, Unit::KilometersPerHour)),
        );
        state.display_mode = DisplayMode::Tracking;
        state.speed = Some(model.compute(28.6, Unit::KilometersPerHour));
        state.coordinates = Some(Coordinates::new(-22.9068, -43.1729));

        let json =
            serde_json::to_value(speedometer_to_view(state, CoordinateFormat::Decimal)).unwrap();

        assert_eq!(json["displayMode"], "tracking");
        assert_eq!(json["unit"], "kilometersPerHour");
        assert_eq!(json["abbreviation"], "km/h");
        assert_eq!(json["speed"]["displayWithUnit"], "103 km/h");
        assert_eq!(json["speedLimit"]["roundedValue"], 100);
        assert_eq!(json["limitExceeded"], true);
        assert_eq!(json["coordinates"]["formattedLatitude"], "22.906800° S");
    }

    #[test]
    fn test_stream_message_is_tagged() {
        let state = SpeedometerState::new(Unit::Knots, None);
        let message = stream_message_to_view(
            StreamMessage::Snapshot(state),
            CoordinateFormat::DegreesMinutesSeconds,
        );

        let json = serde_json::to_value(message).unwrap();
        assert_eq!(json["type"], "snapshot");
        assert_eq!(json["state"]["displayMode"], "acquiring");
        assert!(json["state"]["speed"].is_null());
    }

    #[test]
    fn test_units_in_cycle_order() {
        let units = units_to_view(&SpeedModel::default());
        let abbreviations: Vec<_> = units.iter().map(|u| u.abbreviation).collect();
        assert_eq!(abbreviations, vec!["km/h", "mph", "m/s", "kn"]);
        assert_eq!(units[0].reference_max, 200.0);
    }
}
