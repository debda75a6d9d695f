// Application state for HTTP handlers
use crate::application::speedometer_service::SpeedometerService;
use crate::application::streaming_service::StreamingSpeedometerService;
use crate::domain::coordinates::CoordinateFormat;

#[derive(Clone)]
pub struct AppState {
    pub speedometer_service: SpeedometerService,
    pub streaming_service: StreamingSpeedometerService,
    pub coordinate_format: CoordinateFormat,
}
