// Speedometer display state
use super::coordinates::Coordinates;
use super::speed::Speed;
use super::unit::Unit;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A single reading from the location provider
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters per second; negative when the provider has no valid speed
    pub speed: f64,
    /// Radius of uncertainty in meters; negative when the fix is invalid
    pub horizontal_accuracy: f64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl LocationSample {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn is_accurate(&self, minimum_horizontal_accuracy: f64) -> bool {
        self.horizontal_accuracy >= 0.0 && self.horizontal_accuracy <= minimum_horizontal_accuracy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Waiting for a fix accurate enough to show
    Acquiring,
    Tracking,
}

#[derive(Debug, Clone)]
pub struct SpeedometerState {
    pub display_mode: DisplayMode,
    pub unit: Unit,
    pub speed: Option<Speed>,
    pub coordinates: Option<Coordinates>,
    pub speed_limit: Option<Speed>,
    /// Device timestamp of the last accepted sample, if it carried one
    pub fixed_at: Option<DateTime<Utc>>,
    /// Server clock time of the last change
    pub updated_at: DateTime<Utc>,
}

impl SpeedometerState {
    pub fn new(unit: Unit, speed_limit: Option<Speed>) -> Self {
        Self {
            display_mode: DisplayMode::Acquiring,
            unit,
            speed: None,
            coordinates: None,
            speed_limit,
            fixed_at: None,
            updated_at: Utc::now(),
        }
    }

    pub fn limit_exceeded(&self) -> bool {
        match (&self.speed, &self.speed_limit) {
            (Some(speed), Some(limit)) => speed.exceeds(limit),
            _ => false,
        }
    }
}
