// Speed unit domain model
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const METERS_PER_MILE: f64 = 1609.344;
const METERS_PER_NAUTICAL_MILE: f64 = 1852.0;
const SECONDS_PER_HOUR: f64 = 3600.0;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UnitError {
    #[error("unknown unit `{0}`")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Unit {
    #[default]
    KilometersPerHour,
    MilesPerHour,
    MetersPerSecond,
    Knots,
}

/// Supported units in the order the display cycles through them.
pub const UNITS: [Unit; 4] = [
    Unit::KilometersPerHour,
    Unit::MilesPerHour,
    Unit::MetersPerSecond,
    Unit::Knots,
];

impl Unit {
    /// Key used when the unit is persisted in settings
    pub fn raw_value(self) -> &'static str {
        match self {
            Unit::KilometersPerHour => "kilometersPerHour",
            Unit::MilesPerHour => "milesPerHour",
            Unit::MetersPerSecond => "metersPerSecond",
            Unit::Knots => "knots",
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Unit::KilometersPerHour => "km/h",
            Unit::MilesPerHour => "mph",
            Unit::MetersPerSecond => "m/s",
            Unit::Knots => "kn",
        }
    }

    /// Multiplier taking meters per second into this unit
    pub fn conversion_factor(self) -> f64 {
        match self {
            Unit::KilometersPerHour => SECONDS_PER_HOUR / 1000.0,
            Unit::MilesPerHour => SECONDS_PER_HOUR / METERS_PER_MILE,
            Unit::MetersPerSecond => 1.0,
            Unit::Knots => SECONDS_PER_HOUR / METERS_PER_NAUTICAL_MILE,
        }
    }

    /// Speed, in this unit, at which the gauge reads full
    pub fn default_reference_max(self) -> f64 {
        match self {
            Unit::KilometersPerHour => 200.0,
            Unit::MilesPerHour => 125.0,
            Unit::MetersPerSecond => 55.0,
            Unit::Knots => 110.0,
        }
    }

    fn position(self) -> usize {
        UNITS.iter().position(|u| *u == self).unwrap_or(0)
    }

    /// Cyclic successor, wrapping from the last unit back to the first
    pub fn next(self) -> Unit {
        UNITS[(self.position() + 1) % UNITS.len()]
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        UNITS
            .iter()
            .copied()
            .find(|u| u.raw_value() == s || u.abbreviation() == s)
            .ok_or_else(|| UnitError::Unknown(s.to_string()))
    }
}
