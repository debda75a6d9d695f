// Speed domain model - conversion, rounding and gauge fillment
use super::unit::{Unit, UNITS};
use std::collections::HashMap;

/// A speed ready for display. Every derived field is computed once by
/// [`SpeedModel::compute`]; changing unit produces a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct Speed {
    raw_meters_per_second: f64,
    unit: Unit,
    rounded_value: i64,
    display: String,
    display_with_unit: String,
    fillment: f64,
}

impl Speed {
    /// Normalized sensor value in meters per second (never negative or NaN)
    pub fn raw_meters_per_second(&self) -> f64 {
        self.raw_meters_per_second
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn rounded_value(&self) -> i64 {
        self.rounded_value
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn display_with_unit(&self) -> &str {
        &self.display_with_unit
    }

    /// Gauge fill fraction in [0.0, 1.0]
    pub fn fillment(&self) -> f64 {
        self.fillment
    }

    /// Strictly greater than `limit`, comparing rounded values only so GPS
    /// jitter around a rounding boundary does not flap the warning.
    pub fn exceeds(&self, limit: &Speed) -> bool {
        self.rounded_value > limit.rounded_value
    }
}

/// Pure conversion from raw sensor speed to [`Speed`], calibrated with a
/// per-unit reference maximum (the speed at which the gauge is full).
#[derive(Debug, Clone)]
pub struct SpeedModel {
    reference_max: HashMap<Unit, f64>,
}

impl Default for SpeedModel {
    fn default() -> Self {
        Self {
            reference_max: UNITS
                .iter()
                .map(|u| (*u, u.default_reference_max()))
                .collect(),
        }
    }
}

impl SpeedModel {
    /// Override the gauge-full speed for one unit. Non-positive or
    /// non-finite values are ignored.
    pub fn with_reference_max(mut self, unit: Unit, value: f64) -> Self {
        if value.is_finite() && value > 0.0 {
            self.reference_max.insert(unit, value);
        } else {
            tracing::warn!(
                "Ignoring invalid reference max {} for {}",
                value,
                unit.raw_value()
            );
        }
        self
    }

    pub fn reference_max(&self, unit: Unit) -> f64 {
        self.reference_max
            .get(&unit)
            .copied()
            .unwrap_or_else(|| unit.default_reference_max())
    }

    pub fn compute(&self, raw_meters_per_second: f64, unit: Unit) -> Speed {
        // Negative speed is how location providers report "no valid speed"
        let raw = if raw_meters_per_second.is_finite() && raw_meters_per_second > 0.0 {
            raw_meters_per_second
        } else {
            0.0
        };

        // f64::round rounds half away from zero
        let rounded = (raw * unit.conversion_factor()).round();
        let rounded_value = rounded as i64;
        let fillment = (rounded / self.reference_max(unit)).clamp(0.0, 1.0);

        let display = rounded_value.to_string();
        let display_with_unit = format!("{} {}", display, unit.abbreviation());

        Speed {
            raw_meters_per_second: raw,
            unit,
            rounded_value,
            display,
            display_with_unit,
            fillment,
        }
    }

    /// Re-express `speed` in `unit`, starting from its raw value rather than
    /// the already rounded one.
    pub fn convert(&self, speed: &Speed, unit: Unit) -> Speed {
        self.compute(speed.raw_meters_per_second, unit)
    }

    /// Rebuild a speed from a value already expressed in `unit`, such as a
    /// persisted speed limit.
    pub fn from_display_value(&self, value: f64, unit: Unit) -> Speed {
        self.compute(value / unit.conversion_factor(), unit)
    }

    pub fn next(&self, unit: Unit) -> Unit {
        unit.next()
    }
}
