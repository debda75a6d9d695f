// Coordinates domain model
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoordinateFormat {
    #[default]
    #[serde(alias = "dms")]
    DegreesMinutesSeconds,
    Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedCoordinates {
    pub latitude: String,
    pub longitude: String,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Range is not validated; out-of-range values format as given.
    pub fn formatted(&self, format: CoordinateFormat) -> FormattedCoordinates {
        let lat_hemisphere = if self.latitude < 0.0 { 'S' } else { 'N' };
        let lon_hemisphere = if self.longitude < 0.0 { 'W' } else { 'E' };

        FormattedCoordinates {
            latitude: format_component(self.latitude, lat_hemisphere, format),
            longitude: format_component(self.longitude, lon_hemisphere, format),
        }
    }
}

fn format_component(value: f64, hemisphere: char, format: CoordinateFormat) -> String {
    let value = value.abs();
    match format {
        CoordinateFormat::Decimal => format!("{:.6}° {}", value, hemisphere),
        CoordinateFormat::DegreesMinutesSeconds => {
            // Work in hundredths of a second so 59.999" carries into the minute
            let total = (value * 360_000.0).round() as u64;
            let degrees = total / 360_000;
            let minutes = (total % 360_000) / 6_000;
            let hundredths = total % 6_000;
            format!(
                "{}° {}' {}.{:02}\" {}",
                degrees,
                minutes,
                hundredths / 100,
                hundredths % 100,
                hemisphere
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dms_format() {
        let berlin = Coordinates::new(52.520008, 13.404954);
        let formatted = berlin.formatted(CoordinateFormat::DegreesMinutesSeconds);
        assert_eq!(formatted.latitude, "52° 31' 12.03\" N");
        assert_eq!(formatted.longitude, "13° 24' 17.83\" E");
    }

    #[test]
    fn test_southern_and_western_hemispheres() {
        let rio = Coordinates::new(-22.9068, -43.1729);
        let formatted = rio.formatted(CoordinateFormat::DegreesMinutesSeconds);
        assert_eq!(formatted.latitude, "22° 54' 24.48\" S");
        assert_eq!(formatted.longitude, "43° 10' 22.44\" W");
    }

    #[test]
    fn test_seconds_carry_into_minutes() {
        let formatted = Coordinates::new(10.999_999_9, 0.0)
            .formatted(CoordinateFormat::DegreesMinutesSeconds);
        assert_eq!(formatted.latitude, "11° 0' 0.00\" N");
        assert_eq!(formatted.longitude, "0° 0' 0.00\" E");
    }

    #[test]
    fn test_decimal_format() {
        let formatted = Coordinates::new(-33.865143, 151.2099)
            .formatted(CoordinateFormat::Decimal);
        assert_eq!(formatted.latitude, "33.865143° S");
        assert_eq!(formatted.longitude, "151.209900° E");
    }
}
