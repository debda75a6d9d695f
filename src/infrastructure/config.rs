use crate::application::speedometer_service::SpeedometerOptions;
use crate::domain::coordinates::CoordinateFormat;
use crate::domain::speed::SpeedModel;
use crate::domain::unit::Unit;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub settings: SettingsFileSettings,
    pub location: LocationSettings,
    pub display: DisplaySettings,
    pub gauge: GaugeSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SettingsFileSettings {
    /// Keep preferences in memory only when unset
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LocationSettings {
    pub minimum_horizontal_accuracy: f64,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            minimum_horizontal_accuracy: SpeedometerOptions::default().minimum_horizontal_accuracy,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DisplaySettings {
    pub coordinate_format: CoordinateFormat,
}

/// Gauge-full speed per unit, expressed in that unit
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct GaugeSettings {
    pub kilometers_per_hour: Option<f64>,
    pub miles_per_hour: Option<f64>,
    pub meters_per_second: Option<f64>,
    pub knots: Option<f64>,
}

impl AppConfig {
    pub fn speed_model(&self) -> SpeedModel {
        let overrides = [
            (Unit::KilometersPerHour, self.gauge.kilometers_per_hour),
            (Unit::MilesPerHour, self.gauge.miles_per_hour),
            (Unit::MetersPerSecond, self.gauge.meters_per_second),
            (Unit::Knots, self.gauge.knots),
        ];

        overrides
            .into_iter()
            .fold(SpeedModel::default(), |model, (unit, value)| match value {
                Some(value) => model.with_reference_max(unit, value),
                None => model,
            })
    }

    pub fn speedometer_options(&self) -> SpeedometerOptions {
        SpeedometerOptions {
            minimum_horizontal_accuracy: self.location.minimum_horizontal_accuracy,
        }
    }
}

pub fn load_config() -> anyhow::Result<AppConfig> {
    load_config_from("config/speedometer")
}

/// Optional file at `name` (any format the config crate knows), then
/// `SPEEDOMETER__SECTION__KEY` environment variables
pub fn load_config_from(name: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(name).required(false))
        .add_source(
            config::Environment::with_prefix("SPEEDOMETER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_config_from("config/does-not-exist").unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert!(config.settings.path.is_none());
        assert_eq!(config.location.minimum_horizontal_accuracy, 50.0);
        assert_eq!(
            config.display.coordinate_format,
            CoordinateFormat::DegreesMinutesSeconds
        );
    }

    #[test]
    fn test_file_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("speedometer.toml");
        std::fs::write(
            &path,
            r#"
[server]
bind = "127.0.0.1:9000"

[settings]
path = "/tmp/speedometer/settings.toml"

[location]
minimum_horizontal_accuracy = 20.0

[display]
coordinate_format = "decimal"

[gauge]
miles_per_hour = 100.0
"#,
        )
        .unwrap();

        let config = load_config_from(path.to_str().unwrap()).unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(
            config.settings.path,
            Some(PathBuf::from("/tmp/speedometer/settings.toml"))
        );
        assert_eq!(config.speedometer_options().minimum_horizontal_accuracy, 20.0);
        assert_eq!(config.display.coordinate_format, CoordinateFormat::Decimal);

        let model = config.speed_model();
        assert_eq!(model.reference_max(Unit::MilesPerHour), 100.0);
        assert_eq!(model.reference_max(Unit::Knots), 110.0);
    }
}
