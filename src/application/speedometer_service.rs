// Speedometer service - Applies location samples and user actions to the display state
use crate::application::settings_store::{
    register_defaults, SettingsStore, CURRENT_SPEED_LIMIT_KEY, CURRENT_UNIT_KEY, NO_SPEED_LIMIT,
};
use crate::domain::speed::{Speed, SpeedModel};
use crate::domain::speedometer::{DisplayMode, LocationSample, SpeedometerState};
use crate::domain::unit::Unit;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

const UPDATE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct SpeedometerOptions {
    /// Samples with a larger horizontal accuracy radius (meters) are ignored
    pub minimum_horizontal_accuracy: f64,
}

impl Default for SpeedometerOptions {
    fn default() -> Self {
        Self {
            minimum_horizontal_accuracy: 50.0,
        }
    }
}

#[derive(Clone)]
pub struct SpeedometerService {
    store: Arc<dyn SettingsStore>,
    model: Arc<SpeedModel>,
    options: SpeedometerOptions,
    state: Arc<RwLock<SpeedometerState>>,
    updates: broadcast::Sender<SpeedometerState>,
}

impl SpeedometerService {
    /// Restore unit and speed limit from settings, registering defaults first
    pub async fn load(
        store: Arc<dyn SettingsStore>,
        model: SpeedModel,
        options: SpeedometerOptions,
    ) -> anyhow::Result<Self> {
        register_defaults(store.as_ref()).await?;

        let unit = match store.get(CURRENT_UNIT_KEY).await? {
            Some(raw) => raw.parse::<Unit>().unwrap_or_else(|e| {
                tracing::warn!("Ignoring stored unit: {}", e);
                Unit::default()
            }),
            None => Unit::default(),
        };

        let speed_limit = store
            .get(CURRENT_SPEED_LIMIT_KEY)
            .await?
            .and_then(|raw| parse_speed_limit(&model, &raw, unit));

        tracing::info!(
            "Loaded settings: unit={}, speed_limit={}",
            unit.raw_value(),
            speed_limit
                .as_ref()
                .map(|l| l.display_with_unit())
                .unwrap_or("none")
        );

        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

        Ok(Self {
            store,
            model: Arc::new(model),
            options,
            state: Arc::new(RwLock::new(SpeedometerState::new(unit, speed_limit))),
            updates,
        })
    }

    pub fn model(&self) -> &SpeedModel {
        &self.model
    }

    pub async fn snapshot(&self) -> SpeedometerState {
        self.state.read().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SpeedometerState> {
        self.updates.subscribe()
    }

    pub async fn ingest(&self, sample: LocationSample) -> SpeedometerState {
        let mut state = self.state.write().await;

        if sample.is_accurate(self.options.minimum_horizontal_accuracy) {
            if state.display_mode == DisplayMode::Acquiring {
                tracing::info!("Accurate fix acquired ({} m)", sample.horizontal_accuracy);
            }
            state.display_mode = DisplayMode::Tracking;
            state.speed = Some(self.model.compute(sample.speed, state.unit));
            state.coordinates = Some(sample.coordinates());
            state.fixed_at = sample.timestamp;
        } else {
            if state.display_mode == DisplayMode::Tracking {
                tracing::info!(
                    "Fix degraded to {} m (minimum {} m)",
                    sample.horizontal_accuracy,
                    self.options.minimum_horizontal_accuracy
                );
            }
            state.display_mode = DisplayMode::Acquiring;
        }

        state.updated_at = Utc::now();
        self.publish(&state)
    }

    /// Switch display unit. Speed and limit are re-derived from their raw
    /// values and the limit is stored again in the new unit. If the limit
    /// cannot be written, the stored unit is put back.
    pub async fn select_unit(&self, unit: Unit) -> anyhow::Result<SpeedometerState> {
        let mut state = self.state.write().await;
        let previous = state.unit;

        let speed_limit = state
            .speed_limit
            .as_ref()
            .map(|limit| self.model.convert(limit, unit));

        self.store.set(CURRENT_UNIT_KEY, unit.raw_value()).await?;

        let stored_limit = match &speed_limit {
            Some(limit) => self.store.set(CURRENT_SPEED_LIMIT_KEY, limit.display()).await,
            None => self.store.remove(CURRENT_SPEED_LIMIT_KEY).await,
        };
        if let Err(e) = stored_limit {
            if let Err(rollback) = self.store.set(CURRENT_UNIT_KEY, previous.raw_value()).await {
                tracing::error!(
                    "Could not restore stored unit {}: {:#}",
                    previous.raw_value(),
                    rollback
                );
            }
            return Err(e);
        }

        tracing::info!("Unit changed from {} to {}", previous.raw_value(), unit.raw_value());

        state.speed = state.speed.as_ref().map(|s| self.model.convert(s, unit));
        state.speed_limit = speed_limit;
        state.unit = unit;
        state.updated_at = Utc::now();

        Ok(self.publish(&state))
    }

    pub async fn next_unit(&self) -> anyhow::Result<SpeedometerState> {
        let current = self.state.read().await.unit;
        self.select_unit(self.model.next(current)).await
    }

    /// Release the limit if one is set, otherwise hold the current speed as the limit
    pub async fn toggle_speed_limit(&self) -> anyhow::Result<SpeedometerState> {
        let mut state = self.state.write().await;

        if state.speed_limit.is_some() {
            self.store
                .set(CURRENT_SPEED_LIMIT_KEY, NO_SPEED_LIMIT)
                .await?;
            state.speed_limit = None;
            tracing::info!("Speed limit released");
        } else {
            match state.speed.clone().filter(|s| s.rounded_value() > 0) {
                Some(speed) => {
                    self.store
                        .set(CURRENT_SPEED_LIMIT_KEY, speed.display())
                        .await?;
                    tracing::info!("Speed limit set to {}", speed.display_with_unit());
                    state.speed_limit = Some(speed);
                }
                None => {
                    tracing::debug!("No moving speed to hold as a limit");
                    return Ok(state.clone());
                }
            }
        }

        state.updated_at = Utc::now();
        Ok(self.publish(&state))
    }

    /// Set the limit from a value in the current unit; zero or less clears it
    pub async fn set_speed_limit(&self, value: f64) -> anyhow::Result<SpeedometerState> {
        let mut state = self.state.write().await;

        let speed_limit = Some(value)
            .filter(|v| v.is_finite() && *v > 0.0)
            .map(|v| self.model.from_display_value(v, state.unit))
            .filter(|limit| limit.rounded_value() > 0);

        let stored = speed_limit
            .as_ref()
            .map(|limit| limit.display())
            .unwrap_or(NO_SPEED_LIMIT);
        self.store.set(CURRENT_SPEED_LIMIT_KEY, stored).await?;

        tracing::info!(
            "Speed limit set to {}",
            speed_limit
                .as_ref()
                .map(|l| l.display_with_unit())
                .unwrap_or("none")
        );

        state.speed_limit = speed_limit;
        state.updated_at = Utc::now();
        Ok(self.publish(&state))
    }

    fn publish(&self, state: &SpeedometerState) -> SpeedometerState {
        let snapshot = state.clone();
        // No subscribers is not an error
        let _ = self.updates.send(snapshot.clone());
        snapshot
    }
}

fn parse_speed_limit(model: &SpeedModel, raw: &str, unit: Unit) -> Option<Speed> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => {
            Some(model.from_display_value(value, unit))
        }
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("Ignoring stored speed limit {:?}: {}", raw, e);
            None
        }
    }
}
