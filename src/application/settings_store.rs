// Settings store trait for persisted user preferences
use crate::domain::unit::Unit;
use async_trait::async_trait;

pub const CURRENT_UNIT_KEY: &str = "currentUnit";
pub const CURRENT_SPEED_LIMIT_KEY: &str = "currentSpeedLimit";

/// Stored speed limit value meaning "no limit"
pub const NO_SPEED_LIMIT: &str = "0";

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// Write default values for keys that have never been set
pub async fn register_defaults(store: &dyn SettingsStore) -> anyhow::Result<()> {
    let defaults = [
        (CURRENT_UNIT_KEY, Unit::default().raw_value()),
        (CURRENT_SPEED_LIMIT_KEY, NO_SPEED_LIMIT),
    ];

    for (key, value) in defaults {
        if store.get(key).await?.is_none() {
            tracing::debug!("Registering default {}={}", key, value);
            store.set(key, value).await?;
        }
    }

    Ok(())
}
