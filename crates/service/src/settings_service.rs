use std::path::PathBuf;

use tracing::{info, instrument};

use models::settings::{SettingsPatch, SystemSettings};

use crate::errors::ServiceError;
use crate::storage::JsonDocStore;

/// System-wide settings persisted as one document.
#[derive(Clone)]
pub struct SettingsService {
    store: JsonDocStore<SystemSettings>,
}

impl SettingsService {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, ServiceError> {
        Ok(Self { store: JsonDocStore::new(path, SystemSettings::default).await? })
    }

    pub fn in_memory() -> Self {
        Self { store: JsonDocStore::in_memory(SystemSettings::default()) }
    }

    pub async fn get(&self) -> SystemSettings {
        self.store.get().await
    }

    /// Merge the present sections into the stored settings. The merged result must
    /// validate or nothing is saved.
    #[instrument(skip(self, patch))]
    pub async fn save(&self, patch: SettingsPatch) -> Result<SystemSettings, ServiceError> {
        let saved = self
            .store
            .update(|settings| {
                settings.merge(patch);
                Ok(settings.validate()?)
            })
            .await?;
        info!("settings saved");
        Ok(saved)
    }

    pub async fn reset(&self) -> Result<SystemSettings, ServiceError> {
        self.store.set(SystemSettings::default()).await
    }
}
