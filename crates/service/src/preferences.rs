//! Persisted UI preferences (theme), constructed once at startup and shared.

use std::path::PathBuf;

use tracing::debug;

use models::preferences::{ThemeMode, UiPreferences};

use crate::errors::ServiceError;
use crate::storage::JsonDocStore;

#[derive(Clone)]
pub struct PreferencesStore {
    store: JsonDocStore<UiPreferences>,
}

impl PreferencesStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, ServiceError> {
        Ok(Self { store: JsonDocStore::new(path, UiPreferences::default).await? })
    }

    pub fn in_memory() -> Self {
        Self { store: JsonDocStore::in_memory(UiPreferences::default()) }
    }

    pub async fn get(&self) -> UiPreferences {
        self.store.get().await
    }

    pub async fn set(&self, prefs: UiPreferences) -> Result<UiPreferences, ServiceError> {
        self.store.set(prefs).await
    }

    pub async fn set_theme(&self, theme: ThemeMode) -> Result<UiPreferences, ServiceError> {
        self.store
            .update(|p| {
                p.theme = theme;
                Ok(())
            })
            .await
    }

    pub async fn toggle_theme(&self) -> Result<UiPreferences, ServiceError> {
        let prefs = self
            .store
            .update(|p| {
                p.theme = p.theme.toggled();
                Ok(())
            })
            .await?;
        debug!(theme = ?prefs.theme, "theme toggled");
        Ok(prefs)
    }
}
