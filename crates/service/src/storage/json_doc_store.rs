use std::{path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};

use crate::errors::ServiceError;

fn storage_err(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::Storage(e.to_string())
}

/// A single JSON document persisted to one file (settings, profile, preferences).
#[derive(Clone)]
pub struct JsonDocStore<T> {
    inner: Arc<RwLock<T>>,
    file_path: Option<PathBuf>,
}

impl<T> JsonDocStore<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Load the document at `path`, writing `initial()` there when the file is missing.
    pub async fn new<P, F>(path: P, initial: F) -> Result<Self, ServiceError>
    where
        P: Into<PathBuf>,
        F: FnOnce() -> T,
    {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(storage_err)?;
        }
        let doc = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| storage_err(format!("{}: {e}", file_path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let doc = initial();
                fs::write(&file_path, serde_json::to_vec_pretty(&doc).map_err(storage_err)?)
                    .await
                    .map_err(storage_err)?;
                doc
            }
            Err(e) => return Err(storage_err(e)),
        };
        Ok(Self { inner: Arc::new(RwLock::new(doc)), file_path: Some(file_path) })
    }

    pub fn in_memory(doc: T) -> Self {
        Self { inner: Arc::new(RwLock::new(doc)), file_path: None }
    }

    pub async fn get(&self) -> T {
        self.inner.read().await.clone()
    }

    /// Replace the document and persist.
    pub async fn set(&self, doc: T) -> Result<T, ServiceError> {
        self.update(|d| {
            *d = doc;
            Ok(())
        })
        .await
    }

    /// Mutate a copy of the document; the copy is committed and persisted only if
    /// the closure succeeds. Returns the committed document.
    pub async fn update<F>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut T) -> Result<(), ServiceError>,
    {
        let mut guard = self.inner.write().await;
        let mut next = guard.clone();
        f(&mut next)?;
        if let Some(path) = &self.file_path {
            let data = serde_json::to_vec_pretty(&next).map_err(storage_err)?;
            fs::write(path, data).await.map_err(storage_err)?;
        }
        *guard = next.clone();
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn writes_initial_and_persists_updates() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_doc_store_{}.json", uuid::Uuid::new_v4()));
        let store = JsonDocStore::new(&tmp, || BTreeMap::from([("theme".to_string(), "light".to_string())])).await?;
        assert_eq!(store.get().await["theme"], "light");

        store
            .update(|d| {
                d.insert("theme".into(), "dark".into());
                Ok(())
            })
            .await?;

        let reopened = JsonDocStore::<BTreeMap<String, String>>::new(&tmp, BTreeMap::new).await?;
        assert_eq!(reopened.get().await["theme"], "dark");
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_update_keeps_previous_document() {
        let store = JsonDocStore::in_memory(vec![1, 2, 3]);
        let res = store
            .update(|d| {
                d.clear();
                Err(ServiceError::Validation("rejected".into()))
            })
            .await;
        assert!(res.is_err());
        assert_eq!(store.get().await, vec![1, 2, 3]);
    }
}
