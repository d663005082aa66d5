//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::{info, warn};

/// Ensure the data directory exists, creating it when missing.
pub async fn ensure_env(data_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(data_dir).await.is_err() {
        warn!(%data_dir, "data directory not found; creating it");
    }
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    info!(%data_dir, "data directory ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ensure_env;

    #[tokio::test]
    async fn ensure_env_creates_missing_dir() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("admin_env_{}", uuid::Uuid::new_v4()));
        let path = dir.to_string_lossy().to_string();
        ensure_env(&path).await?;
        assert!(tokio::fs::metadata(&dir).await?.is_dir());
        // idempotent on second call
        ensure_env(&path).await?;
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
