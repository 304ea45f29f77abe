use crate::domain::model::OnboardState;
use crate::domain::ports::SnapshotStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// 以單一 JSON 檔保存快照
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self) -> Option<OnboardState> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("⚠️ Could not read snapshot {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice(&data) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!("⚠️ Ignoring unreadable snapshot {}: {}", self.path.display(), e);
                None
            }
        }
    }

    async fn save(&self, state: &OnboardState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(state)?;

        // 先寫暫存檔再改名，讀取端不會看到寫到一半的檔案
        let temp = self.temp_path();
        tokio::fs::write(&temp, &json).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        tracing::debug!("Saved snapshot ({} bytes) to {}", json.len(), self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// 記憶體內的快照，供測試與嵌入使用
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    snapshot: Arc<Mutex<Option<OnboardState>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: OnboardState) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(Some(state))),
        }
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> Option<OnboardState> {
        self.snapshot.lock().await.clone()
    }

    async fn save(&self, state: &OnboardState) -> Result<()> {
        *self.snapshot.lock().await = Some(state.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.snapshot.lock().await = None;
        Ok(())
    }
}
