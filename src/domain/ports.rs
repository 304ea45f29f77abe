use crate::domain::model::OnboardState;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 快照儲存介面。讀取失敗一律視為「沒有先前的狀態」。
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(&self) -> Option<OnboardState>;
    async fn save(&self, state: &OnboardState) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn snapshot_path(&self) -> &str;
    fn modules_file(&self) -> Option<&str>;
    fn rules_file(&self) -> Option<&str>;
}
