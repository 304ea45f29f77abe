use crate::core::catalog::ModuleCatalog;
use crate::core::progress::{self, JourneyOverview};
use crate::core::rules::RuleSet;
use crate::core::scoring::ScoringEngine;
use crate::domain::model::{Answers, ModuleStatus, OnboardState};
use crate::domain::ports::SnapshotStore;

/// 引導流程：評分、切換步驟與快照保存
pub struct OnboardSession<S: SnapshotStore> {
    store: S,
    catalog: ModuleCatalog,
    scoring: ScoringEngine,
}

impl<S: SnapshotStore> OnboardSession<S> {
    pub fn new(store: S, catalog: ModuleCatalog, rules: RuleSet) -> Self {
        let scoring = ScoringEngine::new(rules);
        for target in scoring.unknown_targets(&catalog) {
            tracing::warn!(
                "⚠️ Scoring rules reference module '{}' which is not in the catalog; it will be scored without a baseline",
                target
            );
        }

        Self {
            store,
            catalog,
            scoring,
        }
    }

    /// 使用內建目錄與規則
    pub fn with_builtin(store: S) -> crate::utils::error::Result<Self> {
        Ok(Self::new(store, ModuleCatalog::builtin()?, RuleSet::builtin()?))
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    pub fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 讀取先前的狀態；None 表示需要重新填寫問卷
    pub async fn resume(&self) -> Option<OnboardState> {
        let state = self.store.load().await;
        match &state {
            Some(s) => tracing::debug!(
                "Resumed onboarding for '{}' with {} recommendations",
                s.answers.business_name,
                s.recommendations.len()
            ),
            None => tracing::info!("No saved onboarding state, questionnaire required"),
        }
        state
    }

    /// 問卷完成：評分並建立新的狀態
    pub async fn complete_questionnaire(&self, answers: Answers) -> OnboardState {
        let recommendations = self.scoring.score(&self.catalog, &answers);
        tracing::info!(
            "📋 Questionnaire complete for '{}': {} modules recommended",
            answers.business_name,
            recommendations.len()
        );

        let state = OnboardState::new(answers, recommendations);
        self.persist(&state).await;
        state
    }

    /// 修改答案：推薦清單整份重建，既有進度保留
    pub async fn update_answers(&self, state: &OnboardState, answers: Answers) -> OnboardState {
        let mut next = state.clone();
        next.recommendations = self.scoring.score(&self.catalog, &answers);
        next.answers = answers;
        self.persist(&next).await;
        next
    }

    pub async fn toggle_step(&self, state: &OnboardState, module_id: &str, step_id: &str) -> OnboardState {
        if let Some(eligibility) =
            progress::step_eligibility_by_id(&self.catalog, module_id, step_id, state)
        {
            if eligibility.locked {
                tracing::warn!(
                    "⚠️ Toggling locked step '{}' in module '{}'",
                    step_id,
                    module_id
                );
            }
        } else {
            tracing::debug!("Toggling step '{}.{}' unknown to the catalog", module_id, step_id);
        }

        let next = progress::toggle_step(state, module_id, step_id);
        if progress::status_by_id(&self.catalog, module_id, &next) == Some(ModuleStatus::Complete) {
            tracing::info!("✅ Module '{}' complete", module_id);
        }
        self.persist(&next).await;
        next
    }

    /// 重新開始：清除整份快照
    pub async fn start_over(&self) {
        if let Err(e) = self.store.clear().await {
            tracing::warn!("⚠️ Failed to clear onboarding state: {}", e);
        }
        tracing::info!("🔄 Onboarding state cleared");
    }

    pub fn status(&self, state: &OnboardState, module_id: &str) -> Option<ModuleStatus> {
        progress::status_by_id(&self.catalog, module_id, state)
    }

    pub fn overview(&self, state: &OnboardState) -> JourneyOverview {
        progress::journey_overview(&self.catalog, state)
    }

    // 儲存失敗只記錄，不影響流程
    async fn persist(&self, state: &OnboardState) {
        if let Err(e) = self.store.save(state).await {
            tracing::warn!("⚠️ Failed to save onboarding state: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemorySnapshotStore;
    use crate::domain::model::{Industry, PainPoint};
    use crate::utils::error::{OnboardError, Result};
    use async_trait::async_trait;
    use std::collections::BTreeSet;

    struct FailingStore;

    #[async_trait]
    impl SnapshotStore for FailingStore {
        async fn load(&self) -> Option<OnboardState> {
            None
        }

        async fn save(&self, _state: &OnboardState) -> Result<()> {
            Err(OnboardError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }

        async fn clear(&self) -> Result<()> {
            Err(OnboardError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }
    }

    fn answers() -> Answers {
        Answers {
            business_name: "Test Shop".to_string(),
            industry: Some(Industry::Retail),
            sells_products: true,
            pain_points: BTreeSet::from([PainPoint::Inventory]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_resume_without_state() {
        let session = OnboardSession::with_builtin(MemorySnapshotStore::new()).unwrap();
        assert!(session.resume().await.is_none());
    }

    #[tokio::test]
    async fn test_questionnaire_is_saved_and_resumed() {
        let session = OnboardSession::with_builtin(MemorySnapshotStore::new()).unwrap();

        let state = session.complete_questionnaire(answers()).await;
        assert!(!state.recommendations.is_empty());
        assert!(state.progress.is_empty());

        let resumed = session.resume().await.unwrap();
        assert_eq!(resumed, state);
    }

    #[tokio::test]
    async fn test_toggle_is_saved() {
        let session = OnboardSession::with_builtin(MemorySnapshotStore::new()).unwrap();
        let state = session.complete_questionnaire(answers()).await;

        let state = session.toggle_step(&state, "settings", "business-profile").await;
        assert_eq!(session.status(&state, "settings"), Some(ModuleStatus::InProgress));

        let resumed = session.resume().await.unwrap();
        assert!(resumed.is_step_completed("settings", "business-profile"));
    }

    #[tokio::test]
    async fn test_unknown_module_has_no_status() {
        let session = OnboardSession::with_builtin(MemorySnapshotStore::new()).unwrap();
        let state = session.complete_questionnaire(answers()).await;

        // 未知模組的切換仍會記錄，但不會被當成 ready
        let state = session.toggle_step(&state, "warehouse", "racks").await;
        assert!(state.is_step_completed("warehouse", "racks"));
        assert_eq!(session.status(&state, "warehouse"), None);
    }

    #[tokio::test]
    async fn test_start_over_clears_everything() {
        let session = OnboardSession::with_builtin(MemorySnapshotStore::new()).unwrap();
        let state = session.complete_questionnaire(answers()).await;
        session.toggle_step(&state, "settings", "business-profile").await;

        session.start_over().await;
        assert!(session.resume().await.is_none());
    }

    #[tokio::test]
    async fn test_update_answers_rescores_and_keeps_progress() {
        let session = OnboardSession::with_builtin(MemorySnapshotStore::new()).unwrap();
        let state = session.complete_questionnaire(answers()).await;
        let state = session.toggle_step(&state, "settings", "business-profile").await;

        let mut changed = answers();
        changed.industry = Some(Industry::Healthcare);
        changed.sells_products = false;
        changed.pain_points.clear();
        let updated = session.update_answers(&state, changed.clone()).await;

        assert_eq!(updated.answers, changed);
        assert_eq!(updated.progress, state.progress);
        assert_eq!(
            updated.recommendations,
            session.scoring().score(session.catalog(), &changed)
        );
    }

    #[tokio::test]
    async fn test_save_failures_are_ignored() {
        let session = OnboardSession::with_builtin(FailingStore).unwrap();

        let state = session.complete_questionnaire(answers()).await;
        let state = session.toggle_step(&state, "settings", "business-profile").await;
        session.start_over().await;

        assert!(state.is_step_completed("settings", "business-profile"));
        assert!(session.resume().await.is_none());
    }
}
