//! Module status, step eligibility and journey aggregation.
//!
//! Nothing here is stored: every status is derived from the catalog and the
//! completed-step sets held in [`OnboardState`].

use crate::core::catalog::ModuleCatalog;
use crate::domain::model::{ModuleDefinition, ModuleStatus, OnboardState, SetupStep};
use serde::Serialize;

/// 只計算屬於該模組的已完成步驟
pub fn completed_count(module: &ModuleDefinition, state: &OnboardState) -> usize {
    state
        .completed_steps(&module.id)
        .map(|done| module.steps.iter().filter(|s| done.contains(&s.id)).count())
        .unwrap_or(0)
}

/// 依 id 計算；目錄外的模組（孤兒進度）以記錄中的數量為準
fn completed_count_by_id(catalog: &ModuleCatalog, module_id: &str, state: &OnboardState) -> usize {
    match catalog.get(module_id) {
        Some(module) => completed_count(module, state),
        None => state.completed_steps(module_id).map_or(0, |s| s.len()),
    }
}

/// 模組狀態。已有進度的模組不會再被鎖定。
pub fn module_status(catalog: &ModuleCatalog, module: &ModuleDefinition, state: &OnboardState) -> ModuleStatus {
    let completed = completed_count(module, state);
    let total = module.total_steps();

    if total > 0 && completed == total {
        return ModuleStatus::Complete;
    }
    if completed > 0 {
        return ModuleStatus::InProgress;
    }
    for prerequisite in &module.prerequisites {
        if completed_count_by_id(catalog, prerequisite, state) == 0 {
            return ModuleStatus::Locked;
        }
    }
    ModuleStatus::Ready
}

pub fn status_by_id(catalog: &ModuleCatalog, module_id: &str, state: &OnboardState) -> Option<ModuleStatus> {
    catalog
        .get(module_id)
        .map(|module| module_status(catalog, module, state))
}

/// 步驟的可操作狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepEligibility {
    pub completed: bool,
    pub locked: bool,
    /// 必須明確完成，不提供「直接標記完成」的捷徑
    pub unskippable: bool,
}

impl StepEligibility {
    pub fn can_toggle(&self) -> bool {
        !self.locked
    }
}

pub fn step_eligibility(
    catalog: &ModuleCatalog,
    module: &ModuleDefinition,
    step_index: usize,
    step: &SetupStep,
    state: &OnboardState,
) -> StepEligibility {
    let completed = state.is_step_completed(&module.id, &step.id);
    let locked = !completed
        && step
            .prerequisite_module
            .as_deref()
            .is_some_and(|required| completed_count_by_id(catalog, required, state) == 0);
    let unskippable = step_index == 0 && catalog.is_prerequisite(&module.id);

    StepEligibility {
        completed,
        locked,
        unskippable,
    }
}

pub fn step_eligibility_by_id(
    catalog: &ModuleCatalog,
    module_id: &str,
    step_id: &str,
    state: &OnboardState,
) -> Option<StepEligibility> {
    let module = catalog.get(module_id)?;
    let (index, step) = module.steps.iter().enumerate().find(|(_, s)| s.id == step_id)?;
    Some(step_eligibility(catalog, module, index, step, state))
}

/// 切換步驟完成狀態，回傳新的快照，原狀態不變。
///
/// 不檢查鎖定狀態；是否允許操作由呈現層決定。清空後的進度項目會被移除，
/// 因此「不存在」與「空集合」視為同一狀態。
pub fn toggle_step(state: &OnboardState, module_id: &str, step_id: &str) -> OnboardState {
    let mut next = state.clone();
    let progress = next.progress.entry(module_id.to_string()).or_default();

    if !progress.completed_steps.remove(step_id) {
        progress.completed_steps.insert(step_id.to_string());
    }
    if progress.completed_steps.is_empty() {
        next.progress.remove(module_id);
    }

    next
}

/// 可見模組：最新推薦清單中的模組（分數皆 > 0），依推薦順序
pub fn visible_modules<'a>(catalog: &'a ModuleCatalog, state: &OnboardState) -> Vec<&'a ModuleDefinition> {
    state
        .recommendations
        .iter()
        .filter(|r| r.score > 0)
        .filter_map(|r| catalog.get(&r.module_id))
        .collect()
}

/// 整體進度百分比（四捨五入）；沒有可見模組時為 0
pub fn overall_progress(catalog: &ModuleCatalog, state: &OnboardState) -> u8 {
    let visible: Vec<&str> = state
        .recommendations
        .iter()
        .filter(|r| r.score > 0)
        .map(|r| r.module_id.as_str())
        .collect();
    if visible.is_empty() {
        return 0;
    }

    let complete = visible
        .iter()
        .filter(|id| status_by_id(catalog, id, state) == Some(ModuleStatus::Complete))
        .count();

    (100.0 * complete as f64 / visible.len() as f64).round() as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSummary {
    pub module_id: String,
    pub name: String,
    pub status: ModuleStatus,
    pub completed_steps: usize,
    pub total_steps: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseProgress {
    pub number: u8,
    pub label: String,
    pub description: String,
    pub modules: Vec<ModuleSummary>,
}

impl PhaseProgress {
    /// 沒有模組的階段視為完成（但不會顯示）
    pub fn is_complete(&self) -> bool {
        self.modules.iter().all(|m| m.status == ModuleStatus::Complete)
    }

    pub fn has_progress(&self) -> bool {
        self.modules.iter().any(|m| m.status.has_progress())
    }
}

fn summarize(catalog: &ModuleCatalog, module: &ModuleDefinition, state: &OnboardState) -> ModuleSummary {
    ModuleSummary {
        module_id: module.id.clone(),
        name: module.name.clone(),
        status: module_status(catalog, module, state),
        completed_steps: completed_count(module, state),
        total_steps: module.total_steps(),
    }
}

/// 單一階段的彙總，只包含可見模組
pub fn phase_progress(catalog: &ModuleCatalog, state: &OnboardState, number: u8) -> PhaseProgress {
    let (label, description) = catalog
        .phase(number)
        .map(|p| (p.label.clone(), p.description.clone()))
        .unwrap_or_else(|| (format!("Phase {}", number), String::new()));

    let modules = visible_modules(catalog, state)
        .into_iter()
        .filter(|m| m.phase == number)
        .map(|m| summarize(catalog, m, state))
        .collect();

    PhaseProgress {
        number,
        label,
        description,
        modules,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JourneyOverview {
    pub phases: Vec<PhaseProgress>,
    pub overall_percent: u8,
    pub next_module: Option<String>,
}

/// 整個旅程的彙總；沒有可見模組的階段會被略過
pub fn journey_overview(catalog: &ModuleCatalog, state: &OnboardState) -> JourneyOverview {
    let phases: Vec<PhaseProgress> = (crate::core::catalog::MIN_PHASE..=crate::core::catalog::MAX_PHASE)
        .map(|number| phase_progress(catalog, state, number))
        .filter(|phase| !phase.modules.is_empty())
        .collect();

    let next_module = phases
        .iter()
        .flat_map(|p| p.modules.iter())
        .find(|m| matches!(m.status, ModuleStatus::InProgress | ModuleStatus::Ready))
        .map(|m| m.module_id.clone());

    JourneyOverview {
        overall_percent: overall_progress(catalog, state),
        phases,
        next_module,
    }
}
