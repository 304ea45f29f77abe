use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub type ModuleId = String;
pub type StepId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Retail,
    Restaurant,
    Services,
    Ecommerce,
    Manufacturing,
    Healthcare,
    Construction,
    Other,
}

impl Industry {
    pub const ALL: [Industry; 8] = [
        Industry::Retail,
        Industry::Restaurant,
        Industry::Services,
        Industry::Ecommerce,
        Industry::Manufacturing,
        Industry::Healthcare,
        Industry::Construction,
        Industry::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::Retail => "retail",
            Industry::Restaurant => "restaurant",
            Industry::Services => "services",
            Industry::Ecommerce => "ecommerce",
            Industry::Manufacturing => "manufacturing",
            Industry::Healthcare => "healthcare",
            Industry::Construction => "construction",
            Industry::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessSize {
    Solo,
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnlineSales {
    Yes,
    #[default]
    No,
    Planning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PainPoint {
    Inventory,
    Invoicing,
    Scheduling,
    Customers,
    Analytics,
    Staffing,
    Cashflow,
    Marketing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Sales,
    Efficiency,
    Customers,
    Growth,
    Online,
    Compliance,
}

/// 問卷答案。所有欄位都有預設值，缺漏的欄位不會造成解析失敗。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Answers {
    pub business_name: String,
    pub industry: Option<Industry>,
    pub business_size: Option<BusinessSize>,
    pub sells_products: bool,
    pub offers_services: bool,
    pub has_physical_store: bool,
    pub has_employees: bool,
    pub online_sales: OnlineSales,
    pub pain_points: BTreeSet<PainPoint>,
    pub goals: BTreeSet<Goal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupStep {
    pub id: StepId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// 另一個模組至少完成一個步驟後，這個步驟才可操作
    #[serde(default)]
    pub prerequisite_module: Option<ModuleId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDefinition {
    pub id: ModuleId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub phase: u8,
    #[serde(default)]
    pub prerequisites: Vec<ModuleId>,
    #[serde(default)]
    pub steps: Vec<SetupStep>,
    /// 依產業的推薦說明，鍵為產業名稱（例如 "retail"）
    #[serde(default)]
    pub explanations: BTreeMap<String, String>,
    pub default_explanation: String,
}

impl ModuleDefinition {
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, step_id: &str) -> Option<&SetupStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    pub fn explanation_for(&self, industry: Option<Industry>) -> &str {
        industry
            .and_then(|i| self.explanations.get(i.as_str()))
            .map(String::as_str)
            .unwrap_or(&self.default_explanation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseInfo {
    pub number: u8,
    pub label: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relevance {
    Essential,
    Recommended,
    Optional,
}

impl Relevance {
    pub const ESSENTIAL_THRESHOLD: u8 = 50;
    pub const RECOMMENDED_THRESHOLD: u8 = 25;

    pub fn from_score(score: u8) -> Self {
        if score >= Self::ESSENTIAL_THRESHOLD {
            Relevance::Essential
        } else if score >= Self::RECOMMENDED_THRESHOLD {
            Relevance::Recommended
        } else {
            Relevance::Optional
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relevance::Essential => "essential",
            Relevance::Recommended => "recommended",
            Relevance::Optional => "optional",
        }
    }
}

impl fmt::Display for Relevance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub module_id: ModuleId,
    pub score: u8,
    pub relevance: Relevance,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleProgress {
    #[serde(default)]
    pub completed_steps: BTreeSet<StepId>,
}

/// 整份快照：答案、推薦清單與各模組進度
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardState {
    pub answers: Answers,
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub progress: BTreeMap<ModuleId, ModuleProgress>,
    pub created_at: DateTime<Utc>,
}

impl OnboardState {
    pub fn new(answers: Answers, recommendations: Vec<Recommendation>) -> Self {
        Self {
            answers,
            recommendations,
            progress: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn completed_steps(&self, module_id: &str) -> Option<&BTreeSet<StepId>> {
        self.progress.get(module_id).map(|p| &p.completed_steps)
    }

    pub fn is_step_completed(&self, module_id: &str, step_id: &str) -> bool {
        self.completed_steps(module_id)
            .map(|steps| steps.contains(step_id))
            .unwrap_or(false)
    }

    pub fn recommendation(&self, module_id: &str) -> Option<&Recommendation> {
        self.recommendations.iter().find(|r| r.module_id == module_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    Locked,
    Ready,
    InProgress,
    Complete,
}

impl ModuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleStatus::Locked => "locked",
            ModuleStatus::Ready => "ready",
            ModuleStatus::InProgress => "in_progress",
            ModuleStatus::Complete => "complete",
        }
    }

    pub fn has_progress(&self) -> bool {
        matches!(self, ModuleStatus::InProgress | ModuleStatus::Complete)
    }
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
