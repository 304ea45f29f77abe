use crate::domain::model::{Answers, BusinessSize, Goal, Industry, ModuleId, OnlineSales, PainPoint};
use crate::utils::error::{OnboardError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

const BUILTIN_RULES: &str = include_str!("../../data/rules.toml");

/// 規則條件，以資料描述而非程式分支
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Always,
    Industry(Industry),
    BusinessSize(BusinessSize),
    SellsProducts(bool),
    OffersServices(bool),
    HasPhysicalStore(bool),
    HasEmployees(bool),
    OnlineSales(OnlineSales),
    PainPoint(PainPoint),
    Goal(Goal),
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// 未填寫的產業或規模不會符合任何產業/規模條件
    pub fn matches(&self, answers: &Answers) -> bool {
        match self {
            Condition::Always => true,
            Condition::Industry(industry) => answers.industry == Some(*industry),
            Condition::BusinessSize(size) => answers.business_size == Some(*size),
            Condition::SellsProducts(expected) => answers.sells_products == *expected,
            Condition::OffersServices(expected) => answers.offers_services == *expected,
            Condition::HasPhysicalStore(expected) => answers.has_physical_store == *expected,
            Condition::HasEmployees(expected) => answers.has_employees == *expected,
            Condition::OnlineSales(value) => answers.online_sales == *value,
            Condition::PainPoint(tag) => answers.pain_points.contains(tag),
            Condition::Goal(tag) => answers.goals.contains(tag),
            Condition::All(conditions) => conditions.iter().all(|c| c.matches(answers)),
            Condition::Any(conditions) => conditions.iter().any(|c| c.matches(answers)),
            Condition::Not(condition) => !condition.matches(answers),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub name: String,
    pub when: Condition,
    /// module id -> 分數增減
    pub scores: IndexMap<ModuleId, i32>,
}

impl ScoringRule {
    pub fn new(name: &str, when: Condition, scores: &[(&str, i32)]) -> Self {
        Self {
            name: name.to_string(),
            when,
            scores: scores.iter().map(|(id, delta)| (id.to_string(), *delta)).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<ScoringRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<ScoringRule>) -> Self {
        Self { rules }
    }

    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_RULES, "built-in rules")
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content, &path.as_ref().display().to_string())
    }

    pub fn from_toml_str(content: &str, source_name: &str) -> Result<Self> {
        let rule_set: RuleSet = toml::from_str(content).map_err(|e| OnboardError::TomlParseError {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!("Loaded {} scoring rules from {}", rule_set.rules.len(), source_name);
        Ok(rule_set)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoringRule> {
        self.rules.iter()
    }

    /// 所有規則會影響到的模組 id（依首次出現順序）
    pub fn targets(&self) -> Vec<&str> {
        let mut targets: Vec<&str> = Vec::new();
        for module_id in self.rules.iter().flat_map(|r| r.scores.keys()) {
            if !targets.contains(&module_id.as_str()) {
                targets.push(module_id);
            }
        }
        targets
    }
}
