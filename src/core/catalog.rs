use crate::domain::model::{Industry, ModuleDefinition, PhaseInfo};
use crate::utils::error::{OnboardError, Result};
use crate::utils::validation::validate_range;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.toml");

pub const MIN_PHASE: u8 = 1;
pub const MAX_PHASE: u8 = 4;

/// 目錄檔案的 TOML 結構
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub phases: Vec<PhaseInfo>,
    #[serde(default)]
    pub modules: Vec<ModuleDefinition>,
}

/// 模組目錄：以 id 索引的唯讀模組定義集合
///
/// 前置模組以 id 參照，建立時只驗證一次（存在性、唯一性、無循環）。
#[derive(Debug, Clone)]
pub struct ModuleCatalog {
    modules: Vec<ModuleDefinition>,
    index: HashMap<String, usize>,
    phases: Vec<PhaseInfo>,
}

impl ModuleCatalog {
    /// 內建目錄
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATALOG, "built-in catalog")
    }

    /// 從 TOML 檔案載入目錄
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content, &path.as_ref().display().to_string())
    }

    pub fn from_toml_str(content: &str, source_name: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content).map_err(|e| OnboardError::TomlParseError {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        Self::new(file.modules, file.phases)
    }

    pub fn new(modules: Vec<ModuleDefinition>, phases: Vec<PhaseInfo>) -> Result<Self> {
        let mut index = HashMap::with_capacity(modules.len());
        for (position, module) in modules.iter().enumerate() {
            if index.insert(module.id.clone(), position).is_some() {
                return Err(catalog_error(format!("Duplicate module id '{}'", module.id)));
            }
        }

        let catalog = Self {
            modules,
            index,
            phases,
        };
        catalog.validate()?;

        tracing::debug!(
            "Loaded module catalog with {} modules across {} phases",
            catalog.modules.len(),
            catalog.phases.len()
        );
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        let mut seen_phases = HashSet::new();
        for phase in &self.phases {
            validate_range("phases.number", phase.number, MIN_PHASE, MAX_PHASE)?;
            if !seen_phases.insert(phase.number) {
                return Err(catalog_error(format!("Duplicate phase {}", phase.number)));
            }
        }

        for module in &self.modules {
            self.validate_module(module)?;
        }

        // 檢查循環依賴
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        for module in &self.modules {
            if !visited.contains(module.id.as_str())
                && self.has_circular_dependency(&module.id, &mut visited, &mut rec_stack)
            {
                return Err(catalog_error(format!(
                    "Circular prerequisite chain involving module '{}'",
                    module.id
                )));
            }
        }

        Ok(())
    }

    fn validate_module(&self, module: &ModuleDefinition) -> Result<()> {
        validate_range(
            &format!("modules.{}.phase", module.id),
            module.phase,
            MIN_PHASE,
            MAX_PHASE,
        )?;

        for prerequisite in &module.prerequisites {
            if prerequisite == &module.id {
                return Err(catalog_error(format!(
                    "Module '{}' lists itself as a prerequisite",
                    module.id
                )));
            }
            if !self.index.contains_key(prerequisite) {
                return Err(catalog_error(format!(
                    "Module '{}' depends on unknown module '{}'",
                    module.id, prerequisite
                )));
            }
        }

        let mut step_ids = HashSet::new();
        for step in &module.steps {
            if !step_ids.insert(step.id.as_str()) {
                return Err(catalog_error(format!(
                    "Duplicate step id '{}' in module '{}'",
                    step.id, module.id
                )));
            }
            if let Some(required) = &step.prerequisite_module {
                if !self.index.contains_key(required) {
                    return Err(catalog_error(format!(
                        "Step '{}.{}' depends on unknown module '{}'",
                        module.id, step.id, required
                    )));
                }
            }
        }

        for industry in module.explanations.keys() {
            if Industry::parse(industry).is_none() {
                return Err(catalog_error(format!(
                    "Module '{}' has an explanation for unknown industry '{}'",
                    module.id, industry
                )));
            }
        }

        Ok(())
    }

    fn has_circular_dependency<'a>(
        &'a self,
        module_id: &'a str,
        visited: &mut HashSet<&'a str>,
        rec_stack: &mut HashSet<&'a str>,
    ) -> bool {
        visited.insert(module_id);
        rec_stack.insert(module_id);

        if let Some(module) = self.get(module_id) {
            for dep in &module.prerequisites {
                if !visited.contains(dep.as_str()) {
                    if self.has_circular_dependency(dep, visited, rec_stack) {
                        return true;
                    }
                } else if rec_stack.contains(dep.as_str()) {
                    return true;
                }
            }
        }

        rec_stack.remove(module_id);
        false
    }

    /// 以 id 查詢模組；找不到時回傳 None
    pub fn get(&self, module_id: &str) -> Option<&ModuleDefinition> {
        self.index.get(module_id).map(|&i| &self.modules[i])
    }

    pub fn contains(&self, module_id: &str) -> bool {
        self.index.contains_key(module_id)
    }

    pub fn modules(&self) -> &[ModuleDefinition] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn phases(&self) -> &[PhaseInfo] {
        &self.phases
    }

    pub fn phase(&self, number: u8) -> Option<&PhaseInfo> {
        self.phases.iter().find(|p| p.number == number)
    }

    pub fn modules_in_phase(&self, number: u8) -> impl Iterator<Item = &ModuleDefinition> {
        self.modules.iter().filter(move |m| m.phase == number)
    }

    /// 是否有其他模組把這個模組列為前置模組
    pub fn is_prerequisite(&self, module_id: &str) -> bool {
        self.modules
            .iter()
            .any(|m| m.prerequisites.iter().any(|p| p == module_id))
    }

    pub fn dependents(&self, module_id: &str) -> Vec<&ModuleDefinition> {
        self.modules
            .iter()
            .filter(|m| m.prerequisites.iter().any(|p| p == module_id))
            .collect()
    }
}

fn catalog_error(message: String) -> OnboardError {
    OnboardError::CatalogError { message }
}
