use crate::domain::model::Answers;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{OnboardError, Result};
use crate::utils::validation::{validate_file_extension, validate_path, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_SNAPSHOT_PATH: &str = ".onboard/state.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnboardConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

fn default_snapshot_path() -> String {
    DEFAULT_SNAPSHOT_PATH.to_string()
}

/// 替換內建目錄或規則的檔案路徑
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub modules_file: Option<String>,
    pub rules_file: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub verbose: bool,
}

impl OnboardConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| OnboardError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_path("storage.snapshot_path", &self.storage.snapshot_path)?;

        if let Some(modules_file) = &self.catalog.modules_file {
            validate_path("catalog.modules_file", modules_file)?;
            validate_file_extension("catalog.modules_file", modules_file, &["toml"])?;
        }
        if let Some(rules_file) = &self.catalog.rules_file {
            validate_path("catalog.rules_file", rules_file)?;
            validate_file_extension("catalog.rules_file", rules_file, &["toml"])?;
        }

        Ok(())
    }
}

impl ConfigProvider for OnboardConfig {
    fn snapshot_path(&self) -> &str {
        &self.storage.snapshot_path
    }

    fn modules_file(&self) -> Option<&str> {
        self.catalog.modules_file.as_deref()
    }

    fn rules_file(&self) -> Option<&str> {
        self.catalog.rules_file.as_deref()
    }
}

impl Validate for OnboardConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// 從 TOML 檔案讀取問卷答案
pub fn answers_from_file<P: AsRef<Path>>(path: P) -> Result<Answers> {
    let content = std::fs::read_to_string(&path)?;
    answers_from_toml_str(&content, &path.as_ref().display().to_string())
}

pub fn answers_from_toml_str(content: &str, source_name: &str) -> Result<Answers> {
    toml::from_str(&substitute_env_vars(content)).map_err(|e| OnboardError::TomlParseError {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

/// 替換環境變數 (例如 ${BUSINESS_NAME})；未設定的變數保留原樣
fn substitute_env_vars(content: &str) -> String {
    env_var_pattern()
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
}
