use thiserror::Error;

#[derive(Error, Debug)]
pub enum OnboardError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("TOML parsing error in {source_name}: {message}")]
    TomlParseError {
        source_name: String,
        message: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Catalog error: {message}")]
    CatalogError { message: String },

    #[error("Unknown module: {module_id}")]
    UnknownModule { module_id: String },

    #[error("Unknown step '{step_id}' in module {module_id}")]
    UnknownStep { module_id: String, step_id: String },

    #[error("Unknown preset: {name}")]
    UnknownPreset { name: String },
}

/// 錯誤分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Storage,
    Data,
    Configuration,
    Catalog,
    Input,
}

/// 錯誤嚴重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl OnboardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            OnboardError::IoError(_) => ErrorCategory::Storage,
            OnboardError::SerializationError(_) | OnboardError::CsvError(_) => ErrorCategory::Data,
            OnboardError::TomlParseError { .. }
            | OnboardError::ConfigValidationError { .. }
            | OnboardError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            OnboardError::CatalogError { .. } => ErrorCategory::Catalog,
            OnboardError::UnknownModule { .. }
            | OnboardError::UnknownStep { .. }
            | OnboardError::UnknownPreset { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Catalog => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            OnboardError::IoError(_) => "Check that the state directory exists and is writable",
            OnboardError::SerializationError(_) => {
                "The saved snapshot may be damaged; run `onboard reset` and answer the questionnaire again"
            }
            OnboardError::CsvError(_) => "Choose a different export path and try again",
            OnboardError::TomlParseError { .. } => "Make sure the file is valid TOML",
            OnboardError::ConfigValidationError { .. }
            | OnboardError::InvalidConfigValueError { .. } => {
                "Fix the configuration value mentioned above"
            }
            OnboardError::CatalogError { .. } => {
                "Check module ids, phases and prerequisites in the catalog file"
            }
            OnboardError::UnknownModule { .. } | OnboardError::UnknownStep { .. } => {
                "Run `onboard status` to list the available modules and steps"
            }
            OnboardError::UnknownPreset { .. } => "Run `onboard presets` to list the built-in presets",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            OnboardError::IoError(e) => format!("Could not access onboarding files: {}", e),
            OnboardError::SerializationError(_) => "The saved onboarding state could not be read".to_string(),
            OnboardError::UnknownModule { module_id } => {
                format!("There is no module called '{}'", module_id)
            }
            OnboardError::UnknownStep { module_id, step_id } => {
                format!("Module '{}' has no step called '{}'", module_id, step_id)
            }
            OnboardError::UnknownPreset { name } => format!("There is no preset called '{}'", name),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OnboardError>;
