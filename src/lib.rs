pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{FileSnapshotStore, MemorySnapshotStore};
pub use config::OnboardConfig;
pub use crate::core::{catalog::ModuleCatalog, rules::RuleSet, scoring::ScoringEngine, session::OnboardSession};
pub use domain::model::{Answers, ModuleStatus, OnboardState, Recommendation, Relevance};
pub use utils::error::{OnboardError, Result};
