pub mod catalog;
pub mod progress;
pub mod report;
pub mod rules;
pub mod scoring;
pub mod session;

pub use crate::domain::model::{Answers, ModuleStatus, OnboardState, Recommendation, Relevance};
pub use crate::domain::ports::{ConfigProvider, SnapshotStore};
pub use crate::utils::error::Result;
