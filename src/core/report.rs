use crate::core::catalog::ModuleCatalog;
use crate::core::progress;
use crate::domain::model::OnboardState;
use crate::utils::error::{OnboardError, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub module_id: String,
    pub name: String,
    pub phase: Option<u8>,
    pub score: u8,
    pub relevance: String,
    pub status: String,
    pub completed_steps: usize,
    pub total_steps: usize,
    pub reason: String,
}

/// 推薦清單加上目前狀態，依推薦順序
pub fn build_rows(catalog: &ModuleCatalog, state: &OnboardState) -> Vec<ReportRow> {
    state
        .recommendations
        .iter()
        .map(|rec| {
            let module = catalog.get(&rec.module_id);
            ReportRow {
                module_id: rec.module_id.clone(),
                name: module
                    .map(|m| m.name.clone())
                    .unwrap_or_else(|| rec.module_id.clone()),
                phase: module.map(|m| m.phase),
                score: rec.score,
                relevance: rec.relevance.to_string(),
                status: module
                    .map(|m| progress::module_status(catalog, m, state).to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                completed_steps: module.map_or(0, |m| progress::completed_count(m, state)),
                total_steps: module.map_or(0, |m| m.total_steps()),
                reason: rec.reason.clone(),
            }
        })
        .collect()
}

pub fn to_csv(catalog: &ModuleCatalog, state: &OnboardState) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in build_rows(catalog, state) {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| OnboardError::IoError(e.into_error()))?;

    String::from_utf8(bytes)
        .map_err(|e| OnboardError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::RuleSet;
    use crate::core::scoring::ScoringEngine;
    use crate::domain::model::{Answers, Industry, Recommendation, Relevance};

    fn retail_state() -> (ModuleCatalog, OnboardState) {
        let catalog = ModuleCatalog::builtin().unwrap();
        let answers = Answers {
            industry: Some(Industry::Retail),
            sells_products: true,
            ..Default::default()
        };
        let recommendations = ScoringEngine::new(RuleSet::builtin().unwrap()).score(&catalog, &answers);
        (catalog, OnboardState::new(answers, recommendations))
    }

    #[test]
    fn test_rows_follow_recommendation_order() {
        let (catalog, state) = retail_state();
        let rows = build_rows(&catalog, &state);

        assert_eq!(rows.len(), state.recommendations.len());
        for (row, rec) in rows.iter().zip(&state.recommendations) {
            assert_eq!(row.module_id, rec.module_id);
            assert_eq!(row.score, rec.score);
        }
    }

    #[test]
    fn test_csv_header_and_rows() {
        let (catalog, state) = retail_state();
        let state = progress::toggle_step(&state, "settings", "business-profile");

        let csv = to_csv(&catalog, &state).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "module_id,name,phase,score,relevance,status,completed_steps,total_steps,reason"
        );
        assert_eq!(lines.len(), state.recommendations.len() + 1);
        let settings = lines.iter().find(|l| l.starts_with("settings,")).unwrap();
        assert!(settings.contains(",in_progress,1,3,"));
    }

    #[test]
    fn test_module_missing_from_catalog() {
        let catalog = ModuleCatalog::builtin().unwrap();
        let state = OnboardState::new(
            Answers::default(),
            vec![Recommendation {
                module_id: "retired".to_string(),
                score: 12,
                relevance: Relevance::Optional,
                reason: "old".to_string(),
            }],
        );

        let rows = build_rows(&catalog, &state);
        assert_eq!(rows[0].status, "unknown");
        assert_eq!(rows[0].phase, None);
        assert_eq!(rows[0].total_steps, 0);
    }
}
