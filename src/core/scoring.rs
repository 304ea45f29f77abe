use crate::core::catalog::ModuleCatalog;
use crate::core::rules::RuleSet;
use crate::domain::model::{Answers, ModuleId, Recommendation, Relevance};
use indexmap::IndexMap;

pub const BASELINE_SCORE: i32 = 10;
pub const MAX_SCORE: i32 = 100;

const FALLBACK_REASON: &str = "Suggested based on your answers.";

/// 推薦評分引擎：純函式、可重複呼叫、不會失敗
///
/// 目錄中的模組從基準分開始；只出現在規則裡的模組從 0 開始累加。
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    rules: RuleSet,
    baseline: i32,
}

impl ScoringEngine {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            baseline: BASELINE_SCORE,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// 規則參照到、但目錄中不存在的模組
    pub fn unknown_targets<'a>(&'a self, catalog: &ModuleCatalog) -> Vec<&'a str> {
        self.rules
            .targets()
            .into_iter()
            .filter(|id| !catalog.contains(id))
            .collect()
    }

    /// 未截斷的原始分數，依出現順序（目錄順序，之後是僅在規則中出現的模組）
    pub fn raw_scores(&self, catalog: &ModuleCatalog, answers: &Answers) -> IndexMap<ModuleId, i32> {
        let mut scores: IndexMap<ModuleId, i32> = catalog
            .modules()
            .iter()
            .map(|m| (m.id.clone(), self.baseline))
            .collect();

        for rule in self.rules.iter() {
            if !rule.when.matches(answers) {
                continue;
            }
            tracing::trace!("Rule '{}' matched", rule.name);
            for (module_id, delta) in &rule.scores {
                let total = scores.entry(module_id.clone()).or_insert(0);
                *total = total.saturating_add(*delta);
            }
        }

        scores
    }

    pub fn score(&self, catalog: &ModuleCatalog, answers: &Answers) -> Vec<Recommendation> {
        let mut recommendations: Vec<Recommendation> = self
            .raw_scores(catalog, answers)
            .into_iter()
            .map(|(module_id, raw)| (module_id, raw.clamp(0, MAX_SCORE)))
            .filter(|(_, score)| *score > 0)
            .map(|(module_id, score)| {
                let score = score as u8;
                let reason = catalog
                    .get(&module_id)
                    .map(|m| m.explanation_for(answers.industry).to_string())
                    .unwrap_or_else(|| FALLBACK_REASON.to_string());
                Recommendation {
                    module_id,
                    score,
                    relevance: Relevance::from_score(score),
                    reason,
                }
            })
            .collect();

        // sort_by 為穩定排序，同分保留原本順序
        recommendations.sort_by(|a, b| b.score.cmp(&a.score));

        tracing::debug!(
            "Scored {} visible modules ({} essential)",
            recommendations.len(),
            recommendations
                .iter()
                .filter(|r| r.relevance == Relevance::Essential)
                .count()
        );
        recommendations
    }

    /// 每個模組符合的規則名稱，方便稽核分數來源
    pub fn explain(&self, answers: &Answers) -> IndexMap<ModuleId, Vec<String>> {
        let mut matched: IndexMap<ModuleId, Vec<String>> = IndexMap::new();
        for rule in self.rules.iter().filter(|r| r.when.matches(answers)) {
            for module_id in rule.scores.keys() {
                matched
                    .entry(module_id.clone())
                    .or_default()
                    .push(rule.name.clone());
            }
        }
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::{Condition, ScoringRule};
    use crate::domain::model::{BusinessSize, Goal, Industry, ModuleDefinition, PainPoint};
    use std::collections::BTreeSet;

    fn builtin() -> (ModuleCatalog, ScoringEngine) {
        (
            ModuleCatalog::builtin().unwrap(),
            ScoringEngine::new(RuleSet::builtin().unwrap()),
        )
    }

    fn small_catalog(ids: &[&str]) -> ModuleCatalog {
        let modules = ids
            .iter()
            .map(|id| ModuleDefinition {
                id: id.to_string(),
                name: id.to_string(),
                description: String::new(),
                phase: 1,
                prerequisites: vec![],
                steps: vec![],
                explanations: [("retail".to_string(), format!("{} for shops", id))]
                    .into_iter()
                    .collect(),
                default_explanation: format!("{} in general", id),
            })
            .collect();
        ModuleCatalog::new(modules, vec![]).unwrap()
    }

    fn retail_store() -> Answers {
        Answers {
            business_name: "Corner Shop".to_string(),
            industry: Some(Industry::Retail),
            business_size: Some(BusinessSize::Small),
            sells_products: true,
            has_physical_store: true,
            has_employees: true,
            pain_points: BTreeSet::from([PainPoint::Inventory, PainPoint::Analytics]),
            goals: BTreeSet::from([Goal::Sales, Goal::Efficiency]),
            ..Default::default()
        }
    }

    #[test]
    fn test_retail_store_inventory_is_essential() {
        let (catalog, engine) = builtin();
        let answers = retail_store();

        let raw = engine.raw_scores(&catalog, &answers);
        assert_eq!(raw["inventory"], 115);

        let recommendations = engine.score(&catalog, &answers);
        let inventory = recommendations
            .iter()
            .find(|r| r.module_id == "inventory")
            .unwrap();
        assert_eq!(inventory.score, 100);
        assert_eq!(inventory.relevance, Relevance::Essential);
        assert_eq!(
            inventory.reason,
            "Keep shelf and back-room stock accurate and avoid lost sales from empty shelves."
        );
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let (catalog, engine) = builtin();
        let answers = retail_store();

        assert_eq!(engine.score(&catalog, &answers), engine.score(&catalog, &answers));
    }

    #[test]
    fn test_scores_are_clamped_and_positive() {
        let (catalog, engine) = builtin();
        let everything = Answers {
            industry: Some(Industry::Ecommerce),
            business_size: Some(BusinessSize::Large),
            sells_products: true,
            offers_services: true,
            has_physical_store: true,
            has_employees: true,
            online_sales: crate::domain::model::OnlineSales::Yes,
            pain_points: BTreeSet::from([
                PainPoint::Inventory,
                PainPoint::Invoicing,
                PainPoint::Scheduling,
                PainPoint::Customers,
                PainPoint::Analytics,
                PainPoint::Staffing,
                PainPoint::Cashflow,
                PainPoint::Marketing,
            ]),
            goals: BTreeSet::from([Goal::Sales, Goal::Growth, Goal::Online, Goal::Customers]),
            ..Default::default()
        };

        for answers in [everything, Answers::default(), retail_store()] {
            for rec in engine.score(&catalog, &answers) {
                assert!(rec.score >= 1 && rec.score <= 100, "{:?}", rec);
            }
        }
    }

    #[test]
    fn test_results_sorted_descending() {
        let (catalog, engine) = builtin();
        let recommendations = engine.score(&catalog, &retail_store());

        assert!(recommendations.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_modules_at_or_below_zero_are_dropped() {
        let (catalog, engine) = builtin();
        // 只在實體店面銷售：ecommerce 10 - 20 = -10
        let recommendations = engine.score(&catalog, &retail_store());

        assert!(recommendations.iter().all(|r| r.module_id != "ecommerce"));
    }

    #[test]
    fn test_empty_answers_yield_baseline_scores() {
        let (catalog, engine) = builtin();
        let recommendations = engine.score(&catalog, &Answers::default());

        let settings = recommendations.iter().find(|r| r.module_id == "settings").unwrap();
        assert_eq!(settings.score, 50);
        assert_eq!(settings.reason, catalog.get("settings").unwrap().default_explanation);

        let marketing = recommendations.iter().find(|r| r.module_id == "marketing").unwrap();
        assert_eq!(marketing.score, BASELINE_SCORE as u8);
        assert_eq!(marketing.relevance, Relevance::Optional);
    }

    #[test]
    fn test_no_employees_penalty_is_soft() {
        let (catalog, engine) = builtin();
        // restaurant +30, growth +15, baseline 10 = 55; no employees -50 => 5
        let answers = Answers {
            industry: Some(Industry::Restaurant),
            has_employees: false,
            goals: BTreeSet::from([Goal::Growth]),
            ..Default::default()
        };

        let recommendations = engine.score(&catalog, &answers);
        let employees = recommendations
            .iter()
            .find(|r| r.module_id == "employees")
            .unwrap();
        assert_eq!(employees.score, 5);
        assert_eq!(employees.relevance, Relevance::Optional);
    }

    #[test]
    fn test_no_employees_alone_hides_module() {
        let (catalog, engine) = builtin();
        let recommendations = engine.score(&catalog, &Answers::default());

        assert!(recommendations.iter().all(|r| r.module_id != "employees"));
    }

    #[test]
    fn test_threshold_boundaries_through_rules() {
        let catalog = small_catalog(&["a", "b", "c", "d"]);
        let rules = RuleSet::new(vec![ScoringRule::new(
            "bump",
            Condition::Always,
            &[("a", 40), ("b", 39), ("c", 15), ("d", 14)],
        )]);
        let engine = ScoringEngine::new(rules);

        let recommendations = engine.score(&catalog, &Answers::default());
        let tier = |id: &str| {
            let rec = recommendations.iter().find(|r| r.module_id == id).unwrap();
            (rec.score, rec.relevance)
        };

        assert_eq!(tier("a"), (50, Relevance::Essential));
        assert_eq!(tier("b"), (49, Relevance::Recommended));
        assert_eq!(tier("c"), (25, Relevance::Recommended));
        assert_eq!(tier("d"), (24, Relevance::Optional));
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let catalog = small_catalog(&["first", "second", "third"]);
        let engine = ScoringEngine::new(RuleSet::default());

        let ids: Vec<String> = engine
            .score(&catalog, &Answers::default())
            .into_iter()
            .map(|r| r.module_id)
            .collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_rule_only_module_accumulates_without_baseline() {
        let catalog = small_catalog(&["known"]);
        let rules = RuleSet::new(vec![
            ScoringRule::new("one", Condition::Always, &[("ghost", 20)]),
            ScoringRule::new("two", Condition::Always, &[("ghost", 15)]),
        ]);
        let engine = ScoringEngine::new(rules);

        assert_eq!(engine.unknown_targets(&catalog), vec!["ghost"]);

        let recommendations = engine.score(&catalog, &Answers::default());
        let ghost = recommendations.iter().find(|r| r.module_id == "ghost").unwrap();
        assert_eq!(ghost.score, 35);
        assert_eq!(ghost.reason, FALLBACK_REASON);
    }

    #[test]
    fn test_extreme_deltas_saturate() {
        let catalog = small_catalog(&["a", "b"]);
        let engine = ScoringEngine::new(RuleSet::new(vec![
            ScoringRule::new("huge", Condition::Always, &[("a", i32::MAX), ("b", i32::MIN)]),
            ScoringRule::new("more", Condition::Always, &[("a", i32::MAX), ("b", i32::MIN)]),
        ]));

        let raw = engine.raw_scores(&catalog, &Answers::default());
        assert_eq!(raw["a"], i32::MAX);
        assert_eq!(raw["b"], i32::MIN);

        let recommendations = engine.score(&catalog, &Answers::default());
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].module_id, "a");
        assert_eq!(recommendations[0].score, MAX_SCORE as u8);
        assert_eq!(recommendations[0].relevance, Relevance::Essential);
    }

    #[test]
    fn test_reason_uses_industry_explanation() {
        let catalog = small_catalog(&["a"]);
        let engine = ScoringEngine::new(RuleSet::default());

        let retail = Answers {
            industry: Some(Industry::Retail),
            ..Default::default()
        };
        let healthcare = Answers {
            industry: Some(Industry::Healthcare),
            ..Default::default()
        };

        assert_eq!(engine.score(&catalog, &retail)[0].reason, "a for shops");
        assert_eq!(engine.score(&catalog, &healthcare)[0].reason, "a in general");
        assert_eq!(engine.score(&catalog, &Answers::default())[0].reason, "a in general");
    }

    #[test]
    fn test_rules_stack_on_same_module() {
        let (_, engine) = builtin();
        let explained = engine.explain(&retail_store());

        assert_eq!(
            explained["inventory"],
            vec![
                "industry-retail",
                "sells-products",
                "physical-store",
                "pain-inventory",
                "goal-efficiency"
            ]
        );
    }
}
