use crate::domain::model::{Answers, BusinessSize, Goal, Industry, OnlineSales, PainPoint};
use crate::utils::error::{OnboardError, Result};
use std::collections::BTreeSet;

/// 問卷快速填寫範本
#[derive(Debug, Clone)]
pub struct Preset {
    pub name: &'static str,
    pub label: &'static str,
    pub answers: Answers,
}

pub fn all() -> Vec<Preset> {
    vec![
        Preset {
            name: "retail-store",
            label: "Retail Store",
            answers: Answers {
                business_name: "Retail Store".to_string(),
                industry: Some(Industry::Retail),
                business_size: Some(BusinessSize::Small),
                sells_products: true,
                offers_services: false,
                has_physical_store: true,
                has_employees: true,
                online_sales: OnlineSales::No,
                pain_points: BTreeSet::from([PainPoint::Inventory, PainPoint::Analytics]),
                goals: BTreeSet::from([Goal::Sales, Goal::Efficiency]),
            },
        },
        Preset {
            name: "restaurant",
            label: "Restaurant",
            answers: Answers {
                business_name: "Restaurant".to_string(),
                industry: Some(Industry::Restaurant),
                business_size: Some(BusinessSize::Medium),
                sells_products: true,
                offers_services: false,
                has_physical_store: true,
                has_employees: true,
                online_sales: OnlineSales::Planning,
                pain_points: BTreeSet::from([PainPoint::Staffing, PainPoint::Inventory]),
                goals: BTreeSet::from([Goal::Efficiency, Goal::Customers]),
            },
        },
        Preset {
            name: "consulting",
            label: "Consulting Practice",
            answers: Answers {
                business_name: "Consulting Practice".to_string(),
                industry: Some(Industry::Services),
                business_size: Some(BusinessSize::Solo),
                sells_products: false,
                offers_services: true,
                has_physical_store: false,
                has_employees: false,
                online_sales: OnlineSales::No,
                pain_points: BTreeSet::from([PainPoint::Invoicing, PainPoint::Scheduling]),
                goals: BTreeSet::from([Goal::Customers, Goal::Growth]),
            },
        },
        Preset {
            name: "online-shop",
            label: "Online Shop",
            answers: Answers {
                business_name: "Online Shop".to_string(),
                industry: Some(Industry::Ecommerce),
                business_size: Some(BusinessSize::Small),
                sells_products: true,
                offers_services: false,
                has_physical_store: false,
                has_employees: false,
                online_sales: OnlineSales::Yes,
                pain_points: BTreeSet::from([PainPoint::Inventory, PainPoint::Marketing]),
                goals: BTreeSet::from([Goal::Online, Goal::Sales]),
            },
        },
        Preset {
            name: "solo-maker",
            label: "Solo Maker",
            answers: Answers {
                business_name: "Solo Maker".to_string(),
                industry: Some(Industry::Manufacturing),
                business_size: Some(BusinessSize::Solo),
                sells_products: true,
                offers_services: false,
                has_physical_store: false,
                has_employees: false,
                online_sales: OnlineSales::Planning,
                pain_points: BTreeSet::from([PainPoint::Cashflow]),
                goals: BTreeSet::from([Goal::Online]),
            },
        },
    ]
}

pub fn find(name: &str) -> Result<Preset> {
    all()
        .into_iter()
        .find(|p| p.name == name)
        .ok_or_else(|| OnboardError::UnknownPreset {
            name: name.to_string(),
        })
}
