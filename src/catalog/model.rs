//! Catalog entry model — one priced service offering.

use rust_decimal::Decimal;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

/// Sub-category key used when a service has no sub-categories.
pub const DEFAULT_SUB_CATEGORY: &str = "_default";

/// Category name substituted when a lookup misses entirely.
pub const CUSTOM_REQUIREMENT: &str = "Custom Requirement";

/// One priced service offering with its six INR cost components.
///
/// Cost fields tolerate missing, empty or non-numeric source values by
/// defaulting to zero; a half-filled pricing sheet still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub category: String,
    #[serde(default)]
    pub project_overview: String,
    #[serde(default)]
    pub core_modules: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub ui_ux_cost_inr: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub frontend_cost_inr: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub backend_cost_inr: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub qa_cost_inr: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub pm_cost_inr: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub optional_addons_cost_inr: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub avg_cost_inr: Decimal,
}

impl CatalogEntry {
    /// The six cost components in presentation order, with their labels.
    pub fn components(&self) -> [(&'static str, Decimal); 6] {
        [
            ("UI/UX Design", self.ui_ux_cost_inr),
            ("Frontend Development", self.frontend_cost_inr),
            ("Backend Development", self.backend_cost_inr),
            ("Testing & QA", self.qa_cost_inr),
            ("Project Management", self.pm_cost_inr),
            ("Optional Add-ons", self.optional_addons_cost_inr),
        ]
    }

    /// Zero-cost placeholder used when a catalog lookup misses.
    pub fn custom_requirement() -> Self {
        Self {
            category: CUSTOM_REQUIREMENT.to_string(),
            project_overview: "A custom digital solution.".to_string(),
            core_modules: "Core functionality as per client requirements.".to_string(),
            ui_ux_cost_inr: Decimal::ZERO,
            frontend_cost_inr: Decimal::ZERO,
            backend_cost_inr: Decimal::ZERO,
            qa_cost_inr: Decimal::ZERO,
            pm_cost_inr: Decimal::ZERO,
            optional_addons_cost_inr: Decimal::ZERO,
            avg_cost_inr: Decimal::ZERO,
        }
    }
}

/// Raw catalog record as it appears in a service pricing file.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRecord {
    #[serde(default)]
    pub main_service: String,
    #[serde(default)]
    pub sub_category: String,
    #[serde(default)]
    pub category: String,
    #[serde(flatten)]
    pub entry: RecordCosts,
}

/// Cost and description columns of a raw record.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordCosts {
    #[serde(default)]
    pub project_overview: String,
    #[serde(default)]
    pub core_modules: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub ui_ux_cost_inr: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub frontend_cost_inr: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub backend_cost_inr: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub qa_cost_inr: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub pm_cost_inr: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub optional_addons_cost_inr: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub avg_cost_inr: Decimal,
}

/// Accept a number, a numeric string, or garbage; garbage becomes zero.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(decimal_from_value(&value))
}

fn decimal_from_value(value: &serde_json::Value) -> Decimal {
    match value {
        serde_json::Value::Number(n) => parse_decimal(&n.to_string()),
        serde_json::Value::String(s) => parse_decimal(s),
        _ => Decimal::ZERO,
    }
}

fn parse_decimal(s: &str) -> Decimal {
    let trimmed = s.trim().replace(',', "");
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    trimmed
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&trimmed))
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn lenient_costs_default_to_zero() {
        let entry: CatalogEntry = serde_json::from_value(serde_json::json!({
            "category": "CRM Platform",
            "ui_ux_cost_inr": 100000,
            "frontend_cost_inr": "150000",
            "backend_cost_inr": "not a number",
            "qa_cost_inr": null,
            "avg_cost_inr": "2,50,000",
        }))
        .unwrap();
        assert_eq!(entry.ui_ux_cost_inr, dec!(100000));
        assert_eq!(entry.frontend_cost_inr, dec!(150000));
        assert_eq!(entry.backend_cost_inr, Decimal::ZERO);
        assert_eq!(entry.qa_cost_inr, Decimal::ZERO);
        assert_eq!(entry.pm_cost_inr, Decimal::ZERO);
        assert_eq!(entry.optional_addons_cost_inr, Decimal::ZERO);
    }

    #[test]
    fn components_are_in_presentation_order() {
        let entry = CatalogEntry {
            category: "x".into(),
            project_overview: String::new(),
            core_modules: String::new(),
            ui_ux_cost_inr: dec!(1),
            frontend_cost_inr: dec!(2),
            backend_cost_inr: dec!(3),
            qa_cost_inr: dec!(4),
            pm_cost_inr: dec!(5),
            optional_addons_cost_inr: dec!(6),
            avg_cost_inr: dec!(15),
        };
        let labels: Vec<&str> = entry.components().iter().map(|(l, _)| *l).collect();
        assert_eq!(
            labels,
            vec![
                "UI/UX Design",
                "Frontend Development",
                "Backend Development",
                "Testing & QA",
                "Project Management",
                "Optional Add-ons"
            ]
        );
    }

    #[test]
    fn custom_requirement_placeholder_is_zero_cost() {
        let placeholder = CatalogEntry::custom_requirement();
        assert_eq!(placeholder.category, CUSTOM_REQUIREMENT);
        assert!(placeholder.components().iter().all(|(_, c)| c.is_zero()));
    }
}
