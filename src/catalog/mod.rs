//! Service catalog — the read-only, nested price list.
//!
//! Loaded once at startup and shared immutably; the nesting is
//! main-service → sub-category (or `_default`) → category → entry.

mod loader;
mod model;

pub use loader::load_dir;
pub use model::{
    lenient_decimal, CatalogEntry, CatalogRecord, CUSTOM_REQUIREMENT, DEFAULT_SUB_CATEGORY,
};

use std::collections::BTreeMap;

/// The assembled service catalog.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    services: BTreeMap<String, BTreeMap<String, BTreeMap<String, CatalogEntry>>>,
}

impl Catalog {
    /// Build a catalog from raw records, normalizing keys the way the
    /// pricing sheets need: blank sub-categories collapse to `_default`,
    /// blank categories become "Untitled Category", keys are trimmed.
    pub fn from_records(records: Vec<CatalogRecord>) -> Self {
        let mut services: BTreeMap<String, BTreeMap<String, BTreeMap<String, CatalogEntry>>> =
            BTreeMap::new();
        for record in records {
            let main_service = record.main_service.trim().to_string();
            if main_service.is_empty() {
                continue;
            }
            let sub_category = match record.sub_category.trim() {
                "" | "nan" => DEFAULT_SUB_CATEGORY.to_string(),
                s => s.to_string(),
            };
            let category = match record.category.trim() {
                "" => "Untitled Category".to_string(),
                c => c.to_string(),
            };
            let entry = CatalogEntry {
                category: category.clone(),
                project_overview: record.entry.project_overview,
                core_modules: record.entry.core_modules,
                ui_ux_cost_inr: record.entry.ui_ux_cost_inr,
                frontend_cost_inr: record.entry.frontend_cost_inr,
                backend_cost_inr: record.entry.backend_cost_inr,
                qa_cost_inr: record.entry.qa_cost_inr,
                pm_cost_inr: record.entry.pm_cost_inr,
                optional_addons_cost_inr: record.entry.optional_addons_cost_inr,
                avg_cost_inr: record.entry.avg_cost_inr,
            };
            services
                .entry(main_service)
                .or_default()
                .entry(sub_category)
                .or_default()
                .insert(category, entry);
        }
        Self { services }
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Main service names, sorted.
    pub fn main_services(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    /// Non-default sub-category names under a main service, sorted.
    /// Empty when the service only has `_default` entries.
    pub fn sub_categories(&self, main_service: &str) -> Vec<String> {
        self.services
            .get(main_service)
            .map(|subs| {
                subs.keys()
                    .filter(|k| k.as_str() != DEFAULT_SUB_CATEGORY)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether a main service routes through sub-category selection.
    pub fn has_sub_categories(&self, main_service: &str) -> bool {
        !self.sub_categories(main_service).is_empty()
    }

    /// Category names under a main service + sub-category, sorted.
    pub fn categories(&self, main_service: &str, sub_category: &str) -> Vec<String> {
        self.services
            .get(main_service)
            .and_then(|subs| subs.get(sub_category))
            .map(|cats| cats.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Look up a single entry.
    pub fn lookup(
        &self,
        main_service: &str,
        sub_category: &str,
        category: &str,
    ) -> Option<&CatalogEntry> {
        self.services
            .get(main_service)?
            .get(sub_category)?
            .get(category)
    }

    /// All entries under a main service, across every sub-category.
    /// Used as few-shot examples for custom cost estimation.
    pub fn entries_for_service(&self, main_service: &str) -> Vec<&CatalogEntry> {
        self.services
            .get(main_service)
            .map(|subs| subs.values().flat_map(|cats| cats.values()).collect())
            .unwrap_or_default()
    }
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::sample_catalog;
    use super::*;

    #[test]
    fn groups_by_service_and_sub_category() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.main_services(),
            vec!["App Development", "Web Development"]
        );
        assert_eq!(
            catalog.sub_categories("App Development"),
            vec!["E-commerce"]
        );
        assert!(catalog.has_sub_categories("App Development"));
        assert!(!catalog.has_sub_categories("Web Development"));
    }

    #[test]
    fn blank_sub_category_collapses_to_default() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.categories("Web Development", DEFAULT_SUB_CATEGORY),
            vec!["Corporate Website"]
        );
    }

    #[test]
    fn lookup_miss_is_none() {
        let catalog = sample_catalog();
        assert!(catalog.lookup("App Development", "E-commerce", "Space Elevator").is_none());
        assert!(catalog.lookup("Quantum Consulting", DEFAULT_SUB_CATEGORY, "x").is_none());
    }

    #[test]
    fn entries_for_service_flattens_sub_categories() {
        let catalog = sample_catalog();
        assert_eq!(catalog.entries_for_service("App Development").len(), 2);
        assert_eq!(catalog.entries_for_service("Web Development").len(), 1);
        assert!(catalog.entries_for_service("Nope").is_empty());
    }

    #[test]
    fn blank_category_becomes_untitled() {
        let records: Vec<CatalogRecord> = serde_json::from_value(serde_json::json!([
            {"main_service": "SEO Services", "sub_category": "", "category": "  "}
        ]))
        .unwrap();
        let catalog = Catalog::from_records(records);
        assert_eq!(
            catalog.categories("SEO Services", DEFAULT_SUB_CATEGORY),
            vec!["Untitled Category"]
        );
    }

    #[test]
    fn blank_main_service_is_skipped() {
        let records: Vec<CatalogRecord> = serde_json::from_value(serde_json::json!([
            {"main_service": "", "sub_category": "", "category": "Orphan"}
        ]))
        .unwrap();
        assert!(Catalog::from_records(records).is_empty());
    }
}
