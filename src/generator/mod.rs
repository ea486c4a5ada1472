//! Content generation — narrative text, free-form answers, custom estimates.
//!
//! The rest of the crate only sees the [`ContentGenerator`] trait; the
//! default implementation speaks to an OpenAI-compatible chat-completions
//! endpoint. Every caller has a local fallback, so a generator failure never
//! takes down a conversation or a pipeline run.

mod client;

pub use client::OpenAiCompatGenerator;

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogEntry;
use crate::error::GeneratorError;

/// One module in the proposal's scope of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeItem {
    pub title: String,
    pub description: String,
}

/// Generated narrative for a client proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalNarrative {
    pub introduction: String,
    #[serde(default)]
    pub scope_of_work: Vec<ScopeItem>,
}

impl ProposalNarrative {
    /// Minimal fallback used when generation fails or returns nothing.
    pub fn fallback(display_name: &str) -> Self {
        Self {
            introduction: format!(
                "Thank you for your interest in {display_name}. This proposal outlines \
                 the estimated scope and investment for your project; our team will \
                 follow up with a detailed walkthrough."
            ),
            scope_of_work: Vec::new(),
        }
    }
}

/// Generator-produced cost estimate for a custom service request.
///
/// Shares the catalog entry's cost shape so the pipeline can price it the
/// same way; the aggregate excludes optional add-ons by contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEstimate {
    pub category: String,
    #[serde(default)]
    pub project_overview: String,
    #[serde(default)]
    pub core_modules: String,
    #[serde(default, deserialize_with = "crate::catalog::lenient_decimal")]
    pub ui_ux_cost_inr: Decimal,
    #[serde(default, deserialize_with = "crate::catalog::lenient_decimal")]
    pub frontend_cost_inr: Decimal,
    #[serde(default, deserialize_with = "crate::catalog::lenient_decimal")]
    pub backend_cost_inr: Decimal,
    #[serde(default, deserialize_with = "crate::catalog::lenient_decimal")]
    pub qa_cost_inr: Decimal,
    #[serde(default, deserialize_with = "crate::catalog::lenient_decimal")]
    pub pm_cost_inr: Decimal,
    #[serde(default, deserialize_with = "crate::catalog::lenient_decimal")]
    pub optional_addons_cost_inr: Decimal,
    #[serde(default, deserialize_with = "crate::catalog::lenient_decimal")]
    pub avg_cost_inr: Decimal,
}

impl From<CustomEstimate> for CatalogEntry {
    fn from(e: CustomEstimate) -> Self {
        CatalogEntry {
            category: e.category,
            project_overview: e.project_overview,
            core_modules: e.core_modules,
            ui_ux_cost_inr: e.ui_ux_cost_inr,
            frontend_cost_inr: e.frontend_cost_inr,
            backend_cost_inr: e.backend_cost_inr,
            qa_cost_inr: e.qa_cost_inr,
            pm_cost_inr: e.pm_cost_inr,
            optional_addons_cost_inr: e.optional_addons_cost_inr,
            avg_cost_inr: e.avg_cost_inr,
        }
    }
}

/// External natural-language content generator.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Write the proposal narrative for a resolved catalog entry.
    async fn narrative(
        &self,
        entry: &CatalogEntry,
        display_name: &str,
    ) -> Result<ProposalNarrative, GeneratorError>;

    /// Answer a free-form question grounded in the company context.
    async fn general_answer(&self, query: &str) -> Result<String, GeneratorError>;

    /// Estimate costs for a custom service request, few-shot from examples.
    async fn estimate_custom(
        &self,
        service_name: &str,
        main_service: &str,
        examples: &[&CatalogEntry],
    ) -> Result<CustomEstimate, GeneratorError>;
}

/// Generator used when no API key is configured: every call reports
/// `NotConfigured`, which callers downgrade to their local fallbacks.
pub struct DisabledGenerator;

#[async_trait]
impl ContentGenerator for DisabledGenerator {
    async fn narrative(
        &self,
        _entry: &CatalogEntry,
        _display_name: &str,
    ) -> Result<ProposalNarrative, GeneratorError> {
        Err(GeneratorError::NotConfigured)
    }

    async fn general_answer(&self, _query: &str) -> Result<String, GeneratorError> {
        Err(GeneratorError::NotConfigured)
    }

    async fn estimate_custom(
        &self,
        _service_name: &str,
        _main_service: &str,
        _examples: &[&CatalogEntry],
    ) -> Result<CustomEstimate, GeneratorError> {
        Err(GeneratorError::NotConfigured)
    }
}

/// Generator configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub api_key: SecretString,
    pub model: String,
    /// Grounding context for general answers (company information text).
    pub company_context: String,
}

impl GeneratorConfig {
    /// Build from environment. Returns `None` when `GENERATOR_API_KEY` is
    /// unset (generation disabled; callers fall back everywhere).
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GENERATOR_API_KEY").ok()?;
        let base_url = std::env::var("GENERATOR_BASE_URL")
            .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string());
        let model = std::env::var("GENERATOR_MODEL")
            .unwrap_or_else(|_| "llama-3.1-8b-instant".to_string());
        let company_context = std::env::var("COMPANY_INFO_PATH")
            .ok()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .unwrap_or_default();
        Some(Self {
            base_url,
            api_key: SecretString::from(api_key),
            model,
            company_context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fallback_narrative_mentions_the_project() {
        let narrative = ProposalNarrative::fallback("Wallet App");
        assert!(narrative.introduction.contains("Wallet App"));
        assert!(narrative.scope_of_work.is_empty());
    }

    #[test]
    fn custom_estimate_parses_lenient_costs() {
        let estimate: CustomEstimate = serde_json::from_value(serde_json::json!({
            "category": "Drone Fleet Dashboard",
            "project_overview": "Telemetry dashboard.",
            "core_modules": "Map, Alerts, Reports",
            "ui_ux_cost_inr": 80000,
            "frontend_cost_inr": "120000",
            "backend_cost_inr": 160000,
            "qa_cost_inr": "n/a",
            "pm_cost_inr": 40000,
            "optional_addons_cost_inr": 0,
            "avg_cost_inr": 400000
        }))
        .unwrap();
        assert_eq!(estimate.frontend_cost_inr, dec!(120000));
        assert_eq!(estimate.qa_cost_inr, Decimal::ZERO);

        let entry: CatalogEntry = estimate.into();
        assert_eq!(entry.category, "Drone Fleet Dashboard");
        assert_eq!(entry.backend_cost_inr, dec!(160000));
    }

    #[test]
    fn narrative_tolerates_missing_scope() {
        let narrative: ProposalNarrative =
            serde_json::from_str(r#"{"introduction": "Hello."}"#).unwrap();
        assert!(narrative.scope_of_work.is_empty());
    }
}
