//! The proposal assembly pipeline.
//!
//! Step order: resolve data source → persist lead → compute costs →
//! generate narrative → render both documents → deliver both documents.
//! Catalog misses and narrative failures recover locally; persistence,
//! rendering, and a total delivery blackout are pipeline-fatal and surface
//! to the executor, never to the end user.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::catalog::{Catalog, CatalogEntry, DEFAULT_SUB_CATEGORY};
use crate::currency::CurrencyTable;
use crate::delivery::Deliverer;
use crate::dialog::Session;
use crate::error::PipelineError;
use crate::generator::{ContentGenerator, CustomEstimate, ProposalNarrative};
use crate::pricing;
use crate::render::DocumentRenderer;
use crate::store::LeadStore;

/// Delivery presentation settings.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub company_name: String,
    /// Internal address that receives the sales lead summary.
    pub sales_address: String,
}

/// Orchestrates one proposal run end to end.
pub struct ProposalPipeline {
    catalog: Arc<Catalog>,
    currencies: Arc<CurrencyTable>,
    generator: Arc<dyn ContentGenerator>,
    renderer: Arc<dyn DocumentRenderer>,
    deliverer: Arc<dyn Deliverer>,
    store: Arc<dyn LeadStore>,
    config: PipelineConfig,
}

impl ProposalPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: Arc<Catalog>,
        currencies: Arc<CurrencyTable>,
        generator: Arc<dyn ContentGenerator>,
        renderer: Arc<dyn DocumentRenderer>,
        deliverer: Arc<dyn Deliverer>,
        store: Arc<dyn LeadStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            catalog,
            currencies,
            generator,
            renderer,
            deliverer,
            store,
            config,
        }
    }

    /// Generate and deliver the proposal for a confirmed session.
    pub async fn generate(
        &self,
        mut session: Session,
        category: String,
        custom_category_name: Option<String>,
        custom_category_data: Option<CustomEstimate>,
    ) -> Result<(), PipelineError> {
        // Step 1: resolve the data source.
        let entry = match (custom_category_name, custom_category_data) {
            (Some(name), Some(data)) => {
                session.category = Some(name);
                data.into()
            }
            _ => {
                if session.category.is_none() {
                    session.category = Some(category.clone());
                }
                self.resolve_catalog_entry(&session, &category)
            }
        };

        // Step 2: persist the lead under its email (create-or-update).
        let email = session
            .email
            .clone()
            .ok_or(PipelineError::MissingField("email"))?;
        self.store.upsert_lead(&email, &session).await?;

        // Step 3: compute the cost breakdown.
        let country = session
            .country
            .clone()
            .ok_or(PipelineError::MissingField("country"))?;
        let profile = self
            .currencies
            .resolve(&country)
            .ok_or_else(|| PipelineError::UnknownCountry(country.clone()))?
            .clone();
        let size_label = session.company_size.clone().unwrap_or_default();
        let costs = pricing::compute(&entry, &profile, &size_label);

        // Step 4: narrative text, with a local fallback.
        let display_name = session
            .project_name()
            .unwrap_or(entry.category.as_str())
            .to_string();
        let narrative = match self.generator.narrative(&entry, &display_name).await {
            Ok(narrative) => narrative,
            Err(e) => {
                warn!(project = %display_name, error = %e, "Narrative generation failed; using fallback");
                ProposalNarrative::fallback(&display_name)
            }
        };

        // Step 5: render both documents.
        let client_doc = self.renderer.render_client(&session, &narrative, &costs).await?;
        let sales_doc = self.renderer.render_sales(&session, &costs).await?;

        // Step 6: deliver both, independently.
        let client_subject = format!(
            "Your Personalized Proposal from {} for {display_name}",
            self.config.company_name
        );
        let client_body = format!(
            "Dear {},\n\nAs requested, please find your detailed project proposal \
             attached.\n\nBest Regards,\nThe {} Team",
            session.name.as_deref().unwrap_or("client"),
            self.config.company_name
        );
        let client_result = self
            .deliverer
            .send_document(&email, &client_subject, &client_body, &client_doc.path)
            .await;
        if let Err(ref e) = client_result {
            error!(to = %email, error = %e, "Client proposal delivery failed");
        }

        let sales_subject = format!(
            "New Chatbot Lead: {} - {display_name}",
            session.company.as_deref().unwrap_or("N/A")
        );
        let sales_body = "A new lead has been generated by the chatbot. Please find the \
                          summary attached."
            .to_string();
        let sales_result = self
            .deliverer
            .send_document(
                &self.config.sales_address,
                &sales_subject,
                &sales_body,
                &sales_doc.path,
            )
            .await;
        if let Err(ref e) = sales_result {
            error!(to = %self.config.sales_address, error = %e, "Sales notification delivery failed");
        }

        match (client_result, sales_result) {
            (Err(client), Err(sales)) => Err(PipelineError::AllDeliveriesFailed {
                client: client.to_string(),
                sales: sales.to_string(),
            }),
            _ => {
                info!(
                    lead = %email,
                    project = %display_name,
                    total = %costs.final_total_display,
                    "Proposal run complete"
                );
                Ok(())
            }
        }
    }

    /// Catalog lookup with the zero-cost placeholder on a miss.
    fn resolve_catalog_entry(&self, session: &Session, category: &str) -> CatalogEntry {
        let main_service = session.main_service.as_deref().unwrap_or("");
        let sub_category = session
            .sub_category
            .as_deref()
            .unwrap_or(DEFAULT_SUB_CATEGORY);
        match self.catalog.lookup(main_service, sub_category, category) {
            Some(entry) => entry.clone(),
            None => {
                warn!(
                    main_service,
                    sub_category, category, "Catalog miss; using zero-cost placeholder"
                );
                CatalogEntry::custom_requirement()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use super::*;
    use crate::catalog::test_fixtures::sample_catalog;
    use crate::dialog::CUSTOM_SERVICE;
    use crate::error::{DeliveryError, GeneratorError};
    use crate::render::{MarkdownRenderer, RenderConfig};
    use crate::store::LibSqlLeadStore;

    struct StubGenerator {
        narrative_ok: bool,
    }

    #[async_trait::async_trait]
    impl ContentGenerator for StubGenerator {
        async fn narrative(
            &self,
            _entry: &CatalogEntry,
            display_name: &str,
        ) -> Result<ProposalNarrative, GeneratorError> {
            if self.narrative_ok {
                Ok(ProposalNarrative {
                    introduction: format!("A tailored plan for {display_name}."),
                    scope_of_work: Vec::new(),
                })
            } else {
                Err(GeneratorError::RequestFailed("stub outage".into()))
            }
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

    #[derive(Default)]
    struct RecordingDeliverer {
        sent: Mutex<Vec<(String, String, PathBuf)>>,
        fail_addresses: Vec<String>,
    }

    #[async_trait::async_trait]
    impl Deliverer for RecordingDeliverer {
        async fn send_document(
            &self,
            to: &str,
            subject: &str,
            _body: &str,
            attachment: &Path,
        ) -> Result<(), DeliveryError> {
            if self.fail_addresses.iter().any(|a| a == to) {
                return Err(DeliveryError::Send(format!("refused for {to}")));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string(), attachment.to_path_buf()));
            Ok(())
        }
    }

    struct Fixture {
        pipeline: ProposalPipeline,
        deliverer: Arc<RecordingDeliverer>,
        store: Arc<LibSqlLeadStore>,
        _tmp: tempfile::TempDir,
    }

    async fn fixture(narrative_ok: bool, fail_addresses: Vec<String>) -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let deliverer = Arc::new(RecordingDeliverer {
            sent: Mutex::new(Vec::new()),
            fail_addresses,
        });
        let store = Arc::new(LibSqlLeadStore::new_memory().await.unwrap());
        let pipeline = ProposalPipeline::new(
            Arc::new(sample_catalog()),
            Arc::new(CurrencyTable::builtin()),
            Arc::new(StubGenerator { narrative_ok }),
            Arc::new(MarkdownRenderer::new(RenderConfig {
                output_dir: tmp.path().to_path_buf(),
                company_email: "hello@clearpathdigital.example".into(),
                company_phone: "+1 555 0100".into(),
            })),
            Arc::clone(&deliverer) as Arc<dyn Deliverer>,
            Arc::clone(&store) as Arc<dyn LeadStore>,
            PipelineConfig {
                company_name: "Clearpath Digital".into(),
                sales_address: "leads@clearpathdigital.example".into(),
            },
        );
        Fixture {
            pipeline,
            deliverer,
            store,
            _tmp: tmp,
        }
    }

    fn confirmed_session() -> Session {
        Session {
            name: Some("Jane Doe".into()),
            email: Some("jane@example.com".into()),
            phone: Some("+14155550123".into()),
            country: Some("United States".into()),
            company: Some("Acme Pty".into()),
            company_size: Some("0-10".into()),
            budget: Some("$1,200 - $4,800".into()),
            main_service: Some("Web Development".into()),
            category: Some("Corporate Website".into()),
            description: Some("Needs a careers page.".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn full_run_delivers_both_documents_and_persists_the_lead() {
        let f = fixture(true, Vec::new()).await;
        f.pipeline
            .generate(confirmed_session(), "Corporate Website".into(), None, None)
            .await
            .unwrap();

        let sent = f.deliverer.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, "jane@example.com");
        assert!(sent[0].1.contains("Your Personalized Proposal"));
        assert_eq!(sent[1].0, "leads@clearpathdigital.example");
        assert!(sent[1].1.contains("New Chatbot Lead: Acme Pty"));

        let client_doc = std::fs::read_to_string(&sent[0].2).unwrap();
        assert!(client_doc.contains("$3,960"));
        assert!(client_doc.contains("A tailored plan for Corporate Website."));

        let lead = f.store.get_lead("jane@example.com").await.unwrap().unwrap();
        assert_eq!(lead.session.company.as_deref(), Some("Acme Pty"));
    }

    #[tokio::test]
    async fn catalog_miss_uses_the_placeholder_and_names_the_custom_category() {
        let f = fixture(true, Vec::new()).await;
        let mut session = confirmed_session();
        session.category = Some(CUSTOM_SERVICE.into());
        session.custom_category_name = Some("Space Hotel Portal".into());

        f.pipeline
            .generate(session, CUSTOM_SERVICE.into(), None, None)
            .await
            .unwrap();

        let sent = f.deliverer.sent.lock().unwrap().clone();
        let sales_doc = std::fs::read_to_string(&sent[1].2).unwrap();
        assert!(sales_doc.contains("Others (Space Hotel Portal)"));
        // Zero-cost placeholder: everything is $0.
        assert!(sales_doc.contains("**Estimated Total:** $0"));
    }

    #[tokio::test]
    async fn custom_estimate_overrides_the_catalog() {
        let f = fixture(true, Vec::new()).await;
        let estimate: CustomEstimate = serde_json::from_value(serde_json::json!({
            "category": "Space Hotel Portal",
            "core_modules": "Bookings, Tours",
            "ui_ux_cost_inr": 100000,
            "frontend_cost_inr": 150000,
            "backend_cost_inr": 200000,
            "qa_cost_inr": 50000,
            "pm_cost_inr": 50000,
            "optional_addons_cost_inr": 0,
            "avg_cost_inr": 550000
        }))
        .unwrap();
        let mut session = confirmed_session();
        session.category = Some("Others".into());

        f.pipeline
            .generate(
                session,
                "Others".into(),
                Some("Space Hotel Portal".into()),
                Some(estimate),
            )
            .await
            .unwrap();

        let lead = f.store.get_lead("jane@example.com").await.unwrap().unwrap();
        assert_eq!(lead.session.category.as_deref(), Some("Space Hotel Portal"));

        let sent = f.deliverer.sent.lock().unwrap().clone();
        let client_doc = std::fs::read_to_string(&sent[0].2).unwrap();
        assert!(client_doc.contains("$3,960"));
    }

    #[tokio::test]
    async fn narrative_failure_falls_back_instead_of_aborting() {
        let f = fixture(false, Vec::new()).await;
        f.pipeline
            .generate(confirmed_session(), "Corporate Website".into(), None, None)
            .await
            .unwrap();
        let sent = f.deliverer.sent.lock().unwrap().clone();
        let client_doc = std::fs::read_to_string(&sent[0].2).unwrap();
        assert!(client_doc.contains("Thank you for your interest in Corporate Website."));
    }

    #[tokio::test]
    async fn one_failed_delivery_does_not_fail_the_run() {
        let f = fixture(true, vec!["jane@example.com".into()]).await;
        f.pipeline
            .generate(confirmed_session(), "Corporate Website".into(), None, None)
            .await
            .unwrap();
        let sent = f.deliverer.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "leads@clearpathdigital.example");
    }

    #[tokio::test]
    async fn both_deliveries_failing_is_pipeline_fatal() {
        let f = fixture(
            true,
            vec![
                "jane@example.com".into(),
                "leads@clearpathdigital.example".into(),
            ],
        )
        .await;
        let result = f
            .pipeline
            .generate(confirmed_session(), "Corporate Website".into(), None, None)
            .await;
        assert!(matches!(
            result,
            Err(PipelineError::AllDeliveriesFailed { .. })
        ));
    }

    #[tokio::test]
    async fn missing_email_is_fatal() {
        let f = fixture(true, Vec::new()).await;
        let mut session = confirmed_session();
        session.email = None;
        let result = f
            .pipeline
            .generate(session, "Corporate Website".into(), None, None)
            .await;
        assert!(matches!(result, Err(PipelineError::MissingField("email"))));
    }

    #[tokio::test]
    async fn unknown_country_is_fatal() {
        let f = fixture(true, Vec::new()).await;
        let mut session = confirmed_session();
        session.country = Some("Atlantis".into());
        let result = f
            .pipeline
            .generate(session, "Corporate Website".into(), None, None)
            .await;
        assert!(matches!(result, Err(PipelineError::UnknownCountry(_))));
    }
}
