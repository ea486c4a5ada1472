use std::sync::Arc;

use proposal_assist::api::{app_routes, AppState};
use proposal_assist::catalog;
use proposal_assist::config::AppConfig;
use proposal_assist::currency::CurrencyTable;
use proposal_assist::delivery::{Deliverer, DisabledDeliverer, MailerConfig, SmtpMailer};
use proposal_assist::dialog::{DialogConfig, DialogEngine};
use proposal_assist::generator::{
    ContentGenerator, DisabledGenerator, GeneratorConfig, OpenAiCompatGenerator,
};
use proposal_assist::pipeline::{PipelineConfig, ProposalPipeline};
use proposal_assist::render::{MarkdownRenderer, RenderConfig};
use proposal_assist::store::{LeadStore, LibSqlLeadStore};
use proposal_assist::worker::BackgroundExecutor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage (SMTP, generator)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env();

    eprintln!("📄 proposal-assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Chat API:     http://{}/chat", config.bind_addr);
    eprintln!("   Generate API: http://{}/generate-proposal", config.bind_addr);

    // ── Catalog ─────────────────────────────────────────────────────────
    let catalog = match catalog::load_dir(&config.catalog_dir) {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            eprintln!(
                "Error: Could not load service catalog from {}: {}",
                config.catalog_dir.display(),
                e
            );
            std::process::exit(1);
        }
    };
    eprintln!("   Catalog: {} services", catalog.main_services().len());

    let currencies = Arc::new(CurrencyTable::builtin());

    // ── Lead store ──────────────────────────────────────────────────────
    let store: Arc<dyn LeadStore> = Arc::new(
        LibSqlLeadStore::new_local(&config.db_path)
            .await
            .unwrap_or_else(|e| {
                eprintln!(
                    "Error: Failed to open lead store at {}: {}",
                    config.db_path.display(),
                    e
                );
                std::process::exit(1);
            }),
    );
    eprintln!("   Lead store: {}", config.db_path.display());

    // ── Content generator ───────────────────────────────────────────────
    let generator: Arc<dyn ContentGenerator> = match GeneratorConfig::from_env() {
        Some(generator_config) => {
            eprintln!("   Generator: enabled (model: {})", generator_config.model);
            Arc::new(OpenAiCompatGenerator::new(generator_config))
        }
        None => {
            eprintln!("   Generator: disabled (set GENERATOR_API_KEY to enable)");
            Arc::new(DisabledGenerator)
        }
    };

    // ── Delivery ────────────────────────────────────────────────────────
    let deliverer: Arc<dyn Deliverer> = match MailerConfig::from_env() {
        Some(mailer_config) => {
            eprintln!(
                "   Delivery: enabled (SMTP: {}, sales: {})",
                mailer_config.smtp_host, mailer_config.sales_address
            );
            Arc::new(SmtpMailer::new(mailer_config))
        }
        None => {
            eprintln!("   Delivery: disabled (set SMTP_HOST to enable)");
            Arc::new(DisabledDeliverer)
        }
    };

    // ── Engine, pipeline, executor ──────────────────────────────────────
    let engine = Arc::new(DialogEngine::new(
        Arc::clone(&catalog),
        Arc::clone(&currencies),
        Arc::clone(&generator),
        DialogConfig {
            company_name: config.company_name.clone(),
            support_email: config.support_email.clone(),
        },
    ));

    let renderer = Arc::new(MarkdownRenderer::new(RenderConfig {
        output_dir: config.output_dir.clone(),
        company_email: config.company_email.clone(),
        company_phone: config.company_phone.clone(),
    }));

    let pipeline = Arc::new(ProposalPipeline::new(
        Arc::clone(&catalog),
        Arc::clone(&currencies),
        Arc::clone(&generator),
        renderer,
        deliverer,
        Arc::clone(&store),
        PipelineConfig {
            company_name: config.company_name.clone(),
            sales_address: config.sales_email.clone(),
        },
    ));

    let executor = Arc::new(BackgroundExecutor::new());

    let state = AppState {
        engine,
        pipeline,
        executor,
        store,
        resume_dir: config.resume_dir.clone(),
    };

    // ── Serve ───────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "Server started");
    axum::serve(listener, app_routes(state)).await?;

    Ok(())
}
