//! Application configuration, built from environment variables.

use std::path::PathBuf;

/// Top-level service configuration.
///
/// Every field has a sensible default so a bare `proposal-assist` starts in
/// a development setup; production deployments override via environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Directory of JSON service pricing files.
    pub catalog_dir: PathBuf,
    /// Path to the libSQL lead database.
    pub db_path: PathBuf,
    /// Directory rendered proposal documents are written to.
    pub output_dir: PathBuf,
    /// Directory uploaded resumes are written to.
    pub resume_dir: PathBuf,
    /// Company name used in conversation and documents.
    pub company_name: String,
    /// Support address quoted in the conversation.
    pub support_email: String,
    /// Contact details printed in the client document footer.
    pub company_email: String,
    pub company_phone: String,
    /// Internal address that receives sales lead summaries.
    pub sales_email: String,
}

impl AppConfig {
    /// Build from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let company_name =
            std::env::var("COMPANY_NAME").unwrap_or_else(|_| "Clearpath Digital".to_string());
        let support_email = std::env::var("SUPPORT_EMAIL")
            .unwrap_or_else(|_| "sales@clearpathdigital.example".to_string());
        let company_email =
            std::env::var("COMPANY_EMAIL").unwrap_or_else(|_| support_email.clone());
        let sales_email = std::env::var("SALES_EMAIL").unwrap_or_else(|_| support_email.clone());
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            catalog_dir: env_path("CATALOG_DIR", "./catalog"),
            db_path: env_path("DB_PATH", "./data/proposal-assist.db"),
            output_dir: env_path("PROPOSALS_DIR", "./proposals"),
            resume_dir: env_path("RESUMES_DIR", "./resumes"),
            company_name,
            support_email,
            company_email,
            company_phone: std::env::var("COMPANY_PHONE")
                .unwrap_or_else(|_| "+1 555 0100".to_string()),
            sales_email,
        }
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
