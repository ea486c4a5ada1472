//! Document synthesis — client proposal and sales lead summary.
//!
//! Layout is deliberately plain (markdown): the visual treatment is an
//! interchangeable concern, the section structure and figures are not.
//! Documents are written once per pipeline run and never mutated.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;

use crate::dialog::{Session, CUSTOM_SERVICE, NO_FEATURES};
use crate::error::RenderError;
use crate::generator::ProposalNarrative;
use crate::pricing::CostBreakdown;

/// A rendered artifact on disk.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub path: PathBuf,
    pub filename: String,
}

/// Renders the two proposal documents.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render_client(
        &self,
        session: &Session,
        narrative: &ProposalNarrative,
        costs: &CostBreakdown,
    ) -> Result<RenderedDocument, RenderError>;

    async fn render_sales(
        &self,
        session: &Session,
        costs: &CostBreakdown,
    ) -> Result<RenderedDocument, RenderError>;
}

/// Contact details printed in the client document footer.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub output_dir: PathBuf,
    pub company_email: String,
    pub company_phone: String,
}

/// Markdown renderer writing under a configured output directory.
pub struct MarkdownRenderer {
    config: RenderConfig,
}

impl MarkdownRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    async fn write(&self, filename: String, contents: String) -> Result<RenderedDocument, RenderError> {
        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let path = self.config.output_dir.join(&filename);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| RenderError::Write {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(RenderedDocument { path, filename })
    }
}

/// The project name shown to humans: the custom name in parentheses when the
/// selected category is one of the generic placeholders.
pub fn display_project_name(session: &Session) -> String {
    let category = session.category.as_deref().unwrap_or("N/A");
    match session.custom_category_name.as_deref() {
        Some(custom) if matches!(category, "Others" | CUSTOM_SERVICE) => {
            format!("Others ({custom})")
        }
        _ => category.to_string(),
    }
}

/// File-name slug: spaces and path separators become underscores.
fn slug(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect()
}

fn field(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("- **{label}:** {value}\n"));
}

#[async_trait]
impl DocumentRenderer for MarkdownRenderer {
    async fn render_client(
        &self,
        session: &Session,
        narrative: &ProposalNarrative,
        costs: &CostBreakdown,
    ) -> Result<RenderedDocument, RenderError> {
        let date = Utc::now();
        let mut out = String::new();
        out.push_str("# Personalized Development Proposal\n\n");

        out.push_str("## Client & Project Overview\n\n");
        field(&mut out, "Date", &date.format("%B %d, %Y").to_string());
        field(&mut out, "Company", session.company.as_deref().unwrap_or("N/A"));
        field(&mut out, "Contact Person", session.name.as_deref().unwrap_or("N/A"));
        field(&mut out, "Email", session.email.as_deref().unwrap_or("N/A"));
        field(&mut out, "Contact Phone", session.phone.as_deref().unwrap_or("N/A"));
        field(&mut out, "Project", &display_project_name(session));
        out.push('\n');

        out.push_str("## Introduction\n\n");
        out.push_str(&narrative.introduction);
        out.push_str("\n\n");

        if !narrative.scope_of_work.is_empty() {
            out.push_str("## Scope of Work\n\n");
            for item in &narrative.scope_of_work {
                out.push_str(&format!("### {}\n\n{}\n\n", item.title, item.description));
            }
        }

        out.push_str("## Estimated Cost Breakdown\n\n");
        out.push_str("| Component | Estimated Cost |\n|---|---:|\n");
        for line in &costs.lines {
            out.push_str(&format!("| {} | {} |\n", line.item, line.cost));
        }
        out.push_str(&format!("| **Subtotal** | {} |\n", costs.subtotal_display));
        out.push_str(&format!(
            "| **Volume Discount ({})** | {} |\n",
            costs.discount_rate_display, costs.discount_display
        ));
        out.push_str(&format!(
            "| **Final Estimated Total** | **{}** |\n\n",
            costs.final_total_display
        ));

        out.push_str("## Contact Us to Get Started\n\n");
        out.push_str(&format!("Email: {}\n", self.config.company_email));
        out.push_str(&format!("Phone: {}\n", self.config.company_phone));

        let filename = format!(
            "{}_{}_{}.md",
            slug(session.company.as_deref().unwrap_or("Client")),
            slug(session.category.as_deref().unwrap_or("Proposal")),
            date.format("%Y%m%d"),
        );
        self.write(filename, out).await
    }

    async fn render_sales(
        &self,
        session: &Session,
        costs: &CostBreakdown,
    ) -> Result<RenderedDocument, RenderError> {
        let date = Utc::now();
        let mut out = String::new();
        out.push_str("# New Lead: Client Request Summary\n\n");
        out.push_str(&format!("Generated on: {}\n\n", date.format("%B %d, %Y")));

        out.push_str("## Client & Company Information\n\n");
        field(&mut out, "Contact Person", session.name.as_deref().unwrap_or("N/A"));
        field(&mut out, "Company Name", session.company.as_deref().unwrap_or("N/A"));
        field(&mut out, "Email Address", session.email.as_deref().unwrap_or("N/A"));
        field(&mut out, "Phone Number", session.phone.as_deref().unwrap_or("N/A"));
        field(&mut out, "Company Size", session.company_size.as_deref().unwrap_or("N/A"));
        field(&mut out, "Country", session.country.as_deref().unwrap_or("N/A"));
        out.push('\n');

        out.push_str("## Project Details\n\n");
        field(&mut out, "Service Category", &session.service_path());
        field(&mut out, "Specific Request", &display_project_name(session));
        field(&mut out, "Stated Budget", session.budget.as_deref().unwrap_or("N/A"));
        field(&mut out, "Estimated Total", &costs.final_total_display);
        out.push('\n');

        out.push_str("## Additional Client Notes\n\n");
        out.push_str(&format!(
            "\"{}\"\n",
            session.description.as_deref().unwrap_or(NO_FEATURES)
        ));

        let filename = format!(
            "Lead_Summary_{}_{}.md",
            slug(session.company.as_deref().unwrap_or("Client")),
            date.format("%Y%m%d"),
        );
        self.write(filename, out).await
    }
}

impl MarkdownRenderer {
    /// Where rendered documents land.
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }
}
