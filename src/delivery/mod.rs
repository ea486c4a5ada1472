//! Outbound delivery — SMTP via lettre, one document attachment per message.
//!
//! Failures are reported to the pipeline, which logs them and carries on;
//! there is no retry. The transport is rebuilt per send.

use std::path::Path;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::error::DeliveryError;

/// Sends a rendered document to a recipient.
#[async_trait]
pub trait Deliverer: Send + Sync {
    async fn send_document(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachment: &Path,
    ) -> Result<(), DeliveryError>;
}

/// Deliverer used when SMTP is not configured: every send fails with
/// `NotConfigured`, which the pipeline logs as a delivery failure.
pub struct DisabledDeliverer;

#[async_trait]
impl Deliverer for DisabledDeliverer {
    async fn send_document(
        &self,
        to: &str,
        _subject: &str,
        _body: &str,
        _attachment: &Path,
    ) -> Result<(), DeliveryError> {
        tracing::warn!(to, "Delivery is not configured; document not sent");
        Err(DeliveryError::NotConfigured)
    }
}

/// SMTP configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    /// Internal address that receives the sales lead summary.
    pub sales_address: String,
}

impl MailerConfig {
    /// Build config from environment variables.
    /// Returns `None` if `SMTP_HOST` is not set (delivery disabled).
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        let smtp_port: u16 = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);
        let username = std::env::var("SMTP_USERNAME").unwrap_or_default();
        let password = std::env::var("SMTP_PASSWORD").unwrap_or_default();
        let from_address =
            std::env::var("SMTP_FROM_ADDRESS").unwrap_or_else(|_| username.clone());
        let sales_address =
            std::env::var("SALES_EMAIL").unwrap_or_else(|_| from_address.clone());
        Some(Self {
            smtp_host,
            smtp_port,
            username,
            password,
            from_address,
            sales_address,
        })
    }
}

/// SMTP mailer.
pub struct SmtpMailer {
    config: MailerConfig,
}

impl SmtpMailer {
    pub fn new(config: MailerConfig) -> Self {
        Self { config }
    }

    pub fn sales_address(&self) -> &str {
        &self.config.sales_address
    }
}

/// Build the outbound message: plain-text body plus one document attachment.
fn build_message(
    from: &str,
    to: &str,
    subject: &str,
    body: &str,
    attachment_name: &str,
    attachment_bytes: Vec<u8>,
) -> Result<Message, DeliveryError> {
    let from = from.parse().map_err(|e| DeliveryError::InvalidAddress {
        address: from.to_string(),
        reason: format!("{e}"),
    })?;
    let to_parsed = to.parse().map_err(|e| DeliveryError::InvalidAddress {
        address: to.to_string(),
        reason: format!("{e}"),
    })?;
    let content_type = ContentType::parse("text/markdown; charset=utf-8")
        .unwrap_or(ContentType::TEXT_PLAIN);
    let attachment = Attachment::new(attachment_name.to_string()).body(attachment_bytes, content_type);

    Message::builder()
        .from(from)
        .to(to_parsed)
        .subject(subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body.to_string()))
                .singlepart(attachment),
        )
        .map_err(|e| DeliveryError::Build(e.to_string()))
}

#[async_trait]
impl Deliverer for SmtpMailer {
    async fn send_document(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachment: &Path,
    ) -> Result<(), DeliveryError> {
        let bytes = tokio::fs::read(attachment)
            .await
            .map_err(|e| DeliveryError::Attachment {
                path: attachment.display().to_string(),
                reason: e.to_string(),
            })?;
        let attachment_name = attachment
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("proposal.md")
            .to_string();

        let message = build_message(
            &self.config.from_address,
            to,
            subject,
            body,
            &attachment_name,
            bytes,
        )?;

        let config = self.config.clone();
        let to_logged = to.to_string();
        tokio::task::spawn_blocking(move || {
            let transport = SmtpTransport::relay(&config.smtp_host)
                .map_err(|e| DeliveryError::Send(format!("relay setup: {e}")))?
                .port(config.smtp_port)
                .credentials(Credentials::new(config.username, config.password))
                .build();
            transport
                .send(&message)
                .map_err(|e| DeliveryError::Send(e.to_string()))?;
            Ok::<_, DeliveryError>(())
        })
        .await
        .map_err(|e| DeliveryError::Send(format!("send task failed: {e}")))??;

        tracing::info!(to = %to_logged, "Document delivered");
        Ok(())
    }
}
