//! `LeadStore` trait — the persistence boundary for captured leads.
//!
//! The store is the only serialization point between concurrent pipeline
//! runs: upserts are keyed by email, so two runs for the same lead resolve
//! to last-write-wins on the same row rather than duplicates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::dialog::Session;
use crate::error::DatabaseError;

/// A persisted lead record.
#[derive(Debug, Clone)]
pub struct StoredLead {
    pub email: String,
    /// Full session snapshot at the time of the last upsert.
    pub session: Session,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Backend-agnostic lead persistence.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Create or update the lead for `email` with the full session snapshot.
    async fn upsert_lead(&self, email: &str, session: &Session) -> Result<(), DatabaseError>;

    /// Fetch a lead by email.
    async fn get_lead(&self, email: &str) -> Result<Option<StoredLead>, DatabaseError>;

    /// Record a stored resume file against an email.
    async fn record_resume(&self, email: &str, filename: &str) -> Result<(), DatabaseError>;
}
