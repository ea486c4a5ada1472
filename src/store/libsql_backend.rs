//! libSQL backend — async `LeadStore` implementation.
//!
//! A single connection is reused for all operations; `libsql::Connection`
//! is safe for concurrent async use.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{params, Connection, Database as LibSqlDatabase};
use tracing::info;
use uuid::Uuid;

use crate::dialog::Session;
use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{LeadStore, StoredLead};

/// libSQL lead store.
pub struct LibSqlLeadStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlLeadStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Connection(format!("Failed to open database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Connection(format!("Failed to connect: {e}")))?;
        let store = Self {
            db: Arc::new(db),
            conn,
        };
        migrations::run_migrations(&store.conn).await?;
        info!(path = %path.display(), "Lead store opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Connection(format!("Failed to create in-memory database: {e}"))
            })?;
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Connection(format!("Failed to connect: {e}")))?;
        let store = Self {
            db: Arc::new(db),
            conn,
        };
        migrations::run_migrations(&store.conn).await?;
        Ok(store)
    }
}

/// Parse an RFC 3339 timestamp written by this store.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[async_trait]
impl LeadStore for LibSqlLeadStore {
    async fn upsert_lead(&self, email: &str, session: &Session) -> Result<(), DatabaseError> {
        let snapshot = serde_json::to_string(session)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO leads (email, session, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3)
                 ON CONFLICT(email) DO UPDATE SET
                     session = excluded.session,
                     updated_at = excluded.updated_at",
                params![email, snapshot, now],
            )
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(())
    }

    async fn get_lead(&self, email: &str) -> Result<Option<StoredLead>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                "SELECT email, session, created_at, updated_at FROM leads WHERE email = ?1",
                params![email],
            )
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?
        else {
            return Ok(None);
        };

        let email: String = row.get(0).map_err(|e| DatabaseError::Query(e.to_string()))?;
        let snapshot: String = row.get(1).map_err(|e| DatabaseError::Query(e.to_string()))?;
        let created: String = row.get(2).map_err(|e| DatabaseError::Query(e.to_string()))?;
        let updated: String = row.get(3).map_err(|e| DatabaseError::Query(e.to_string()))?;
        let session: Session = serde_json::from_str(&snapshot)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;

        Ok(Some(StoredLead {
            email,
            session,
            created_at: parse_datetime(&created),
            updated_at: parse_datetime(&updated),
        }))
    }

    async fn record_resume(&self, email: &str, filename: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO resumes (id, email, filename, uploaded_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    Uuid::new_v4().to_string(),
                    email,
                    filename,
                    Utc::now().to_rfc3339()
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_creates_then_overwrites() {
        let store = LibSqlLeadStore::new_memory().await.unwrap();
        let mut session = Session {
            name: Some("Jane".into()),
            email: Some("jane@example.com".into()),
            ..Default::default()
        };
        store.upsert_lead("jane@example.com", &session).await.unwrap();

        let lead = store.get_lead("jane@example.com").await.unwrap().unwrap();
        assert_eq!(lead.session.name.as_deref(), Some("Jane"));
        assert!(lead.session.company.is_none());

        session.company = Some("Acme Pty".into());
        store.upsert_lead("jane@example.com", &session).await.unwrap();

        let lead = store.get_lead("jane@example.com").await.unwrap().unwrap();
        assert_eq!(lead.session.company.as_deref(), Some("Acme Pty"));
        assert!(lead.created_at <= lead.updated_at);
    }

    #[tokio::test]
    async fn missing_lead_is_none() {
        let store = LibSqlLeadStore::new_memory().await.unwrap();
        assert!(store.get_lead("ghost@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let store = LibSqlLeadStore::new_memory().await.unwrap();
        migrations::run_migrations(&store.conn).await.unwrap();
        migrations::run_migrations(&store.conn).await.unwrap();
    }

    #[tokio::test]
    async fn resumes_are_recorded() {
        let store = LibSqlLeadStore::new_memory().await.unwrap();
        store
            .record_resume("jane@example.com", "cv.pdf")
            .await
            .unwrap();
        store
            .record_resume("jane@example.com", "cv-v2.pdf")
            .await
            .unwrap();
    }
}
