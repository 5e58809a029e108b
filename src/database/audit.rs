// ABOUTME: Audit trail persistence operations
// ABOUTME: Append and read only; no update or delete exists for audit entries
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::Database;
use crate::models::{ActorType, AuditAction, AuditLogEntry};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

fn row_to_entry(row: &SqliteRow) -> Result<AuditLogEntry> {
    let id: String = row.try_get("id")?;
    let ticket_id: String = row.try_get("ticket_id")?;
    let action: String = row.try_get("action")?;
    let performed_by: Option<String> = row.try_get("performed_by")?;
    let performed_by_type: String = row.try_get("performed_by_type")?;
    let metadata: Option<String> = row.try_get("metadata")?;

    Ok(AuditLogEntry {
        id: Uuid::parse_str(&id)?,
        ticket_id: Uuid::parse_str(&ticket_id)?,
        action: action.parse().map_err(|e: String| anyhow!(e))?,
        performed_by: performed_by.as_deref().map(Uuid::parse_str).transpose()?,
        performed_by_type: performed_by_type.parse().map_err(|e: String| anyhow!(e))?,
        details: row.try_get("details")?,
        confidence: row.try_get("confidence")?,
        metadata: metadata.as_deref().map(serde_json::from_str).transpose()?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

impl Database {
    /// Create the audit-log table
    pub(super) async fn migrate_audit(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS audit_log (
                id TEXT PRIMARY KEY,
                ticket_id TEXT NOT NULL REFERENCES tickets(id),
                action TEXT NOT NULL CHECK (action IN (
                    'ticket_created', 'ai_analysis', 'agent_assigned',
                    'status_updated', 'response_added', 'ticket_closed',
                    'ticket_reopened'
                )),
                performed_by TEXT REFERENCES users(id),
                performed_by_type TEXT NOT NULL CHECK (performed_by_type IN (
                    'AI', 'agent', 'admin', 'system', 'user'
                )),
                details TEXT NOT NULL,
                confidence REAL CHECK (confidence BETWEEN 0.0 AND 1.0),
                metadata TEXT,
                created_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        for index in [
            "CREATE INDEX IF NOT EXISTS idx_audit_log_ticket_id ON audit_log(ticket_id)",
            "CREATE INDEX IF NOT EXISTS idx_audit_log_action ON audit_log(action)",
            "CREATE INDEX IF NOT EXISTS idx_audit_log_created_at ON audit_log(created_at DESC)",
        ] {
            sqlx::query(index).execute(&self.pool).await?;
        }

        Ok(())
    }

    /// Append an entry to the audit trail
    pub async fn append_audit_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let metadata = entry
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r"
            INSERT INTO audit_log (
                id, ticket_id, action, performed_by, performed_by_type,
                details, confidence, metadata, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(entry.id.to_string())
        .bind(entry.ticket_id.to_string())
        .bind(entry.action.as_str())
        .bind(entry.performed_by.map(|id| id.to_string()))
        .bind(entry.performed_by_type.as_str())
        .bind(&entry.details)
        .bind(entry.confidence)
        .bind(metadata)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All entries for a ticket, newest first
    pub async fn list_audit_for_ticket(&self, ticket_id: Uuid) -> Result<Vec<AuditLogEntry>> {
        let rows = sqlx::query(
            "SELECT * FROM audit_log WHERE ticket_id = $1 ORDER BY created_at DESC, rowid DESC",
        )
        .bind(ticket_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_entry).collect()
    }

    /// Entries across all tickets with optional action and performer filters,
    /// newest first
    pub async fn list_audit_entries(
        &self,
        action: Option<AuditAction>,
        performed_by_type: Option<ActorType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLogEntry>> {
        let mut sql = String::from("SELECT * FROM audit_log WHERE 1=1");
        if action.is_some() {
            sql.push_str(" AND action = ?");
        }
        if performed_by_type.is_some() {
            sql.push_str(" AND performed_by_type = ?");
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql);
        if let Some(action) = action {
            query = query.bind(action.as_str());
        }
        if let Some(actor) = performed_by_type {
            query = query.bind(actor.as_str());
        }
        let rows = query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        rows.iter().map(row_to_entry).collect()
    }

    /// Count entries matching the optional filters
    pub async fn count_audit_entries(
        &self,
        action: Option<AuditAction>,
        performed_by_type: Option<ActorType>,
    ) -> Result<i64> {
        let mut sql = String::from("SELECT COUNT(*) AS n FROM audit_log WHERE 1=1");
        if action.is_some() {
            sql.push_str(" AND action = ?");
        }
        if performed_by_type.is_some() {
            sql.push_str(" AND performed_by_type = ?");
        }

        let mut query = sqlx::query(&sql);
        if let Some(action) = action {
            query = query.bind(action.as_str());
        }
        if let Some(actor) = performed_by_type {
            query = query.bind(actor.as_str());
        }
        let row = query.fetch_one(&self.pool).await?;
        Ok(row.try_get("n")?)
    }
}
