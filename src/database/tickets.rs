// ABOUTME: Ticket persistence operations
// ABOUTME: Handles creation, filtered listing, and full-row updates of tickets
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::Database;
use crate::models::{ResolvedBy, Ticket, TicketPriority, TicketStatus};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

/// Optional filters applied to staff ticket listings
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub category: Option<String>,
}

impl TicketFilter {
    fn where_clause(&self, sql: &mut String) {
        if self.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if self.priority.is_some() {
            sql.push_str(" AND priority = ?");
        }
        if self.category.is_some() {
            sql.push_str(" AND category = ?");
        }
    }

    fn bind<'q>(
        &'q self,
        mut query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    ) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
        if let Some(status) = self.status {
            query = query.bind(status.as_str());
        }
        if let Some(priority) = self.priority {
            query = query.bind(priority.as_str());
        }
        if let Some(category) = &self.category {
            query = query.bind(category.as_str());
        }
        query
    }
}

pub(super) fn row_to_ticket(row: &SqliteRow) -> Result<Ticket> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let status: String = row.try_get("status")?;
    let priority: String = row.try_get("priority")?;
    let assigned_to: Option<String> = row.try_get("assigned_to")?;
    let resolved_by: Option<String> = row.try_get("resolved_by")?;

    Ok(Ticket {
        id: Uuid::parse_str(&id)?,
        user_id: Uuid::parse_str(&user_id)?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        priority: priority.parse().map_err(|e: String| anyhow!(e))?,
        status: status.parse().map_err(|e: String| anyhow!(e))?,
        assigned_to: assigned_to.as_deref().map(Uuid::parse_str).transpose()?,
        ai_confidence: row.try_get("ai_confidence")?,
        resolution: row.try_get("resolution")?,
        resolved_by: resolved_by
            .as_deref()
            .map(str::parse::<ResolvedBy>)
            .transpose()
            .map_err(|e: String| anyhow!(e))?,
        resolved_at: row.try_get::<Option<DateTime<Utc>>, _>("resolved_at")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

impl Database {
    /// Create the tickets table
    pub(super) async fn migrate_tickets(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS tickets (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id),
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                priority TEXT NOT NULL DEFAULT 'medium'
                    CHECK (priority IN ('low', 'medium', 'high', 'urgent')),
                status TEXT NOT NULL DEFAULT 'open'
                    CHECK (status IN ('open', 'in-progress', 'closed')),
                assigned_to TEXT REFERENCES users(id),
                ai_confidence REAL CHECK (ai_confidence BETWEEN 0.0 AND 1.0),
                resolution TEXT,
                resolved_by TEXT CHECK (resolved_by IN ('AI', 'agent')),
                resolved_at DATETIME,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        for index in [
            "CREATE INDEX IF NOT EXISTS idx_tickets_user_id ON tickets(user_id)",
            "CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status)",
            "CREATE INDEX IF NOT EXISTS idx_tickets_priority ON tickets(priority)",
            "CREATE INDEX IF NOT EXISTS idx_tickets_category ON tickets(category)",
            "CREATE INDEX IF NOT EXISTS idx_tickets_created_at ON tickets(created_at DESC)",
        ] {
            sqlx::query(index).execute(&self.pool).await?;
        }

        Ok(())
    }

    /// Persist a new ticket
    pub async fn create_ticket(&self, ticket: &Ticket) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO tickets (
                id, user_id, title, description, category, priority, status,
                assigned_to, ai_confidence, resolution, resolved_by, resolved_at,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ",
        )
        .bind(ticket.id.to_string())
        .bind(ticket.user_id.to_string())
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(&ticket.category)
        .bind(ticket.priority.as_str())
        .bind(ticket.status.as_str())
        .bind(ticket.assigned_to.map(|id| id.to_string()))
        .bind(ticket.ai_confidence)
        .bind(&ticket.resolution)
        .bind(ticket.resolved_by.map(|r| r.as_str()))
        .bind(ticket.resolved_at)
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get ticket by ID
    pub async fn get_ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>> {
        let row = sqlx::query("SELECT * FROM tickets WHERE id = $1")
            .bind(ticket_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_ticket).transpose()
    }

    /// Write the full current state of a ticket, refreshing `updated_at`
    pub async fn update_ticket(&self, ticket: &Ticket) -> Result<()> {
        sqlx::query(
            r"
            UPDATE tickets SET
                title = $2,
                description = $3,
                category = $4,
                priority = $5,
                status = $6,
                assigned_to = $7,
                ai_confidence = $8,
                resolution = $9,
                resolved_by = $10,
                resolved_at = $11,
                updated_at = $12
            WHERE id = $1
            ",
        )
        .bind(ticket.id.to_string())
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(&ticket.category)
        .bind(ticket.priority.as_str())
        .bind(ticket.status.as_str())
        .bind(ticket.assigned_to.map(|id| id.to_string()))
        .bind(ticket.ai_confidence)
        .bind(&ticket.resolution)
        .bind(ticket.resolved_by.map(|r| r.as_str()))
        .bind(ticket.resolved_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List tickets matching the filter, newest first
    pub async fn list_tickets(
        &self,
        filter: &TicketFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Ticket>> {
        let mut sql = String::from("SELECT * FROM tickets WHERE 1=1");
        filter.where_clause(&mut sql);
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let query = filter.bind(sqlx::query(&sql)).bind(limit).bind(offset);
        let rows = query.fetch_all(&self.pool).await?;

        rows.iter().map(row_to_ticket).collect()
    }

    /// Count tickets matching the filter
    pub async fn count_tickets(&self, filter: &TicketFilter) -> Result<i64> {
        let mut sql = String::from("SELECT COUNT(*) AS n FROM tickets WHERE 1=1");
        filter.where_clause(&mut sql);

        let row = filter.bind(sqlx::query(&sql)).fetch_one(&self.pool).await?;
        Ok(row.try_get("n")?)
    }

    /// List tickets owned by `user_id`, newest first
    pub async fn list_tickets_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Ticket>> {
        let rows = sqlx::query(
            "SELECT * FROM tickets WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id.to_string())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_ticket).collect()
    }

    /// Count tickets owned by `user_id`
    pub async fn count_tickets_for_user(&self, user_id: Uuid) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM tickets WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }
}
