// ABOUTME: Dashboard statistics aggregation queries
// ABOUTME: Typed aggregation structs for ticket and user counts
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::tickets::row_to_ticket;
use super::Database;
use crate::models::{Ticket, UserRole};
use anyhow::Result;
use serde::Serialize;
use sqlx::Row;

/// Ticket counts grouped by lifecycle status
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TicketStatusCounts {
    pub total: i64,
    pub open: i64,
    pub in_progress: i64,
    pub closed: i64,
    /// Urgent tickets that are not yet closed
    pub urgent: i64,
}

/// Account counts for the admin dashboard
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserCounts {
    /// End-user accounts
    pub total: i64,
    /// Active end-user accounts
    pub active: i64,
    /// Agent accounts
    pub agents: i64,
}

/// Ticket count for one category
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Ticket count for one priority
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PriorityCount {
    pub priority: String,
    pub count: i64,
}

impl Database {
    /// Ticket counts by status plus the open-urgent count
    pub async fn ticket_status_counts(&self) -> Result<TicketStatusCounts> {
        let row = sqlx::query(
            r"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(status = 'open'), 0) AS open,
                COALESCE(SUM(status = 'in-progress'), 0) AS in_progress,
                COALESCE(SUM(status = 'closed'), 0) AS closed,
                COALESCE(SUM(priority = 'urgent' AND status != 'closed'), 0) AS urgent
            FROM tickets
            ",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(TicketStatusCounts {
            total: row.try_get("total")?,
            open: row.try_get("open")?,
            in_progress: row.try_get("in_progress")?,
            closed: row.try_get("closed")?,
            urgent: row.try_get("urgent")?,
        })
    }

    /// End-user and agent account counts
    pub async fn user_counts(&self) -> Result<UserCounts> {
        Ok(UserCounts {
            total: self.count_users(Some(UserRole::User), None).await?,
            active: self.count_users(Some(UserRole::User), Some(true)).await?,
            agents: self.count_users(Some(UserRole::Agent), None).await?,
        })
    }

    /// Ticket counts grouped by category
    pub async fn tickets_by_category(&self) -> Result<Vec<CategoryCount>> {
        let rows =
            sqlx::query("SELECT category, COUNT(*) AS n FROM tickets GROUP BY category")
                .fetch_all(&self.pool)
                .await?;

        rows.iter()
            .map(|row| {
                Ok(CategoryCount {
                    category: row.try_get("category")?,
                    count: row.try_get("n")?,
                })
            })
            .collect()
    }

    /// Ticket counts grouped by priority
    pub async fn tickets_by_priority(&self) -> Result<Vec<PriorityCount>> {
        let rows =
            sqlx::query("SELECT priority, COUNT(*) AS n FROM tickets GROUP BY priority")
                .fetch_all(&self.pool)
                .await?;

        rows.iter()
            .map(|row| {
                Ok(PriorityCount {
                    priority: row.try_get("priority")?,
                    count: row.try_get("n")?,
                })
            })
            .collect()
    }

    /// Most recently created tickets
    pub async fn recent_tickets(&self, limit: i64) -> Result<Vec<Ticket>> {
        let rows = sqlx::query("SELECT * FROM tickets ORDER BY created_at DESC LIMIT $1")
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_ticket).collect()
    }
}
