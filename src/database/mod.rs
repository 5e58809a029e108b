// ABOUTME: Database management for the helpdesk server
// ABOUTME: Owns the SQLite pool, migrations, and per-collection operations
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Database Management
//!
//! This module provides database functionality for the helpdesk server.
//! It handles ticket, knowledge-base, audit-log, and user storage with
//! per-document atomic writes; no cross-document transaction is used.

mod audit;
mod knowledge_base;
mod stats;
mod tickets;
mod users;

pub use stats::{CategoryCount, PriorityCount, TicketStatusCounts, UserCounts};
pub use tickets::TicketFilter;

use anyhow::Result;
use sqlx::{Pool, Sqlite, SqlitePool};

/// Database manager for helpdesk collections
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or a
    /// migration fails.
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:")
            && !database_url.contains(":memory:")
            && !database_url.contains('?')
        {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        let pool = SqlitePool::connect(&connection_options).await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails.
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_users().await?;
        self.migrate_tickets().await?;
        self.migrate_knowledge_base().await?;
        self.migrate_audit().await?;
        Ok(())
    }
}
