// ABOUTME: Database factory and provider abstraction
// ABOUTME: Provides a unified interface with runtime database selection from the connection string

//! Database factory for creating database providers
//!
//! This module provides automatic database type detection and creation
//! based on connection strings.

use super::sqlite::SqliteDatabase;
use super::DatabaseProvider;
use crate::database::{
    CategoryCount, PriorityCount, TicketFilter, TicketStatusCounts, UserCounts,
};
use crate::models::{
    ActorType, AuditAction, AuditLogEntry, KnowledgeBaseArticle, Ticket, User, UserRole,
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    SQLite,
}

/// Database instance wrapper that delegates to the appropriate implementation
#[derive(Clone)]
pub enum Database {
    SQLite(SqliteDatabase),
}

impl Database {
    /// Get a descriptive string for the current database backend
    #[must_use]
    pub const fn backend_info(&self) -> &'static str {
        match self {
            Self::SQLite(_) => "SQLite (Embedded)",
        }
    }

    /// Get the database type enum
    #[must_use]
    pub const fn database_type(&self) -> DatabaseType {
        match self {
            Self::SQLite(_) => DatabaseType::SQLite,
        }
    }
}

/// Automatically detect database type from connection string
///
/// # Errors
///
/// Returns an error if the URL does not describe a supported backend.
fn detect_database_type(database_url: &str) -> Result<DatabaseType> {
    if database_url.starts_with("sqlite:") || database_url == ":memory:" {
        Ok(DatabaseType::SQLite)
    } else {
        Err(anyhow!(
            "Unsupported database URL format: {database_url}. Expected sqlite:<path>"
        ))
    }
}

#[async_trait]
impl DatabaseProvider for Database {
    async fn new(database_url: &str) -> Result<Self> {
        debug!("Detecting database type from URL: {}", database_url);
        let db_type = detect_database_type(database_url)?;
        info!("Detected database type: {:?}", db_type);

        match db_type {
            DatabaseType::SQLite => {
                let db = SqliteDatabase::new(database_url).await?;
                info!("SQLite database initialized successfully");
                Ok(Self::SQLite(db))
            }
        }
    }

    async fn migrate(&self) -> Result<()> {
        match self {
            Self::SQLite(db) => db.migrate().await,
        }
    }

    async fn create_user(&self, user: &User) -> Result<Uuid> {
        match self {
            Self::SQLite(db) => db.create_user(user).await,
        }
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        match self {
            Self::SQLite(db) => db.get_user(user_id).await,
        }
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        match self {
            Self::SQLite(db) => db.get_user_by_email(email).await,
        }
    }

    async fn update_last_active(&self, user_id: Uuid) -> Result<()> {
        match self {
            Self::SQLite(db) => db.update_last_active(user_id).await,
        }
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        role: Option<UserRole>,
        is_active: Option<bool>,
    ) -> Result<User> {
        match self {
            Self::SQLite(db) => db.update_user(user_id, role, is_active).await,
        }
    }

    async fn list_users(
        &self,
        role: Option<UserRole>,
        is_active: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>> {
        match self {
            Self::SQLite(db) => db.list_users(role, is_active, limit, offset).await,
        }
    }

    async fn count_users(&self, role: Option<UserRole>, is_active: Option<bool>) -> Result<i64> {
        match self {
            Self::SQLite(db) => db.count_users(role, is_active).await,
        }
    }

    async fn create_ticket(&self, ticket: &Ticket) -> Result<()> {
        match self {
            Self::SQLite(db) => db.create_ticket(ticket).await,
        }
    }

    async fn get_ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>> {
        match self {
            Self::SQLite(db) => db.get_ticket(ticket_id).await,
        }
    }

    async fn update_ticket(&self, ticket: &Ticket) -> Result<()> {
        match self {
            Self::SQLite(db) => db.update_ticket(ticket).await,
        }
    }

    async fn list_tickets(
        &self,
        filter: &TicketFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Ticket>> {
        match self {
            Self::SQLite(db) => db.list_tickets(filter, limit, offset).await,
        }
    }

    async fn count_tickets(&self, filter: &TicketFilter) -> Result<i64> {
        match self {
            Self::SQLite(db) => db.count_tickets(filter).await,
        }
    }

    async fn list_tickets_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Ticket>> {
        match self {
            Self::SQLite(db) => db.list_tickets_for_user(user_id, limit, offset).await,
        }
    }

    async fn count_tickets_for_user(&self, user_id: Uuid) -> Result<i64> {
        match self {
            Self::SQLite(db) => db.count_tickets_for_user(user_id).await,
        }
    }

    async fn create_article(&self, article: &KnowledgeBaseArticle) -> Result<()> {
        match self {
            Self::SQLite(db) => db.create_article(article).await,
        }
    }

    async fn get_article(&self, article_id: Uuid) -> Result<Option<KnowledgeBaseArticle>> {
        match self {
            Self::SQLite(db) => db.get_article(article_id).await,
        }
    }

    async fn update_article(&self, article: &KnowledgeBaseArticle) -> Result<()> {
        match self {
            Self::SQLite(db) => db.update_article(article).await,
        }
    }

    async fn delete_article(&self, article_id: Uuid) -> Result<()> {
        match self {
            Self::SQLite(db) => db.delete_article(article_id).await,
        }
    }

    async fn increment_article_views(&self, article_id: Uuid) -> Result<()> {
        match self {
            Self::SQLite(db) => db.increment_article_views(article_id).await,
        }
    }

    async fn list_articles(
        &self,
        category: Option<&str>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<KnowledgeBaseArticle>> {
        match self {
            Self::SQLite(db) => db.list_articles(category, search, limit, offset).await,
        }
    }

    async fn count_articles(&self, category: Option<&str>, search: Option<&str>) -> Result<i64> {
        match self {
            Self::SQLite(db) => db.count_articles(category, search).await,
        }
    }

    async fn find_active_articles_by_category(
        &self,
        category: &str,
        limit: i64,
    ) -> Result<Vec<KnowledgeBaseArticle>> {
        match self {
            Self::SQLite(db) => db.find_active_articles_by_category(category, limit).await,
        }
    }

    async fn append_audit_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        match self {
            Self::SQLite(db) => db.append_audit_entry(entry).await,
        }
    }

    async fn list_audit_for_ticket(&self, ticket_id: Uuid) -> Result<Vec<AuditLogEntry>> {
        match self {
            Self::SQLite(db) => db.list_audit_for_ticket(ticket_id).await,
        }
    }

    async fn list_audit_entries(
        &self,
        action: Option<AuditAction>,
        performed_by_type: Option<ActorType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLogEntry>> {
        match self {
            Self::SQLite(db) => {
                db.list_audit_entries(action, performed_by_type, limit, offset)
                    .await
            }
        }
    }

    async fn count_audit_entries(
        &self,
        action: Option<AuditAction>,
        performed_by_type: Option<ActorType>,
    ) -> Result<i64> {
        match self {
            Self::SQLite(db) => db.count_audit_entries(action, performed_by_type).await,
        }
    }

    async fn ticket_status_counts(&self) -> Result<TicketStatusCounts> {
        match self {
            Self::SQLite(db) => db.ticket_status_counts().await,
        }
    }

    async fn user_counts(&self) -> Result<UserCounts> {
        match self {
            Self::SQLite(db) => db.user_counts().await,
        }
    }

    async fn tickets_by_category(&self) -> Result<Vec<CategoryCount>> {
        match self {
            Self::SQLite(db) => db.tickets_by_category().await,
        }
    }

    async fn tickets_by_priority(&self) -> Result<Vec<PriorityCount>> {
        match self {
            Self::SQLite(db) => db.tickets_by_priority().await,
        }
    }

    async fn recent_tickets(&self, limit: i64) -> Result<Vec<Ticket>> {
        match self {
            Self::SQLite(db) => db.recent_tickets(limit).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_database_type() {
        assert_eq!(
            detect_database_type("sqlite:helpdesk.db").unwrap(),
            DatabaseType::SQLite
        );
        assert_eq!(
            detect_database_type("sqlite::memory:").unwrap(),
            DatabaseType::SQLite
        );
        assert!(detect_database_type("postgresql://localhost/db").is_err());
    }
}
