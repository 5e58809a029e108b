// ABOUTME: Database abstraction layer for the helpdesk server
// ABOUTME: Plugin architecture for database support with a SQLite backend

use crate::database::{
    CategoryCount, PriorityCount, TicketFilter, TicketStatusCounts, UserCounts,
};
use crate::models::{
    ActorType, AuditAction, AuditLogEntry, KnowledgeBaseArticle, Ticket, User, UserRole,
};
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

pub mod factory;
pub mod sqlite;

/// Core database abstraction trait
///
/// All database implementations must implement this trait to provide
/// a consistent interface for the application layer. Every operation is
/// request-scoped; implementations guarantee per-document atomic writes
/// only, with no cross-document transaction.
#[async_trait]
pub trait DatabaseProvider: Send + Sync + Clone {
    /// Create a new database connection
    async fn new(database_url: &str) -> Result<Self>
    where
        Self: Sized;

    /// Run database migrations to set up schema
    async fn migrate(&self) -> Result<()>;

    // ================================
    // User Management
    // ================================

    /// Create a new user account
    async fn create_user(&self, user: &User) -> Result<Uuid>;

    /// Get user by ID
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>>;

    /// Get user by email address
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Update user's last active timestamp
    async fn update_last_active(&self, user_id: Uuid) -> Result<()>;

    /// Update role and/or active flag for a user
    async fn update_user(
        &self,
        user_id: Uuid,
        role: Option<UserRole>,
        is_active: Option<bool>,
    ) -> Result<User>;

    /// List users with optional role and active filters
    async fn list_users(
        &self,
        role: Option<UserRole>,
        is_active: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>>;

    /// Count users matching the optional filters
    async fn count_users(&self, role: Option<UserRole>, is_active: Option<bool>) -> Result<i64>;

    // ================================
    // Tickets
    // ================================

    /// Persist a new ticket
    async fn create_ticket(&self, ticket: &Ticket) -> Result<()>;

    /// Get ticket by ID
    async fn get_ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>>;

    /// Write the full current state of a ticket
    async fn update_ticket(&self, ticket: &Ticket) -> Result<()>;

    /// List tickets matching the filter, newest first
    async fn list_tickets(
        &self,
        filter: &TicketFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Ticket>>;

    /// Count tickets matching the filter
    async fn count_tickets(&self, filter: &TicketFilter) -> Result<i64>;

    /// List tickets owned by a user, newest first
    async fn list_tickets_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Ticket>>;

    /// Count tickets owned by a user
    async fn count_tickets_for_user(&self, user_id: Uuid) -> Result<i64>;

    // ================================
    // Knowledge Base
    // ================================

    /// Persist a new article
    async fn create_article(&self, article: &KnowledgeBaseArticle) -> Result<()>;

    /// Get article by ID
    async fn get_article(&self, article_id: Uuid) -> Result<Option<KnowledgeBaseArticle>>;

    /// Write the full current state of an article
    async fn update_article(&self, article: &KnowledgeBaseArticle) -> Result<()>;

    /// Remove an article
    async fn delete_article(&self, article_id: Uuid) -> Result<()>;

    /// Increment the read counter for an article
    async fn increment_article_views(&self, article_id: Uuid) -> Result<()>;

    /// List active articles with optional category filter and text search
    async fn list_articles(
        &self,
        category: Option<&str>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<KnowledgeBaseArticle>>;

    /// Count active articles matching the optional filters
    async fn count_articles(&self, category: Option<&str>, search: Option<&str>) -> Result<i64>;

    /// Active articles for a category in store order, capped at `limit`
    async fn find_active_articles_by_category(
        &self,
        category: &str,
        limit: i64,
    ) -> Result<Vec<KnowledgeBaseArticle>>;

    // ================================
    // Audit Log (append-only)
    // ================================

    /// Append an entry to the audit trail
    async fn append_audit_entry(&self, entry: &AuditLogEntry) -> Result<()>;

    /// All entries for a ticket, newest first
    async fn list_audit_for_ticket(&self, ticket_id: Uuid) -> Result<Vec<AuditLogEntry>>;

    /// Entries across all tickets with optional filters, newest first
    async fn list_audit_entries(
        &self,
        action: Option<AuditAction>,
        performed_by_type: Option<ActorType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLogEntry>>;

    /// Count entries matching the optional filters
    async fn count_audit_entries(
        &self,
        action: Option<AuditAction>,
        performed_by_type: Option<ActorType>,
    ) -> Result<i64>;

    // ================================
    // Dashboard Statistics
    // ================================

    /// Ticket counts by status plus the open-urgent count
    async fn ticket_status_counts(&self) -> Result<TicketStatusCounts>;

    /// End-user and agent account counts
    async fn user_counts(&self) -> Result<UserCounts>;

    /// Ticket counts grouped by category
    async fn tickets_by_category(&self) -> Result<Vec<CategoryCount>>;

    /// Ticket counts grouped by priority
    async fn tickets_by_priority(&self) -> Result<Vec<PriorityCount>>;

    /// Most recently created tickets
    async fn recent_tickets(&self, limit: i64) -> Result<Vec<Ticket>>;
}
