//! SQLite database implementation
//!
//! This module wraps the SQLite database functionality to implement the
//! `DatabaseProvider` trait.

use super::DatabaseProvider;
use crate::database::{
    CategoryCount, PriorityCount, TicketFilter, TicketStatusCounts, UserCounts,
};
use crate::models::{
    ActorType, AuditAction, AuditLogEntry, KnowledgeBaseArticle, Ticket, User, UserRole,
};
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// SQLite database implementation
#[derive(Clone)]
pub struct SqliteDatabase {
    /// The underlying database instance
    inner: crate::database::Database,
}

impl SqliteDatabase {
    /// Get a reference to the inner database for pool-level operations
    #[must_use]
    pub fn inner(&self) -> &crate::database::Database {
        &self.inner
    }
}

#[async_trait]
impl DatabaseProvider for SqliteDatabase {
    async fn new(database_url: &str) -> Result<Self> {
        let inner = crate::database::Database::new(database_url).await?;
        Ok(Self { inner })
    }

    async fn migrate(&self) -> Result<()> {
        self.inner.migrate().await
    }

    async fn create_user(&self, user: &User) -> Result<Uuid> {
        self.inner.create_user(user).await
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        self.inner.get_user(user_id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.inner.get_user_by_email(email).await
    }

    async fn update_last_active(&self, user_id: Uuid) -> Result<()> {
        self.inner.update_last_active(user_id).await
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        role: Option<UserRole>,
        is_active: Option<bool>,
    ) -> Result<User> {
        self.inner.update_user(user_id, role, is_active).await
    }

    async fn list_users(
        &self,
        role: Option<UserRole>,
        is_active: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>> {
        self.inner.list_users(role, is_active, limit, offset).await
    }

    async fn count_users(&self, role: Option<UserRole>, is_active: Option<bool>) -> Result<i64> {
        self.inner.count_users(role, is_active).await
    }

    async fn create_ticket(&self, ticket: &Ticket) -> Result<()> {
        self.inner.create_ticket(ticket).await
    }

    async fn get_ticket(&self, ticket_id: Uuid) -> Result<Option<Ticket>> {
        self.inner.get_ticket(ticket_id).await
    }

    async fn update_ticket(&self, ticket: &Ticket) -> Result<()> {
        self.inner.update_ticket(ticket).await
    }

    async fn list_tickets(
        &self,
        filter: &TicketFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Ticket>> {
        self.inner.list_tickets(filter, limit, offset).await
    }

    async fn count_tickets(&self, filter: &TicketFilter) -> Result<i64> {
        self.inner.count_tickets(filter).await
    }

    async fn list_tickets_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Ticket>> {
        self.inner
            .list_tickets_for_user(user_id, limit, offset)
            .await
    }

    async fn count_tickets_for_user(&self, user_id: Uuid) -> Result<i64> {
        self.inner.count_tickets_for_user(user_id).await
    }

    async fn create_article(&self, article: &KnowledgeBaseArticle) -> Result<()> {
        self.inner.create_article(article).await
    }

    async fn get_article(&self, article_id: Uuid) -> Result<Option<KnowledgeBaseArticle>> {
        self.inner.get_article(article_id).await
    }

    async fn update_article(&self, article: &KnowledgeBaseArticle) -> Result<()> {
        self.inner.update_article(article).await
    }

    async fn delete_article(&self, article_id: Uuid) -> Result<()> {
        self.inner.delete_article(article_id).await
    }

    async fn increment_article_views(&self, article_id: Uuid) -> Result<()> {
        self.inner.increment_article_views(article_id).await
    }

    async fn list_articles(
        &self,
        category: Option<&str>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<KnowledgeBaseArticle>> {
        self.inner
            .list_articles(category, search, limit, offset)
            .await
    }

    async fn count_articles(&self, category: Option<&str>, search: Option<&str>) -> Result<i64> {
        self.inner.count_articles(category, search).await
    }

    async fn find_active_articles_by_category(
        &self,
        category: &str,
        limit: i64,
    ) -> Result<Vec<KnowledgeBaseArticle>> {
        self.inner
            .find_active_articles_by_category(category, limit)
            .await
    }

    async fn append_audit_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        self.inner.append_audit_entry(entry).await
    }

    async fn list_audit_for_ticket(&self, ticket_id: Uuid) -> Result<Vec<AuditLogEntry>> {
        self.inner.list_audit_for_ticket(ticket_id).await
    }

    async fn list_audit_entries(
        &self,
        action: Option<AuditAction>,
        performed_by_type: Option<ActorType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLogEntry>> {
        self.inner
            .list_audit_entries(action, performed_by_type, limit, offset)
            .await
    }

    async fn count_audit_entries(
        &self,
        action: Option<AuditAction>,
        performed_by_type: Option<ActorType>,
    ) -> Result<i64> {
        self.inner
            .count_audit_entries(action, performed_by_type)
            .await
    }

    async fn ticket_status_counts(&self) -> Result<TicketStatusCounts> {
        self.inner.ticket_status_counts().await
    }

    async fn user_counts(&self) -> Result<UserCounts> {
        self.inner.user_counts().await
    }

    async fn tickets_by_category(&self) -> Result<Vec<CategoryCount>> {
        self.inner.tickets_by_category().await
    }

    async fn tickets_by_priority(&self) -> Result<Vec<PriorityCount>> {
        self.inner.tickets_by_priority().await
    }

    async fn recent_tickets(&self, limit: i64) -> Result<Vec<Ticket>> {
        self.inner.recent_tickets(limit).await
    }
}
