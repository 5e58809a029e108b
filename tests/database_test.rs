// ABOUTME: Integration tests for the SQLite store layer
// ABOUTME: Covers CRUD, filtered listings, search, audit filters, and statistics
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod common;

use anyhow::Result;
use common::{create_test_database, create_test_user};
use helpdesk_server::{
    database::TicketFilter,
    database_plugins::{factory::Database, DatabaseProvider},
    models::{
        ActorType, AuditAction, AuditLogEntry, KnowledgeBaseArticle, Ticket, TicketPriority,
        TicketStatus, User, UserRole,
    },
};

#[tokio::test]
async fn test_user_crud_and_duplicate_email() -> Result<()> {
    let database = create_test_database().await?;
    let user = create_test_user(&database, UserRole::User).await?;

    let fetched = database.get_user(user.id).await?.unwrap();
    assert_eq!(fetched.email, user.email);
    assert_eq!(fetched.role, UserRole::User);
    assert!(fetched.is_active);

    let by_email = database.get_user_by_email(&user.email).await?.unwrap();
    assert_eq!(by_email.id, user.id);

    // Same email is rejected
    let duplicate = User::new("Other", &user.email, "hash", UserRole::User);
    assert!(database.create_user(&duplicate).await.is_err());

    // Role promotion and deactivation
    let updated = database
        .update_user(user.id, Some(UserRole::Agent), Some(false))
        .await?;
    assert_eq!(updated.role, UserRole::Agent);
    assert!(!updated.is_active);
    Ok(())
}

#[tokio::test]
async fn test_user_listing_filters() -> Result<()> {
    let database = create_test_database().await?;
    create_test_user(&database, UserRole::User).await?;
    create_test_user(&database, UserRole::Agent).await?;
    let inactive = create_test_user(&database, UserRole::User).await?;
    database.update_user(inactive.id, None, Some(false)).await?;

    assert_eq!(database.count_users(None, None).await?, 3);
    assert_eq!(database.count_users(Some(UserRole::Agent), None).await?, 1);
    assert_eq!(
        database.count_users(Some(UserRole::User), Some(true)).await?,
        1
    );

    let agents = database
        .list_users(Some(UserRole::Agent), None, 10, 0)
        .await?;
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].role, UserRole::Agent);
    Ok(())
}

#[tokio::test]
async fn test_ticket_filtered_listing() -> Result<()> {
    let database = create_test_database().await?;
    let user = create_test_user(&database, UserRole::User).await?;

    let open_billing = Ticket::new(
        user.id,
        "Billing one",
        "desc",
        "billing",
        TicketPriority::Urgent,
    );
    database.create_ticket(&open_billing).await?;

    let mut closed_technical = Ticket::new(
        user.id,
        "Tech one",
        "desc",
        "technical",
        TicketPriority::Low,
    );
    database.create_ticket(&closed_technical).await?;
    closed_technical.status = TicketStatus::Closed;
    closed_technical.resolution = Some("done".into());
    closed_technical.resolved_by = Some(helpdesk_server::models::ResolvedBy::Agent);
    database.update_ticket(&closed_technical).await?;

    let open_filter = TicketFilter {
        status: Some(TicketStatus::Open),
        ..TicketFilter::default()
    };
    assert_eq!(database.count_tickets(&open_filter).await?, 1);
    let open = database.list_tickets(&open_filter, 10, 0).await?;
    assert_eq!(open[0].category, "billing");

    let billing_urgent = TicketFilter {
        priority: Some(TicketPriority::Urgent),
        category: Some("billing".into()),
        ..TicketFilter::default()
    };
    assert_eq!(database.count_tickets(&billing_urgent).await?, 1);

    assert_eq!(database.count_tickets_for_user(user.id).await?, 2);
    let mine = database.list_tickets_for_user(user.id, 1, 0).await?;
    assert_eq!(mine.len(), 1);

    // Closing the other ticket did not touch this one
    let stored = database.get_ticket(open_billing.id).await?.unwrap();
    assert_eq!(stored.status, TicketStatus::Open);
    Ok(())
}

#[tokio::test]
async fn test_article_search_and_views() -> Result<()> {
    let database = create_test_database().await?;
    let admin = create_test_user(&database, UserRole::Admin).await?;

    let article = KnowledgeBaseArticle::new(
        "Reset your password",
        "Use the account page to request a reset link.",
        "account",
        vec!["password".into(), "login".into()],
        admin.id,
    );
    database.create_article(&article).await?;

    let mut inactive = KnowledgeBaseArticle::new(
        "Old password flow",
        "Deprecated steps.",
        "account",
        vec![],
        admin.id,
    );
    inactive.is_active = false;
    database.create_article(&inactive).await?;

    // Inactive articles are invisible to listing and to the AI read path
    assert_eq!(database.count_articles(Some("account"), None).await?, 1);
    let for_ai = database
        .find_active_articles_by_category("account", 10)
        .await?;
    assert_eq!(for_ai.len(), 1);
    assert_eq!(for_ai[0].id, article.id);

    // Search hits title, content, and tags
    for term in ["Reset", "reset link", "login"] {
        let found = database.list_articles(None, Some(term), 10, 0).await?;
        assert_eq!(found.len(), 1, "term {term} should match");
    }
    assert!(database
        .list_articles(None, Some("unrelated"), 10, 0)
        .await?
        .is_empty());

    database.increment_article_views(article.id).await?;
    database.increment_article_views(article.id).await?;
    let stored = database.get_article(article.id).await?.unwrap();
    assert_eq!(stored.views, 2);
    assert_eq!(stored.tags, vec!["password", "login"]);

    database.delete_article(article.id).await?;
    assert!(database.get_article(article.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_audit_filters_and_ordering() -> Result<()> {
    let database = create_test_database().await?;
    let user = create_test_user(&database, UserRole::User).await?;
    let ticket = Ticket::new(user.id, "t", "d", "general", TicketPriority::Medium);
    database.create_ticket(&ticket).await?;

    database
        .append_audit_entry(
            &AuditLogEntry::new(
                ticket.id,
                AuditAction::TicketCreated,
                ActorType::Agent,
                "Ticket created: t",
            )
            .with_performed_by(user.id),
        )
        .await?;
    database
        .append_audit_entry(
            &AuditLogEntry::new(ticket.id, AuditAction::AiAnalysis, ActorType::Ai, "analysis")
                .with_confidence(0.4)
                .with_metadata(serde_json::json!({"reasoning": "thin context"})),
        )
        .await?;

    let trail = database.list_audit_for_ticket(ticket.id).await?;
    assert_eq!(trail.len(), 2);
    assert_eq!(trail[0].action, AuditAction::AiAnalysis);
    assert_eq!(trail[1].action, AuditAction::TicketCreated);

    // Metadata round-trips through storage
    assert_eq!(
        trail[0]
            .metadata
            .as_ref()
            .and_then(|m| m.get("reasoning"))
            .and_then(|v| v.as_str()),
        Some("thin context")
    );

    assert_eq!(
        database
            .count_audit_entries(Some(AuditAction::AiAnalysis), None)
            .await?,
        1
    );
    assert_eq!(
        database
            .count_audit_entries(None, Some(ActorType::Agent))
            .await?,
        1
    );
    let ai_entries = database
        .list_audit_entries(None, Some(ActorType::Ai), 10, 0)
        .await?;
    assert_eq!(ai_entries.len(), 1);
    assert_eq!(ai_entries[0].confidence, Some(0.4));
    Ok(())
}

#[tokio::test]
async fn test_dashboard_statistics() -> Result<()> {
    let database = create_test_database().await?;
    let user = create_test_user(&database, UserRole::User).await?;
    create_test_user(&database, UserRole::Agent).await?;

    let open = Ticket::new(user.id, "a", "d", "billing", TicketPriority::Urgent);
    database.create_ticket(&open).await?;

    let mut in_progress = Ticket::new(user.id, "b", "d", "billing", TicketPriority::Low);
    database.create_ticket(&in_progress).await?;
    in_progress.status = TicketStatus::InProgress;
    database.update_ticket(&in_progress).await?;

    let mut closed = Ticket::new(user.id, "c", "d", "technical", TicketPriority::Urgent);
    database.create_ticket(&closed).await?;
    closed.status = TicketStatus::Closed;
    closed.resolution = Some("done".into());
    closed.resolved_by = Some(helpdesk_server::models::ResolvedBy::Agent);
    database.update_ticket(&closed).await?;

    let counts = database.ticket_status_counts().await?;
    assert_eq!(counts.total, 3);
    assert_eq!(counts.open, 1);
    assert_eq!(counts.in_progress, 1);
    assert_eq!(counts.closed, 1);
    // Only the open urgent ticket counts; the closed urgent one does not
    assert_eq!(counts.urgent, 1);

    let users = database.user_counts().await?;
    assert_eq!(users.total, 1);
    assert_eq!(users.active, 1);
    assert_eq!(users.agents, 1);

    let mut by_category = database.tickets_by_category().await?;
    by_category.sort_by(|a, b| a.category.cmp(&b.category));
    assert_eq!(by_category.len(), 2);
    assert_eq!(by_category[0].category, "billing");
    assert_eq!(by_category[0].count, 2);

    let by_priority = database.tickets_by_priority().await?;
    let urgent = by_priority
        .iter()
        .find(|p| p.priority == "urgent")
        .unwrap();
    assert_eq!(urgent.count, 2);

    let recent = database.recent_tickets(2).await?;
    assert_eq!(recent.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_file_backed_database() -> Result<()> {
    common::init_test_logging();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("helpdesk-test.db");
    let url = format!("sqlite:{}", path.display());

    let database = Database::new(&url).await?;
    assert_eq!(database.backend_info(), "SQLite (Embedded)");

    let user = create_test_user(&database, UserRole::User).await?;
    assert!(database.get_user(user.id).await?.is_some());
    assert!(path.exists());
    Ok(())
}
