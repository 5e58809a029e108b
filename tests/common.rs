// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides common database, auth, user, and mock-provider helpers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
#![allow(dead_code)]

//! Shared test utilities for `helpdesk_server`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use std::sync::{Arc, Once};

use anyhow::Result;
use async_trait::async_trait;
use helpdesk_server::{
    ai::TicketAnalyzer,
    auth::{generate_jwt_secret, hash_password, AuthManager},
    config::environment::{AiConfig, AuthConfig, DatabaseUrl, Environment, LogLevel, ServerConfig},
    database_plugins::{factory::Database, DatabaseProvider},
    errors::AppError,
    llm::{ChatRequest, ChatResponse, LlmProvider},
    models::{KnowledgeBaseArticle, User, UserRole},
    resources::ServerResources,
    workflow::TicketResolutionWorkflow,
};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup (in-memory SQLite)
pub async fn create_test_database() -> Result<Arc<Database>> {
    init_test_logging();
    let database = Arc::new(Database::new("sqlite::memory:").await?);
    Ok(database)
}

/// Create test authentication manager
pub fn create_test_auth_manager() -> Arc<AuthManager> {
    Arc::new(AuthManager::new(generate_jwt_secret().to_vec(), 24))
}

/// Create and persist a test user with the given role
pub async fn create_test_user(database: &Database, role: UserRole) -> Result<User> {
    let email = format!("{}@example.com", Uuid::new_v4());
    let user = User::new("Test User", email, hash_password("password")?, role);
    database.create_user(&user).await?;
    Ok(user)
}

/// Create and persist an active knowledge-base article in `category`
pub async fn create_test_article(
    database: &Database,
    category: &str,
    created_by: Uuid,
) -> Result<KnowledgeBaseArticle> {
    let article = KnowledgeBaseArticle::new(
        "Payments FAQ",
        "Refresh the dashboard and check your transaction history.",
        category,
        vec!["payments".into()],
        created_by,
    );
    database.create_article(&article).await?;
    Ok(article)
}

/// Server configuration for tests; never reads the environment
pub fn create_test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        environment: Environment::Testing,
        log_level: LogLevel::Warn,
        database_url: DatabaseUrl::Memory,
        ai: AiConfig {
            base_url: "http://localhost:0/v1".into(),
            api_key: None,
            model: "mistral-small-latest".into(),
        },
        auth: AuthConfig {
            jwt_secret: generate_jwt_secret().to_vec(),
            token_expiry_hours: 24,
        },
    }
}

/// Build a workflow over the given database and provider
pub fn create_test_workflow(
    database: Arc<Database>,
    provider: Arc<dyn LlmProvider>,
) -> TicketResolutionWorkflow {
    let analyzer = Arc::new(TicketAnalyzer::new(database.clone(), provider));
    TicketResolutionWorkflow::new(database, analyzer)
}

/// Build complete server resources over an in-memory store
pub async fn create_test_resources(provider: Arc<dyn LlmProvider>) -> Result<Arc<ServerResources>> {
    init_test_logging();
    let database = Database::new("sqlite::memory:").await?;
    Ok(Arc::new(ServerResources::new(
        database,
        provider,
        Arc::new(create_test_config()),
    )))
}

/// Provider that always returns the same completion content
pub struct ScriptedProvider {
    content: String,
}

impl ScriptedProvider {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Provider returning a well-formed analysis with the given confidence
    pub fn with_confidence(confidence: f64) -> Self {
        Self::new(format!(
            r#"{{"response":"Here is how to fix the issue.","confidence":{confidence},"reasoning":"Covered by the knowledge base","suggestedActions":["follow the FAQ"],"requiresHumanReview":false}}"#
        ))
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, _request: &ChatRequest) -> Result<ChatResponse, AppError> {
        Ok(ChatResponse {
            content: self.content.clone(),
            model: "scripted-model".into(),
            usage: None,
            finish_reason: Some("stop".into()),
        })
    }
}

/// Provider that fails every call like a network outage
pub struct FailingProvider;

#[async_trait]
impl LlmProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn default_model(&self) -> &str {
        "failing-model"
    }

    async fn complete(&self, _request: &ChatRequest) -> Result<ChatResponse, AppError> {
        Err(AppError::external_service("Mistral", "connection refused"))
    }
}
