// ABOUTME: Shared server resources wired once at startup
// ABOUTME: Explicit dependency injection for handlers, workflow, and analyzer
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Shared resources threaded through every route handler.
//!
//! All services are constructed once here and shared via `Arc`; no module
//! holds global mutable state.

use std::sync::Arc;

use crate::ai::TicketAnalyzer;
use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database_plugins::factory::Database;
use crate::llm::LlmProvider;
use crate::middleware::AuthMiddleware;
use crate::workflow::TicketResolutionWorkflow;

/// Everything a route handler needs, behind one `Arc`
pub struct ServerResources {
    /// Document store
    pub database: Arc<Database>,
    /// Token issuing and validation
    pub auth_manager: Arc<AuthManager>,
    /// Request authentication
    pub auth_middleware: Arc<AuthMiddleware>,
    /// Ticket lifecycle orchestration
    pub workflow: Arc<TicketResolutionWorkflow>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Wire up all shared services
    #[must_use]
    pub fn new(
        database: Database,
        provider: Arc<dyn LlmProvider>,
        config: Arc<ServerConfig>,
    ) -> Self {
        let database = Arc::new(database);
        let auth_manager = Arc::new(AuthManager::new(
            config.auth.jwt_secret.clone(),
            config.auth.token_expiry_hours,
        ));
        let auth_middleware = Arc::new(AuthMiddleware::new(
            auth_manager.clone(),
            database.clone(),
        ));
        let analyzer = Arc::new(TicketAnalyzer::new(database.clone(), provider));
        let workflow = Arc::new(TicketResolutionWorkflow::new(database.clone(), analyzer));

        Self {
            database,
            auth_manager,
            auth_middleware,
            workflow,
            config,
        }
    }
}
