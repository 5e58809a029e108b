// ABOUTME: Route module organization for helpdesk HTTP endpoints
// ABOUTME: Centralized route definitions organized by API domain
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Route module for the helpdesk server
//!
//! This module organizes all HTTP routes by domain. Each domain module
//! contains route definitions and thin handler functions that delegate to
//! the workflow and store layers.

/// Admin API routes for user management and dashboard statistics
pub mod admin;

/// Audit-trail read routes
pub mod audit;

/// Registration and login routes
pub mod auth;

/// Health check and system status routes
pub mod health;

/// Knowledge-base article routes
pub mod knowledge_base;

/// Ticket CRUD and resolution routes
pub mod tickets;

/// Admin route handlers
pub use admin::AdminRoutes;
/// Audit route handlers
pub use audit::AuditRoutes;
/// Authentication route handlers
pub use auth::AuthRoutes;
/// Health route handlers
pub use health::HealthRoutes;
/// Knowledge-base route handlers
pub use knowledge_base::KnowledgeBaseRoutes;
/// Ticket route handlers
pub use tickets::TicketRoutes;
