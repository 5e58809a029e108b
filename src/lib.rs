// ABOUTME: Main library entry point for the helpdesk ticketing platform
// ABOUTME: Provides the REST API, resolution workflow, and AI analysis layers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![deny(unsafe_code)]

//! # Helpdesk Server
//!
//! A support-ticketing backend: end users file tickets, an automated
//! analyzer attempts resolution using knowledge-base articles and an
//! external language-model API, and agents/admins manage escalations,
//! knowledge-base content, and users through role-gated REST endpoints.
//!
//! ## Architecture
//!
//! The server follows a modular architecture:
//! - **Models**: Core data structures (tickets, articles, audit entries, users)
//! - **Database**: SQLite persistence behind a provider abstraction
//! - **LLM**: Chat-completion provider abstraction with a Mistral implementation
//! - **AI**: Ticket analysis grounded in knowledge-base context
//! - **Workflow**: Ticket lifecycle orchestration and the auto-resolution policy
//! - **Routes**: REST endpoints consumed by the dashboard UI
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use helpdesk_server::config::environment::ServerConfig;
//! use helpdesk_server::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Helpdesk server configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Ticket analysis built on knowledge-base context and an LLM provider
pub mod ai;

/// JWT-based authentication and password hashing
pub mod auth;

/// Configuration management from environment variables
pub mod config;

/// SQLite persistence for tickets, articles, audit entries, and users
pub mod database;

/// Database abstraction layer with plugin support
pub mod database_plugins;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Chat-completion provider abstraction and implementations
pub mod llm;

/// Logging configuration and structured logging setup
pub mod logging;

/// Request authentication middleware
pub mod middleware;

/// Core data models and types
pub mod models;

/// Page/limit pagination parameters and summaries
pub mod pagination;

/// Shared server resources for dependency injection
pub mod resources;

/// HTTP routes organized by API domain
pub mod routes;

/// Router assembly and HTTP serving
pub mod server;

/// Ticket resolution workflow and auto-resolution policy
pub mod workflow;
