// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Environment-based configuration management for production deployment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::warn;

/// Default HTTP port when `HTTP_PORT` is unset
const DEFAULT_HTTP_PORT: u16 = 8081;

/// Default SQLite database path
const DEFAULT_DATABASE_URL: &str = "sqlite:helpdesk.db";

/// Default Mistral API endpoint
const DEFAULT_AI_BASE_URL: &str = "https://api.mistral.ai/v1";

/// Default completion model
const DEFAULT_AI_MODEL: &str = "mistral-small-latest";

/// Default JWT expiry
const DEFAULT_TOKEN_EXPIRY_HOURS: i64 = 24;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Environment type for deployment-specific behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// SQLite database with file path
    SQLite { path: PathBuf },
    /// In-memory SQLite, used by tests
    Memory,
}

impl DatabaseUrl {
    /// Parse a connection string into a typed database location
    ///
    /// # Errors
    ///
    /// Returns an error for URL schemes other than `sqlite:`.
    pub fn parse(url: &str) -> Result<Self> {
        if url == "sqlite::memory:" || url == ":memory:" {
            return Ok(Self::Memory);
        }
        if let Some(path) = url.strip_prefix("sqlite:") {
            return Ok(Self::SQLite {
                path: PathBuf::from(path),
            });
        }
        anyhow::bail!("Unsupported database URL (expected sqlite:<path>): {url}")
    }

    /// Connection string for the store layer
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".into(),
        }
    }
}

/// External completion-service configuration
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Base URL of the chat-completions API
    pub base_url: String,
    /// Bearer token; analysis fails soft when unset
    pub api_key: Option<String>,
    /// Model identifier sent with every request
    pub model: String,
}

impl AiConfig {
    /// Read configuration from `MISTRAL_API_URL`, `MISTRAL_API_KEY`, `MISTRAL_MODEL`
    #[must_use]
    pub fn from_env() -> Self {
        let api_key = env::var("MISTRAL_API_KEY").ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!("MISTRAL_API_KEY is not set; ticket analysis will be skipped");
        }
        Self {
            base_url: env::var("MISTRAL_API_URL").unwrap_or_else(|_| DEFAULT_AI_BASE_URL.into()),
            api_key,
            model: env::var("MISTRAL_MODEL").unwrap_or_else(|_| DEFAULT_AI_MODEL.into()),
        }
    }
}

/// Token issuing configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: Vec<u8>,
    /// Token lifetime in hours
    pub token_expiry_hours: i64,
}

impl AuthConfig {
    /// Read configuration from `HELPDESK_JWT_SECRET` and `HELPDESK_TOKEN_EXPIRY_HOURS`
    ///
    /// A missing secret is replaced with a random one, which invalidates all
    /// sessions on restart.
    #[must_use]
    pub fn from_env() -> Self {
        let jwt_secret = match env::var("HELPDESK_JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret.into_bytes(),
            _ => {
                warn!("HELPDESK_JWT_SECRET is not set; generating an ephemeral secret");
                crate::auth::generate_jwt_secret().to_vec()
            }
        };
        let token_expiry_hours = env::var("HELPDESK_TOKEN_EXPIRY_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_EXPIRY_HOURS);
        Self {
            jwt_secret,
            token_expiry_hours,
        }
    }
}

/// Complete server configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Log level
    pub log_level: LogLevel,
    /// Database location
    pub database_url: DatabaseUrl,
    /// Completion-service settings
    pub ai: AiConfig,
    /// Token settings
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load the full configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `HTTP_PORT` or `DATABASE_URL` cannot be parsed.
    pub fn from_env() -> crate::errors::AppResult<Self> {
        Self::from_env_inner().map_err(|e| crate::errors::AppError::config(e.to_string()))
    }

    fn from_env_inner() -> Result<Self> {
        let http_port = match env::var("HTTP_PORT") {
            Ok(port) => port
                .parse()
                .with_context(|| format!("Invalid HTTP_PORT: {port}"))?,
            Err(_) => DEFAULT_HTTP_PORT,
        };

        let environment = Environment::from_str_or_default(
            &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        );

        let log_level =
            LogLevel::from_str_or_default(&env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));

        let database_url = DatabaseUrl::parse(
            &env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into()),
        )
        .context("Failed to parse DATABASE_URL")?;

        Ok(Self {
            http_port,
            environment,
            log_level,
            database_url,
            ai: AiConfig::from_env(),
            auth: AuthConfig::from_env(),
        })
    }

    /// One-line configuration summary for startup logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "environment={} port={} database={} model={} api_key={}",
            self.environment,
            self.http_port,
            self.database_url.to_connection_string(),
            self.ai.model,
            if self.ai.api_key.is_some() {
                "configured"
            } else {
                "missing"
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_parse() {
        match DatabaseUrl::parse("sqlite:data/helpdesk.db").unwrap() {
            DatabaseUrl::SQLite { path } => {
                assert_eq!(path, PathBuf::from("data/helpdesk.db"));
            }
            DatabaseUrl::Memory => panic!("expected file-backed database"),
        }
        assert!(matches!(
            DatabaseUrl::parse("sqlite::memory:").unwrap(),
            DatabaseUrl::Memory
        ));
        assert!(DatabaseUrl::parse("postgres://localhost/helpdesk").is_err());
    }

    #[test]
    fn test_connection_string_round_trip() {
        let url = DatabaseUrl::parse("sqlite:helpdesk.db").unwrap();
        assert_eq!(url.to_connection_string(), "sqlite:helpdesk.db");
        assert_eq!(DatabaseUrl::Memory.to_connection_string(), "sqlite::memory:");
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("prod"),
            Environment::Production
        );
        assert_eq!(
            Environment::from_str_or_default("anything"),
            Environment::Development
        );
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_log_level_fallback() {
        assert_eq!(LogLevel::from_str_or_default("warn"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str_or_default("nope"), LogLevel::Info);
    }
}
