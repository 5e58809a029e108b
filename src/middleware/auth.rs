// ABOUTME: Request authentication middleware for bearer-token validation
// ABOUTME: Supplies the acting account's identity and role to every handler
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::Arc;

use axum::http::HeaderMap;
use uuid::Uuid;

use crate::auth::{AuthManager, JwtValidationError};
use crate::database_plugins::factory::Database;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::models::UserRole;

/// Authentication result with user context
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// Authenticated user `ID`
    pub user_id: Uuid,
    /// Account email
    pub email: String,
    /// Current account role, read from the store on every request
    pub role: UserRole,
}

impl AuthResult {
    /// Require an agent or admin role
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` for plain end users.
    pub fn require_staff(&self) -> AppResult<()> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(AppError::permission_denied("Access denied"))
        }
    }

    /// Require an admin role
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` for non-admin accounts.
    pub fn require_admin(&self) -> AppResult<()> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(AppError::permission_denied("Access denied"))
        }
    }
}

/// Middleware for request authentication
///
/// Extracts the bearer token from the `Authorization` header, validates it,
/// and loads the account so deactivations take effect immediately.
#[derive(Clone)]
pub struct AuthMiddleware {
    auth_manager: Arc<AuthManager>,
    database: Arc<Database>,
}

impl AuthMiddleware {
    /// Create new auth middleware
    #[must_use]
    pub fn new(auth_manager: Arc<AuthManager>, database: Arc<Database>) -> Self {
        Self {
            auth_manager,
            database,
        }
    }

    /// Authenticate a request from its headers
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The `Authorization` header is missing or not a bearer token
    /// - Token validation fails
    /// - The account no longer exists or has been deactivated
    pub async fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        let header = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(AppError::auth_required)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::auth_invalid("Expected a bearer token"))?;

        let claims = self.auth_manager.validate_token(token).map_err(|error| {
            tracing::debug!("Token validation failed: {error}");
            match error {
                JwtValidationError::TokenExpired => AppError::auth_expired(),
                JwtValidationError::TokenInvalid { .. }
                | JwtValidationError::TokenMalformed { .. } => {
                    AppError::auth_invalid(error.to_string())
                }
            }
        })?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Token subject is not a valid user id"))?;

        let user = self
            .database
            .get_user(user_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::auth_invalid("Unknown account"))?;

        if !user.is_active {
            return Err(AppError::auth_invalid("Account is deactivated"));
        }

        Ok(AuthResult {
            user_id: user.id,
            email: user.email,
            role: user.role,
        })
    }
}
