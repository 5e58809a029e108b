// ABOUTME: Registration and login route handlers
// ABOUTME: Issues JWT tokens consumed by every other API domain
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Authentication routes
//!
//! Registration always creates plain end-user accounts; agents are created
//! through the admin API.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{hash_password, verify_password};
use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::models::{User, UserRole};
use crate::resources::ServerResources;

/// Registration request payload
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Token response returned by both endpoints
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: User,
}

/// Authentication routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::register))
            .route("/api/auth/login", post(Self::login))
            .with_state(resources)
    }

    /// Create an end-user account and issue a token
    async fn register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        let name = required_field(request.name, "name")?;
        let email = required_field(request.email, "email")?;
        let password = required_field(request.password, "password")?;

        if resources
            .database
            .get_user_by_email(&email)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .is_some()
        {
            return Err(AppError::already_exists("Email already registered"));
        }

        let password_hash =
            hash_password(&password).map_err(|e| AppError::internal(e.to_string()))?;
        let user = User::new(name, email, password_hash, UserRole::User);

        resources
            .database
            .create_user(&user)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        info!(user_id = %user.id, "User registered");

        let token = resources
            .auth_manager
            .generate_token(&user)
            .map_err(|e| AppError::internal(e.to_string()))?;

        let response = AuthResponse {
            message: "Registration successful".into(),
            token,
            user,
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Verify credentials and issue a token
    async fn login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let email = required_field(request.email, "email")?;
        let password = required_field(request.password, "password")?;

        let user = resources
            .database
            .get_user_by_email(&email)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::auth_invalid("Invalid email or password"))?;

        if !verify_password(&password, &user.password_hash) {
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        if !user.is_active {
            return Err(AppError::auth_invalid("Account is deactivated"));
        }

        resources
            .database
            .update_last_active(user.id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let token = resources
            .auth_manager
            .generate_token(&user)
            .map_err(|e| AppError::internal(e.to_string()))?;

        let response = AuthResponse {
            message: "Login successful".into(),
            token,
            user,
        };
        Ok(Json(response).into_response())
    }
}

/// Reject empty or missing request fields
fn required_field(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::missing_field(field)),
    }
}
