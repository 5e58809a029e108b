// ABOUTME: Admin route handlers for user management and dashboard statistics
// ABOUTME: All endpoints require the admin role
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Admin routes
//!
//! User administration (role changes, deactivation, agent provisioning) and
//! the aggregated statistics backing the admin dashboard.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::hash_password;
use crate::database::{CategoryCount, PriorityCount, TicketStatusCounts, UserCounts};
use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::models::{Ticket, User, UserRole};
use crate::pagination::{PaginationParams, PaginationSummary, DEFAULT_PAGE_SIZE};
use crate::resources::ServerResources;

/// Number of recent tickets on the dashboard
const RECENT_TICKETS: i64 = 5;

/// Query parameters for the user listing
#[derive(Debug, Deserialize, Default)]
pub struct ListUsersQuery {
    pub role: Option<String>,
    /// `active` / `inactive`
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Request to update a user's role or active flag
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// Request to provision an agent account
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Response for user listings
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
    pub pagination: PaginationSummary,
}

/// Aggregated dashboard statistics
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub tickets: TicketStatusCounts,
    pub users: UserCounts,
    pub by_category: Vec<CategoryCount>,
    pub by_priority: Vec<PriorityCount>,
}

/// Response for the statistics endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub stats: DashboardStats,
    pub recent_tickets: Vec<Ticket>,
}

/// Admin routes handler
pub struct AdminRoutes;

impl AdminRoutes {
    /// Create all admin routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/admin/users", get(Self::list_users))
            .route("/api/admin/users/agent", post(Self::create_agent))
            .route("/api/admin/users/:user_id", put(Self::update_user))
            .route("/api/admin/stats", get(Self::stats))
            .with_state(resources)
    }

    /// List accounts with optional role and status filters
    async fn list_users(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Query(query): Query<ListUsersQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(&headers).await?;
        auth.require_admin()?;

        let role = match query.role.as_deref() {
            None | Some("all") => None,
            Some(role) => Some(
                role.parse::<UserRole>()
                    .map_err(|e| AppError::invalid_input(format!("Invalid role: {e}")))?,
            ),
        };
        let is_active = match query.status.as_deref() {
            Some("active") => Some(true),
            Some("inactive") => Some(false),
            _ => None,
        };
        let params = PaginationParams {
            page: query.page.unwrap_or(1),
            limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        };

        let users = resources
            .database
            .list_users(role, is_active, params.limit(), params.offset())
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        let total = resources
            .database
            .count_users(role, is_active)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let response = UserListResponse {
            users,
            pagination: PaginationSummary::new(&params, total),
        };
        Ok(Json(response).into_response())
    }

    /// Update a user's role or active flag
    async fn update_user(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(user_id): Path<Uuid>,
        Json(request): Json<UpdateUserRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(&headers).await?;
        auth.require_admin()?;

        resources
            .database
            .get_user(user_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found("User"))?;

        // Admins cannot lock themselves out
        if user_id == auth.user_id && request.is_active == Some(false) {
            return Err(AppError::invalid_input(
                "Cannot deactivate your own account",
            ));
        }

        let role = request
            .role
            .as_deref()
            .map(str::parse::<UserRole>)
            .transpose()
            .map_err(|e| AppError::invalid_input(format!("Invalid role: {e}")))?;

        let user = resources
            .database
            .update_user(user_id, role, request.is_active)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok(Json(serde_json::json!({
            "message": "User updated successfully",
            "user": user
        }))
        .into_response())
    }

    /// Provision an agent account
    async fn create_agent(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Json(request): Json<CreateAgentRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(&headers).await?;
        auth.require_admin()?;

        let name = required(request.name, "name")?;
        let email = required(request.email, "email")?;
        let password = required(request.password, "password")?;
        let confirm_password = required(request.confirm_password, "confirmPassword")?;

        if password != confirm_password {
            return Err(AppError::invalid_input("Passwords do not match"));
        }

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
        let agent = User::new(name, email, password_hash, UserRole::Agent);

        resources
            .database
            .create_user(&agent)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Agent created successfully",
                "agent": agent
            })),
        )
            .into_response())
    }

    /// Aggregated dashboard statistics
    async fn stats(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(&headers).await?;
        auth.require_admin()?;

        let database = &resources.database;
        let tickets = database
            .ticket_status_counts()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        let users = database
            .user_counts()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        let by_category = database
            .tickets_by_category()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        let by_priority = database
            .tickets_by_priority()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        let recent_tickets = database
            .recent_tickets(RECENT_TICKETS)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let response = StatsResponse {
            stats: DashboardStats {
                tickets,
                users,
                by_category,
                by_priority,
            },
            recent_tickets,
        };
        Ok(Json(response).into_response())
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::missing_field(field)),
    }
}
