// ABOUTME: Audit-trail read route handlers
// ABOUTME: Per-ticket trail for any role, filtered global listing for admins
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Audit routes
//!
//! The audit trail is read-only over HTTP; no mutation endpoint exists.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::models::{ActorType, AuditAction, AuditLogEntry};
use crate::pagination::{PaginationParams, PaginationSummary};
use crate::resources::ServerResources;

/// Default page size for the global audit listing
const AUDIT_PAGE_SIZE: i64 = 20;

/// Query parameters for the global audit listing
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListAuditQuery {
    pub action: Option<String>,
    pub performed_by_type: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Response for the per-ticket trail
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketAuditResponse {
    pub audit_logs: Vec<AuditLogEntry>,
}

/// Response for the global listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditListResponse {
    pub audit_logs: Vec<AuditLogEntry>,
    pub pagination: PaginationSummary,
}

/// Audit routes handler
pub struct AuditRoutes;

impl AuditRoutes {
    /// Create all audit routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/audit", get(Self::list_entries))
            .route("/api/audit/ticket/:ticket_id", get(Self::ticket_trail))
            .with_state(resources)
    }

    /// All entries for one ticket, newest first
    async fn ticket_trail(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(ticket_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        resources.auth_middleware.authenticate(&headers).await?;

        let audit_logs = resources
            .database
            .list_audit_for_ticket(ticket_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok(Json(TicketAuditResponse { audit_logs }).into_response())
    }

    /// Filtered listing across all tickets (admin)
    async fn list_entries(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Query(query): Query<ListAuditQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(&headers).await?;
        auth.require_admin()?;

        let action = parse_filter::<AuditAction>(query.action.as_deref(), "action")?;
        let performed_by_type =
            parse_filter::<ActorType>(query.performed_by_type.as_deref(), "performedByType")?;
        let params = PaginationParams {
            page: query.page.unwrap_or(1),
            limit: query.limit.unwrap_or(AUDIT_PAGE_SIZE),
        };

        let audit_logs = resources
            .database
            .list_audit_entries(action, performed_by_type, params.limit(), params.offset())
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        let total = resources
            .database
            .count_audit_entries(action, performed_by_type)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let response = AuditListResponse {
            audit_logs,
            pagination: PaginationSummary::new(&params, total),
        };
        Ok(Json(response).into_response())
    }
}

/// Parse an optional filter value, treating `all` as no filter
fn parse_filter<T: std::str::FromStr<Err = String>>(
    value: Option<&str>,
    field: &str,
) -> Result<Option<T>, AppError> {
    match value {
        None | Some("all") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e: String| AppError::invalid_input(format!("Invalid {field}: {e}"))),
    }
}
