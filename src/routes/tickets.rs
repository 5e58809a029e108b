// ABOUTME: Ticket route handlers for creation, listing, detail, and manual updates
// ABOUTME: Creation runs the resolution workflow synchronously within the request
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Ticket routes
//!
//! Creation validates input, persists the ticket, and runs AI analysis
//! before responding; the caller blocks until analysis completes or fails.
//! Listing is split between an owner view and a staff view with filters.

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

use crate::database::TicketFilter;
use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::models::{
    AuditLogEntry, Ticket, TicketPriority, TicketStatus, UserRole, MAX_TEXT_LEN, MAX_TITLE_LEN,
};
use crate::pagination::{PaginationParams, PaginationSummary, DEFAULT_PAGE_SIZE};
use crate::resources::ServerResources;
use crate::workflow::{NewTicket, TicketUpdate};

/// Request to create a ticket
#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
}

/// Request to update a ticket (agent/admin only)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    pub status: Option<String>,
    pub resolution: Option<String>,
    pub assigned_to: Option<Uuid>,
}

/// Query parameters for the staff ticket listing
#[derive(Debug, Deserialize, Default)]
pub struct ListTicketsQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Query parameters for the owner ticket listing
#[derive(Debug, Deserialize, Default)]
pub struct MyTicketsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Response for a single-ticket mutation
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub message: String,
    pub ticket: Ticket,
}

/// Response for ticket listings
#[derive(Debug, Serialize)]
pub struct TicketListResponse {
    pub tickets: Vec<Ticket>,
    pub pagination: PaginationSummary,
}

/// Response for ticket detail, including the audit trail
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetailResponse {
    pub ticket: Ticket,
    pub audit_logs: Vec<AuditLogEntry>,
}

/// Ticket routes handler
pub struct TicketRoutes;

impl TicketRoutes {
    /// Create all ticket routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/tickets", post(Self::create_ticket))
            .route("/api/tickets", get(Self::list_tickets))
            .route("/api/tickets/my-tickets", get(Self::my_tickets))
            .route("/api/tickets/:ticket_id", get(Self::get_ticket))
            .route("/api/tickets/:ticket_id", put(Self::update_ticket))
            .with_state(resources)
    }

    /// Create a ticket and run the resolution workflow
    async fn create_ticket(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Json(request): Json<CreateTicketRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(&headers).await?;
        let params = validate_new_ticket(request)?;

        let ticket = resources.workflow.create_ticket(auth.user_id, params).await?;

        let response = TicketResponse {
            message: "Ticket created successfully".into(),
            ticket,
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// List the caller's own tickets
    async fn my_tickets(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Query(query): Query<MyTicketsQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(&headers).await?;
        let params = pagination(query.page, query.limit);

        let tickets = resources
            .database
            .list_tickets_for_user(auth.user_id, params.limit(), params.offset())
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        let total = resources
            .database
            .count_tickets_for_user(auth.user_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let response = TicketListResponse {
            tickets,
            pagination: PaginationSummary::new(&params, total),
        };
        Ok(Json(response).into_response())
    }

    /// List all tickets with filters (agent/admin)
    async fn list_tickets(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Query(query): Query<ListTicketsQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(&headers).await?;
        auth.require_staff()?;

        let filter = TicketFilter {
            status: parse_filter::<TicketStatus>(query.status.as_deref(), "status")?,
            priority: parse_filter::<TicketPriority>(query.priority.as_deref(), "priority")?,
            category: query.category.filter(|c| c != "all"),
        };
        let params = pagination(query.page, query.limit);

        let tickets = resources
            .database
            .list_tickets(&filter, params.limit(), params.offset())
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        let total = resources
            .database
            .count_tickets(&filter)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let response = TicketListResponse {
            tickets,
            pagination: PaginationSummary::new(&params, total),
        };
        Ok(Json(response).into_response())
    }

    /// Fetch a ticket together with its audit trail
    async fn get_ticket(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(ticket_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(&headers).await?;

        let ticket = resources
            .database
            .get_ticket(ticket_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found("Ticket"))?;

        // Plain users may only read their own tickets
        if auth.role == UserRole::User && ticket.user_id != auth.user_id {
            return Err(AppError::permission_denied("Access denied"));
        }

        let audit_logs = resources
            .database
            .list_audit_for_ticket(ticket.id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let response = TicketDetailResponse { ticket, audit_logs };
        Ok(Json(response).into_response())
    }

    /// Apply a manual update (agent/admin)
    async fn update_ticket(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(ticket_id): Path<Uuid>,
        Json(request): Json<UpdateTicketRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(&headers).await?;
        auth.require_staff()?;

        let update = TicketUpdate {
            status: request
                .status
                .as_deref()
                .map(str::parse)
                .transpose()
                .map_err(AppError::invalid_input)?,
            resolution: validate_len(request.resolution, "resolution", MAX_TEXT_LEN)?,
            assigned_to: request.assigned_to,
        };

        let ticket = resources
            .workflow
            .apply_update(ticket_id, auth.user_id, auth.role, update)
            .await?;

        let response = TicketResponse {
            message: "Ticket updated successfully".into(),
            ticket,
        };
        Ok(Json(response).into_response())
    }
}

/// Validate the creation payload into workflow input
fn validate_new_ticket(request: CreateTicketRequest) -> Result<NewTicket, AppError> {
    let title = required(request.title, "title")?;
    let description = required(request.description, "description")?;
    let category = required(request.category, "category")?;
    let priority = required(request.priority, "priority")?
        .parse::<TicketPriority>()
        .map_err(AppError::invalid_input)?;

    if title.len() > MAX_TITLE_LEN {
        return Err(AppError::invalid_input(format!(
            "Title cannot exceed {MAX_TITLE_LEN} characters"
        )));
    }
    if description.len() > MAX_TEXT_LEN {
        return Err(AppError::invalid_input(format!(
            "Description cannot exceed {MAX_TEXT_LEN} characters"
        )));
    }

    Ok(NewTicket {
        title,
        description,
        category,
        priority,
    })
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::missing_field(field)),
    }
}

fn validate_len(
    value: Option<String>,
    field: &str,
    max: usize,
) -> Result<Option<String>, AppError> {
    match value {
        Some(value) if value.len() > max => Err(AppError::invalid_input(format!(
            "{field} cannot exceed {max} characters"
        ))),
        other => Ok(other),
    }
}

/// Parse an optional filter value, treating `all` as no filter
fn parse_filter<T: std::str::FromStr<Err = String>>(
    value: Option<&str>,
    field: &str,
) -> Result<Option<T>, AppError> {
    match value {
        None => Ok(None),
        Some("all") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e: String| AppError::invalid_input(format!("Invalid {field}: {e}"))),
    }
}

/// Build pagination parameters from optional query values
fn pagination(page: Option<i64>, limit: Option<i64>) -> PaginationParams {
    PaginationParams {
        page: page.unwrap_or(1),
        limit: limit.unwrap_or(DEFAULT_PAGE_SIZE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_new_ticket_requires_all_fields() {
        let request = CreateTicketRequest {
            title: Some("Payment missing".into()),
            description: None,
            category: Some("billing".into()),
            priority: Some("high".into()),
        };
        assert!(validate_new_ticket(request).is_err());
    }

    #[test]
    fn test_validate_new_ticket_rejects_bad_priority() {
        let request = CreateTicketRequest {
            title: Some("t".into()),
            description: Some("d".into()),
            category: Some("billing".into()),
            priority: Some("critical".into()),
        };
        assert!(validate_new_ticket(request).is_err());
    }

    #[test]
    fn test_validate_new_ticket_rejects_oversized_title() {
        let request = CreateTicketRequest {
            title: Some("x".repeat(MAX_TITLE_LEN + 1)),
            description: Some("d".into()),
            category: Some("billing".into()),
            priority: Some("low".into()),
        };
        assert!(validate_new_ticket(request).is_err());
    }

    #[test]
    fn test_parse_filter_all_is_none() {
        let parsed: Option<TicketStatus> = parse_filter(Some("all"), "status").unwrap();
        assert!(parsed.is_none());
        let parsed: Option<TicketStatus> = parse_filter(Some("closed"), "status").unwrap();
        assert_eq!(parsed, Some(TicketStatus::Closed));
        assert!(parse_filter::<TicketStatus>(Some("nope"), "status").is_err());
    }
}
