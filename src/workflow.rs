// ABOUTME: Ticket resolution workflow orchestrating intake, analysis, and audit
// ABOUTME: State machine over ticket status with the auto-resolution policy
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Ticket Resolution Workflow
//!
//! Orchestrates ticket intake and the auto-resolution decision. Every state
//! transition of a ticket corresponds to exactly one audit entry; the audit
//! trail is the sole authoritative history of a ticket.
//!
//! States: `open` (initial) → `in-progress` (analysis attempted or low
//! confidence) → `closed` (terminal, via AI or agent).
//!
//! A failed analysis never fails ticket creation: the ticket is forced to
//! in-progress and the error goes to operator diagnostics only.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::ai::TicketAnalyzer;
use crate::database_plugins::factory::Database;
use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::models::{
    ActorType, AuditAction, AuditLogEntry, ResolvedBy, Ticket, TicketPriority, TicketStatus,
    UserRole, MAX_TEXT_LEN,
};

/// Analysis confidence at or above which a ticket auto-resolves
pub const AUTO_RESOLVE_THRESHOLD: f64 = 0.8;

/// Validated input for ticket creation
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: TicketPriority,
}

/// Fields an agent or admin may change on a ticket
#[derive(Debug, Clone, Default)]
pub struct TicketUpdate {
    pub status: Option<TicketStatus>,
    pub resolution: Option<String>,
    pub assigned_to: Option<Uuid>,
}

/// Orchestrates the ticket lifecycle
///
/// Constructed once at startup with its dependencies injected; there is no
/// ambient singleton.
pub struct TicketResolutionWorkflow {
    database: Arc<Database>,
    analyzer: Arc<TicketAnalyzer>,
}

impl TicketResolutionWorkflow {
    /// Create a new workflow over the given store and analyzer
    #[must_use]
    pub fn new(database: Arc<Database>, analyzer: Arc<TicketAnalyzer>) -> Self {
        Self { database, analyzer }
    }

    /// Create a ticket and run the auto-resolution pipeline
    ///
    /// The ticket is persisted in `open`, its creation is audited, and the
    /// analyzer runs synchronously within the same request. The caller gets
    /// the final ticket state back whether or not analysis succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error only for store write failures; analysis failures are
    /// absorbed by forcing the ticket to in-progress.
    #[instrument(skip(self, params), fields(user_id = %creator, category = %params.category))]
    pub async fn create_ticket(
        &self,
        creator: Uuid,
        params: NewTicket,
    ) -> Result<Ticket, AppError> {
        let mut ticket = Ticket::new(
            creator,
            params.title,
            params.description,
            params.category,
            params.priority,
        );

        self.database
            .create_ticket(&ticket)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        // Creation entries carry the agent actor label regardless of the
        // creator's role, matching the labeling the dashboards filter on.
        self.append_entry(
            AuditLogEntry::new(
                ticket.id,
                AuditAction::TicketCreated,
                ActorType::Agent,
                format!("Ticket created: {}", ticket.title),
            )
            .with_performed_by(creator),
        )
        .await?;

        if let Err(error) = self.run_analysis(&mut ticket).await {
            warn!(ticket_id = %ticket.id, %error, "AI analysis failed");
            ticket.status = TicketStatus::InProgress;
            self.database
                .update_ticket(&ticket)
                .await
                .map_err(|e| AppError::database(e.to_string()))?;
        }

        Ok(ticket)
    }

    /// Analyze the ticket and apply the auto-resolution policy
    async fn run_analysis(&self, ticket: &mut Ticket) -> Result<(), AppError> {
        let outcome = self.analyzer.analyze(ticket).await?;
        let analysis = outcome.analysis();

        let mut details = if analysis.response.is_empty() {
            "AI analysis response unavailable".to_owned()
        } else {
            analysis.response.clone()
        };
        if details.chars().count() > MAX_TEXT_LEN {
            details = details.chars().take(MAX_TEXT_LEN).collect();
        }

        self.append_entry(
            AuditLogEntry::new(
                ticket.id,
                AuditAction::AiAnalysis,
                ActorType::Ai,
                details.clone(),
            )
            .with_confidence(analysis.confidence)
            .with_metadata(json!({
                "reasoning": analysis.reasoning,
                "suggestedActions": analysis.suggested_actions,
            })),
        )
        .await?;

        if analysis.confidence >= AUTO_RESOLVE_THRESHOLD {
            ticket.status = TicketStatus::Closed;
            ticket.resolution = Some(details);
            ticket.resolved_by = Some(ResolvedBy::Ai);
            ticket.resolved_at = Some(Utc::now());
            ticket.ai_confidence = Some(analysis.confidence);
            self.database
                .update_ticket(ticket)
                .await
                .map_err(|e| AppError::database(e.to_string()))?;

            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let percent = (analysis.confidence * 100.0).round() as u32;
            self.append_entry(
                AuditLogEntry::new(
                    ticket.id,
                    AuditAction::TicketClosed,
                    ActorType::Ai,
                    format!("Ticket auto-resolved by AI with {percent}% confidence"),
                )
                .with_confidence(analysis.confidence),
            )
            .await?;

            info!(ticket_id = %ticket.id, confidence = analysis.confidence, "Ticket auto-resolved");
        } else {
            ticket.status = TicketStatus::InProgress;
            ticket.ai_confidence = Some(analysis.confidence);
            self.database
                .update_ticket(ticket)
                .await
                .map_err(|e| AppError::database(e.to_string()))?;

            debug!(ticket_id = %ticket.id, confidence = analysis.confidence, "Ticket left for human handling");
        }

        Ok(())
    }

    /// Apply a manual agent/admin update to a ticket
    ///
    /// Closing a ticket whose `resolved_at` is unset stamps the resolution
    /// time and credits the agent. Exactly one `status_updated` entry is
    /// appended regardless of which fields changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticket does not exist, the update would close
    /// the ticket without any resolution, or a store write fails.
    #[instrument(skip(self, update), fields(ticket_id = %ticket_id, actor = %actor_id))]
    pub async fn apply_update(
        &self,
        ticket_id: Uuid,
        actor_id: Uuid,
        actor_role: UserRole,
        update: TicketUpdate,
    ) -> Result<Ticket, AppError> {
        let mut ticket = self
            .database
            .get_ticket(ticket_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found("Ticket"))?;

        let mut changes = serde_json::Map::new();

        if let Some(status) = update.status {
            ticket.status = status;
            changes.insert("status".into(), json!(status));
        }
        if let Some(resolution) = update.resolution {
            changes.insert("resolution".into(), json!(resolution));
            ticket.resolution = Some(resolution);
        }
        if let Some(assigned_to) = update.assigned_to {
            ticket.assigned_to = Some(assigned_to);
            changes.insert("assignedTo".into(), json!(assigned_to));
        }

        if ticket.status == TicketStatus::Closed {
            if ticket.resolution.as_deref().unwrap_or("").is_empty() {
                return Err(AppError::invalid_input(
                    "A resolution is required to close a ticket",
                ));
            }
            if ticket.resolved_at.is_none() {
                let now = Utc::now();
                ticket.resolved_at = Some(now);
                ticket.resolved_by = Some(ResolvedBy::Agent);
                changes.insert("resolvedAt".into(), json!(now));
                changes.insert("resolvedBy".into(), json!(ResolvedBy::Agent));
            }
        }

        self.database
            .update_ticket(&ticket)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        self.append_entry(
            AuditLogEntry::new(
                ticket.id,
                AuditAction::StatusUpdated,
                ActorType::from(actor_role),
                format!(
                    "Ticket updated: {}",
                    serde_json::Value::Object(changes)
                ),
            )
            .with_performed_by(actor_id),
        )
        .await?;

        Ok(ticket)
    }

    async fn append_entry(&self, entry: AuditLogEntry) -> Result<(), AppError> {
        self.database
            .append_audit_entry(&entry)
            .await
            .map_err(|e| AppError::database(e.to_string()))
    }
}
