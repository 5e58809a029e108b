// ABOUTME: Core data models and types for the helpdesk platform
// ABOUTME: Defines Ticket, KnowledgeBaseArticle, AuditLogEntry, User and related enums
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! This module contains the core data structures used throughout the helpdesk
//! server.
//!
//! ## Design Principles
//!
//! - **Serializable**: All models use the camelCase wire format the dashboard
//!   UI consumes
//! - **Type Safe**: Status, priority, role, and audit-action values are enums,
//!   never free strings
//!
//! ## Core Models
//!
//! - `Ticket`: A user-submitted support request tracked through its lifecycle
//! - `KnowledgeBaseArticle`: Curated reference content grouped by category
//! - `AuditLogEntry`: Append-only record of an action taken on a ticket
//! - `User`: An account with a `user`/`agent`/`admin` role

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of a ticket or article title
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum length of a ticket description, resolution, or audit details field
pub const MAX_TEXT_LEN: usize = 2_000;

/// Maximum length of knowledge-base article content
pub const MAX_ARTICLE_LEN: usize = 10_000;

// ============================================================================
// Tickets
// ============================================================================

/// Lifecycle status of a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Newly created, pre-analysis
    #[serde(rename = "open")]
    Open,
    /// Analysis attempted or low confidence; awaiting human handling
    #[serde(rename = "in-progress")]
    InProgress,
    /// Terminal, resolved by AI or an agent
    #[serde(rename = "closed")]
    Closed,
}

impl TicketStatus {
    /// String representation matching the stored and wire value
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in-progress",
            Self::Closed => "closed",
        }
    }
}

impl Display for TicketStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in-progress" => Ok(Self::InProgress),
            "closed" => Ok(Self::Closed),
            other => Err(format!("Unknown ticket status: {other}")),
        }
    }
}

/// Priority assigned to a ticket at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    /// String representation matching the stored and wire value
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl Display for TicketPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(format!("Unknown ticket priority: {other}")),
        }
    }
}

/// Who resolved a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolvedBy {
    /// Auto-resolved by the analysis workflow
    #[serde(rename = "AI")]
    Ai,
    /// Resolved manually by a staff member
    #[serde(rename = "agent")]
    Agent,
}

impl ResolvedBy {
    /// String representation matching the stored and wire value
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "AI",
            Self::Agent => "agent",
        }
    }
}

impl FromStr for ResolvedBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AI" => Ok(Self::Ai),
            "agent" => Ok(Self::Agent),
            other => Err(format!("Unknown resolver: {other}")),
        }
    }
}

/// A user-submitted support request
///
/// A ticket reaches `closed` only with a non-empty resolution and a resolver
/// set. Tickets are never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Unique ticket identifier
    pub id: Uuid,
    /// Owner who filed the ticket
    pub user_id: Uuid,
    /// Short summary of the problem
    pub title: String,
    /// Full problem description
    pub description: String,
    /// Category code (open set: `technical`, `billing`, `account`, ...)
    pub category: String,
    /// Priority assigned at creation
    pub priority: TicketPriority,
    /// Current lifecycle status
    pub status: TicketStatus,
    /// Agent assigned to the ticket, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Uuid>,
    /// Confidence reported by the last AI analysis (0.0-1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_confidence: Option<f64>,
    /// Resolution text, present once the ticket is closed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Who resolved the ticket
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<ResolvedBy>,
    /// When the ticket was resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    /// When the ticket was created
    pub created_at: DateTime<Utc>,
    /// When the ticket was last modified
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Create a new open ticket owned by `user_id`
    #[must_use]
    pub fn new(
        user_id: Uuid,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        priority: TicketPriority,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description: description.into(),
            category: category.into(),
            priority,
            status: TicketStatus::Open,
            assigned_to: None,
            ai_confidence: None,
            resolution: None,
            resolved_by: None,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Knowledge Base
// ============================================================================

/// A curated reference article used as grounding context for AI analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBaseArticle {
    /// Unique article identifier
    pub id: Uuid,
    /// Article title
    pub title: String,
    /// Article body
    pub content: String,
    /// Category code the article applies to
    pub category: String,
    /// Free-form tags for search
    pub tags: Vec<String>,
    /// Admin who created the article
    pub created_by: Uuid,
    /// Inactive articles are hidden from readers and from AI context
    pub is_active: bool,
    /// Read counter, incremented on single-article fetch
    pub views: i64,
    /// When the article was created
    pub created_at: DateTime<Utc>,
    /// When the article was last modified
    pub updated_at: DateTime<Utc>,
}

impl KnowledgeBaseArticle {
    /// Create a new active article
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
        tags: Vec<String>,
        created_by: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            category: category.into(),
            tags,
            created_by,
            is_active: true,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Audit Log
// ============================================================================

/// Action recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    TicketCreated,
    AiAnalysis,
    AgentAssigned,
    StatusUpdated,
    ResponseAdded,
    TicketClosed,
    TicketReopened,
}

impl AuditAction {
    /// String representation matching the stored and wire value
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TicketCreated => "ticket_created",
            Self::AiAnalysis => "ai_analysis",
            Self::AgentAssigned => "agent_assigned",
            Self::StatusUpdated => "status_updated",
            Self::ResponseAdded => "response_added",
            Self::TicketClosed => "ticket_closed",
            Self::TicketReopened => "ticket_reopened",
        }
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ticket_created" => Ok(Self::TicketCreated),
            "ai_analysis" => Ok(Self::AiAnalysis),
            "agent_assigned" => Ok(Self::AgentAssigned),
            "status_updated" => Ok(Self::StatusUpdated),
            "response_added" => Ok(Self::ResponseAdded),
            "ticket_closed" => Ok(Self::TicketClosed),
            "ticket_reopened" => Ok(Self::TicketReopened),
            other => Err(format!("Unknown audit action: {other}")),
        }
    }
}

/// Kind of actor that performed an audited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorType {
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "agent")]
    Agent,
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "system")]
    System,
    #[serde(rename = "user")]
    User,
}

impl ActorType {
    /// String representation matching the stored and wire value
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "AI",
            Self::Agent => "agent",
            Self::Admin => "admin",
            Self::System => "system",
            Self::User => "user",
        }
    }
}

impl FromStr for ActorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AI" => Ok(Self::Ai),
            "agent" => Ok(Self::Agent),
            "admin" => Ok(Self::Admin),
            "system" => Ok(Self::System),
            "user" => Ok(Self::User),
            other => Err(format!("Unknown actor type: {other}")),
        }
    }
}

impl From<UserRole> for ActorType {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::User => Self::User,
            UserRole::Agent => Self::Agent,
            UserRole::Admin => Self::Admin,
        }
    }
}

/// One append-only record of an action taken on a ticket
///
/// Entries are created exactly once per workflow step and never updated or
/// deleted. The `details` field is human-readable text that may contain one
/// serialized JSON object for dashboard consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Unique entry identifier
    pub id: Uuid,
    /// Ticket the entry belongs to
    pub ticket_id: Uuid,
    /// What happened
    pub action: AuditAction,
    /// Acting user, when one exists (AI/system entries have none)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performed_by: Option<Uuid>,
    /// Kind of actor that performed the action
    pub performed_by_type: ActorType,
    /// Human-readable description of the action
    pub details: String,
    /// Analysis confidence attached to AI entries (0.0-1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Opaque structured payload attached to the entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// When the entry was recorded
    pub created_at: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Create a new entry for `ticket_id`
    ///
    /// Details longer than [`MAX_TEXT_LEN`] characters are truncated.
    #[must_use]
    pub fn new(
        ticket_id: Uuid,
        action: AuditAction,
        performed_by_type: ActorType,
        details: impl Into<String>,
    ) -> Self {
        let mut details: String = details.into();
        if details.chars().count() > MAX_TEXT_LEN {
            details = details.chars().take(MAX_TEXT_LEN).collect();
        }
        Self {
            id: Uuid::new_v4(),
            ticket_id,
            action,
            performed_by: None,
            performed_by_type,
            details,
            confidence: None,
            metadata: None,
            created_at: Utc::now(),
        }
    }

    /// Attach the acting user
    #[must_use]
    pub const fn with_performed_by(mut self, user_id: Uuid) -> Self {
        self.performed_by = Some(user_id);
        self
    }

    /// Attach an analysis confidence score
    #[must_use]
    pub const fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Attach a structured metadata payload
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

// ============================================================================
// Users
// ============================================================================

/// Role of an account, in ascending order of privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// End user who files tickets
    #[default]
    User,
    /// Support agent handling escalations
    Agent,
    /// Administrator managing users and knowledge-base content
    Admin,
}

impl UserRole {
    /// String representation matching the stored and wire value
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
            Self::Admin => "admin",
        }
    }

    /// Whether this role handles tickets on behalf of others
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Agent | Self::Admin)
    }

    /// Whether this role administers the system
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "agent" => Ok(Self::Agent),
            "admin" => Ok(Self::Admin),
            other => Err(format!("Unknown user role: {other}")),
        }
    }
}

/// An account known to the system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Email address, unique across accounts
    pub email: String,
    /// Bcrypt password hash, never serialized on the wire
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Account role
    pub role: UserRole,
    /// Deactivated accounts cannot authenticate
    pub is_active: bool,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// Last successful authentication
    pub last_active: DateTime<Utc>,
}

impl User {
    /// Create a new active account with the given role
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role,
            is_active: true,
            created_at: now,
            last_active: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            TicketStatus::Open,
            TicketStatus::InProgress,
            TicketStatus::Closed,
        ] {
            assert_eq!(status.as_str().parse::<TicketStatus>().unwrap(), status);
        }
        assert!("escalated".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }

    #[test]
    fn test_actor_type_from_role() {
        assert_eq!(ActorType::from(UserRole::Admin).as_str(), "admin");
        assert_eq!(ActorType::from(UserRole::User).as_str(), "user");
        assert_eq!(ActorType::Ai.as_str(), "AI");
    }

    #[test]
    fn test_new_ticket_defaults() {
        let ticket = Ticket::new(
            Uuid::new_v4(),
            "Payment missing",
            "Paid but not reflected",
            "billing",
            TicketPriority::High,
        );
        assert_eq!(ticket.status, TicketStatus::Open);
        assert!(ticket.resolution.is_none());
        assert!(ticket.resolved_by.is_none());
        assert!(ticket.ai_confidence.is_none());
    }

    #[test]
    fn test_audit_details_truncated() {
        let entry = AuditLogEntry::new(
            Uuid::new_v4(),
            AuditAction::AiAnalysis,
            ActorType::Ai,
            "x".repeat(MAX_TEXT_LEN + 50),
        );
        assert_eq!(entry.details.chars().count(), MAX_TEXT_LEN);
    }

    #[test]
    fn test_user_serialization_hides_password() {
        let user = User::new("Ada", "ada@example.com", "hash", UserRole::Agent);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hash"));
        assert!(json.contains("\"role\":\"agent\""));
    }
}
