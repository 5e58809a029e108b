// ABOUTME: Ticket analysis client building on knowledge-base context and an LLM provider
// ABOUTME: Produces parsed or degraded analysis outcomes, never panics on remote output
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Ticket Analysis
//!
//! Given a ticket, the analyzer retrieves matching knowledge-base articles,
//! asks the completion service for a structured assessment, and parses the
//! result. Remote output that cannot be parsed as the expected structure
//! degrades to a low-confidence result instead of failing the analysis; only
//! article lookup and the remote call itself can fail.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::database_plugins::factory::Database;
use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::models::{KnowledgeBaseArticle, Ticket, TicketStatus};

/// Maximum number of knowledge-base articles embedded in the prompt
pub const KB_CONTEXT_LIMIT: i64 = 10;

/// Confidence forced when no knowledge-base articles match the category
pub const NO_ARTICLE_CONFIDENCE: f64 = 0.3;

/// Confidence assigned when the remote response cannot be parsed
pub const UNPARSED_CONFIDENCE: f64 = 0.5;

/// Sampling temperature for analysis requests
const ANALYSIS_TEMPERATURE: f32 = 0.3;

/// Output token budget for analysis requests
const ANALYSIS_MAX_TOKENS: u32 = 1000;

/// Response text used when the remote service returns nothing usable
const UNAVAILABLE_RESPONSE: &str = "AI response unavailable";

/// Reasoning recorded on degraded results
const UNPARSED_REASONING: &str = "Could not parse structured response";

/// System instruction sent with every analysis request
const ANALYSIS_INSTRUCTION: &str = r#"Analyze the following support ticket and provide a helpful response based on the knowledge base articles provided.

Return your response as a JSON object with the following structure:
{
  "response": "Your suggested reply to the user",
  "confidence": 0.85,
  "reasoning": "Brief explanation of why you have this confidence level",
  "suggestedActions": ["action1", "action2"],
  "requiresHumanReview": false
}

Confidence should be between 0.0 and 1.0:
- 0.8-1.0: High confidence (can auto-resolve)
- 0.5-0.79: Medium confidence (requires review)
- 0.0-0.49: Low confidence (needs human agent)"#;

/// Structured result of one analysis call
#[derive(Debug, Clone, PartialEq)]
pub struct AiAnalysis {
    /// Suggested reply to the user
    pub response: String,
    /// Estimated correctness, clamped to [0.0, 1.0]
    pub confidence: f64,
    /// Short explanation of the confidence level
    pub reasoning: String,
    /// Follow-up actions proposed by the service
    pub suggested_actions: Vec<String>,
    /// Whether a human should look at the ticket regardless of confidence
    pub requires_human_review: bool,
}

/// Outcome of an analysis call
///
/// The degraded path is a value, not an error: the workflow proceeds with a
/// low-confidence result whenever structured parsing fails.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The remote response parsed as the expected structure
    Parsed(AiAnalysis),
    /// The remote response was salvaged into a low-confidence fallback
    Degraded(AiAnalysis),
}

impl AnalysisOutcome {
    /// The analysis carried by either variant
    #[must_use]
    pub const fn analysis(&self) -> &AiAnalysis {
        match self {
            Self::Parsed(analysis) | Self::Degraded(analysis) => analysis,
        }
    }

    /// Mutable access to the carried analysis
    pub fn analysis_mut(&mut self) -> &mut AiAnalysis {
        match self {
            Self::Parsed(analysis) | Self::Degraded(analysis) => analysis,
        }
    }
}

/// Clamp a reported confidence into [0.0, 1.0]
#[must_use]
pub fn clamp_confidence(confidence: f64) -> f64 {
    confidence.clamp(0.0, 1.0)
}

/// Analyzes tickets against the knowledge base through an LLM provider
///
/// Constructed once at startup and shared by reference; the provider is a
/// trait object so tests can script remote behavior.
pub struct TicketAnalyzer {
    database: Arc<Database>,
    provider: Arc<dyn LlmProvider>,
}

impl TicketAnalyzer {
    /// Create a new analyzer over the given store and provider
    #[must_use]
    pub fn new(database: Arc<Database>, provider: Arc<dyn LlmProvider>) -> Self {
        Self { database, provider }
    }

    /// Analyze a ticket and produce an outcome
    ///
    /// When no knowledge-base articles match the ticket's category, the
    /// ticket status is set to in-progress before the remote call and the
    /// final confidence is forced to [`NO_ARTICLE_CONFIDENCE`] with
    /// `requires_human_review` set, regardless of what the service returns.
    ///
    /// # Errors
    ///
    /// Returns an error if article lookup or the remote call fails. Parse
    /// failures do not error; they yield [`AnalysisOutcome::Degraded`].
    #[instrument(skip(self, ticket), fields(ticket_id = %ticket.id, category = %ticket.category))]
    pub async fn analyze(&self, ticket: &mut Ticket) -> Result<AnalysisOutcome, AppError> {
        let articles = self
            .database
            .find_active_articles_by_category(&ticket.category, KB_CONTEXT_LIMIT)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let no_articles = articles.is_empty();
        if no_articles {
            debug!("No knowledge-base articles for category, degrading confidence");
            ticket.status = TicketStatus::InProgress;
        }

        let request = ChatRequest::new(vec![
            ChatMessage::system(ANALYSIS_INSTRUCTION),
            ChatMessage::user(build_user_prompt(ticket, &articles)),
        ])
        .with_model(self.provider.default_model())
        .with_temperature(ANALYSIS_TEMPERATURE)
        .with_max_tokens(ANALYSIS_MAX_TOKENS);

        let response = self.provider.complete(&request).await?;

        let mut outcome = parse_completion(&response.content);
        if matches!(outcome, AnalysisOutcome::Degraded(_)) {
            warn!("Completion did not parse as structured analysis, using fallback");
        }

        if no_articles {
            let analysis = outcome.analysis_mut();
            analysis.confidence = NO_ARTICLE_CONFIDENCE;
            analysis.requires_human_review = true;
        }

        Ok(outcome)
    }
}

/// Build the user message embedding ticket fields and article context
fn build_user_prompt(ticket: &Ticket, articles: &[KnowledgeBaseArticle]) -> String {
    let kb_content = articles
        .iter()
        .map(|article| format!("Title: {}\nContent: {}", article.title, article.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Ticket Details:\n\
         Title: {}\n\
         Description: {}\n\
         Category: {}\n\
         Priority: {}\n\n\
         Knowledge Base Articles:\n\
         {}",
        ticket.title, ticket.description, ticket.category, ticket.priority, kb_content
    )
}

/// Parse a completion into an analysis outcome
///
/// Locates the first `{` through the last `}` in the content, strips ASCII
/// control characters (the service sometimes emits raw newlines inside JSON
/// string values), and validates the required fields. Anything else becomes
/// a degraded fallback built from the raw content.
#[must_use]
pub fn parse_completion(content: &str) -> AnalysisOutcome {
    match try_parse(content) {
        Some(analysis) => AnalysisOutcome::Parsed(analysis),
        None => AnalysisOutcome::Degraded(fallback_analysis(content)),
    }
}

fn try_parse(content: &str) -> Option<AiAnalysis> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end < start {
        return None;
    }

    let cleaned: String = content[start..=end]
        .chars()
        .filter(|c| (*c as u32) >= 0x20)
        .collect();

    let parsed: Value = serde_json::from_str(&cleaned).ok()?;

    let response = parsed.get("response")?.as_str()?;
    if response.is_empty() {
        return None;
    }
    let confidence = parsed.get("confidence")?.as_f64()?;

    Some(AiAnalysis {
        response: response.to_owned(),
        confidence: clamp_confidence(confidence),
        reasoning: parsed
            .get("reasoning")
            .and_then(Value::as_str)
            .unwrap_or("No reasoning provided")
            .to_owned(),
        suggested_actions: parsed
            .get("suggestedActions")
            .and_then(Value::as_array)
            .map(|actions| {
                actions
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default(),
        requires_human_review: parsed
            .get("requiresHumanReview")
            .and_then(Value::as_bool)
            .unwrap_or(true),
    })
}

fn fallback_analysis(content: &str) -> AiAnalysis {
    let response = if content.trim().is_empty() {
        UNAVAILABLE_RESPONSE.to_owned()
    } else {
        content.to_owned()
    };

    AiAnalysis {
        response,
        confidence: UNPARSED_CONFIDENCE,
        reasoning: UNPARSED_REASONING.to_owned(),
        suggested_actions: Vec::new(),
        requires_human_review: true,
    }
}
