// ABOUTME: Knowledge-base article route handlers
// ABOUTME: Reader listing/search for all roles, mutation endpoints for admins
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Knowledge-base routes
//!
//! Readers only ever see active articles; fetching a single article counts
//! a view. Admins manage content, including deactivation and hard deletes.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::models::{KnowledgeBaseArticle, MAX_ARTICLE_LEN, MAX_TITLE_LEN};
use crate::pagination::{PaginationParams, PaginationSummary, DEFAULT_PAGE_SIZE};
use crate::resources::ServerResources;

/// Request to create an article (admin only)
#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request to update an article (admin only)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Query parameters for the article listing
#[derive(Debug, Deserialize, Default)]
pub struct ListArticlesQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Response for a single-article mutation
#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub message: String,
    pub article: KnowledgeBaseArticle,
}

/// Response for article listings
#[derive(Debug, Serialize)]
pub struct ArticleListResponse {
    pub articles: Vec<KnowledgeBaseArticle>,
    pub pagination: PaginationSummary,
}

/// Knowledge-base routes handler
pub struct KnowledgeBaseRoutes;

impl KnowledgeBaseRoutes {
    /// Create all knowledge-base routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/knowledge-base", get(Self::list_articles))
            .route("/api/knowledge-base", post(Self::create_article))
            .route("/api/knowledge-base/:article_id", get(Self::get_article))
            .route("/api/knowledge-base/:article_id", put(Self::update_article))
            .route(
                "/api/knowledge-base/:article_id",
                delete(Self::delete_article),
            )
            .with_state(resources)
    }

    /// List active articles with optional category filter and text search
    async fn list_articles(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Query(query): Query<ListArticlesQuery>,
    ) -> Result<Response, AppError> {
        resources.auth_middleware.authenticate(&headers).await?;

        let category = query.category.as_deref().filter(|c| *c != "all");
        let search = query.search.as_deref().filter(|s| !s.trim().is_empty());
        let params = PaginationParams {
            page: query.page.unwrap_or(1),
            limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        };

        let articles = resources
            .database
            .list_articles(category, search, params.limit(), params.offset())
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        let total = resources
            .database
            .count_articles(category, search)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let response = ArticleListResponse {
            articles,
            pagination: PaginationSummary::new(&params, total),
        };
        Ok(Json(response).into_response())
    }

    /// Create a new article (admin)
    async fn create_article(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Json(request): Json<CreateArticleRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(&headers).await?;
        auth.require_admin()?;

        let title = required(request.title, "title")?;
        let content = required(request.content, "content")?;
        let category = required(request.category, "category")?;

        if title.len() > MAX_TITLE_LEN {
            return Err(AppError::invalid_input(format!(
                "Title cannot exceed {MAX_TITLE_LEN} characters"
            )));
        }
        if content.len() > MAX_ARTICLE_LEN {
            return Err(AppError::invalid_input(format!(
                "Content cannot exceed {MAX_ARTICLE_LEN} characters"
            )));
        }

        let article =
            KnowledgeBaseArticle::new(title, content, category, request.tags, auth.user_id);

        resources
            .database
            .create_article(&article)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let response = ArticleResponse {
            message: "Knowledge base article created successfully".into(),
            article,
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Fetch an active article and count the view
    async fn get_article(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(article_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        resources.auth_middleware.authenticate(&headers).await?;

        let mut article = resources
            .database
            .get_article(article_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .filter(|article| article.is_active)
            .ok_or_else(|| AppError::not_found("Knowledge base article"))?;

        resources
            .database
            .increment_article_views(article.id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        article.views += 1;

        Ok(Json(serde_json::json!({ "article": article })).into_response())
    }

    /// Partially update an article (admin)
    async fn update_article(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(article_id): Path<Uuid>,
        Json(request): Json<UpdateArticleRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(&headers).await?;
        auth.require_admin()?;

        let mut article = resources
            .database
            .get_article(article_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found("Knowledge base article"))?;

        if let Some(title) = request.title {
            article.title = title;
        }
        if let Some(content) = request.content {
            article.content = content;
        }
        if let Some(category) = request.category {
            article.category = category;
        }
        if let Some(tags) = request.tags {
            article.tags = tags;
        }
        if let Some(is_active) = request.is_active {
            article.is_active = is_active;
        }

        resources
            .database
            .update_article(&article)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let response = ArticleResponse {
            message: "Knowledge base article updated successfully".into(),
            article,
        };
        Ok(Json(response).into_response())
    }

    /// Remove an article (admin)
    async fn delete_article(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(article_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_middleware.authenticate(&headers).await?;
        auth.require_admin()?;

        resources
            .database
            .get_article(article_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found("Knowledge base article"))?;

        resources
            .database
            .delete_article(article_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok(Json(serde_json::json!({
            "message": "Knowledge base article deleted successfully"
        }))
        .into_response())
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::missing_field(field)),
    }
}
