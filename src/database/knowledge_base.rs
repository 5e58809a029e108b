// ABOUTME: Knowledge-base article persistence operations
// ABOUTME: Handles CRUD, text search, view counting, and the AI context read path
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::Database;
use crate::models::KnowledgeBaseArticle;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

fn row_to_article(row: &SqliteRow) -> Result<KnowledgeBaseArticle> {
    let id: String = row.try_get("id")?;
    let created_by: String = row.try_get("created_by")?;
    let tags_json: String = row.try_get("tags")?;

    Ok(KnowledgeBaseArticle {
        id: Uuid::parse_str(&id)?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        category: row.try_get("category")?,
        tags: serde_json::from_str(&tags_json)?,
        created_by: Uuid::parse_str(&created_by)?,
        is_active: row.try_get("is_active")?,
        views: row.try_get("views")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

impl Database {
    /// Create the knowledge-base table
    pub(super) async fn migrate_knowledge_base(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS kb_articles (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                category TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                created_by TEXT NOT NULL REFERENCES users(id),
                is_active BOOLEAN NOT NULL DEFAULT 1,
                views INTEGER NOT NULL DEFAULT 0,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        for index in [
            "CREATE INDEX IF NOT EXISTS idx_kb_articles_category ON kb_articles(category)",
            "CREATE INDEX IF NOT EXISTS idx_kb_articles_is_active ON kb_articles(is_active)",
            "CREATE INDEX IF NOT EXISTS idx_kb_articles_created_at ON kb_articles(created_at DESC)",
        ] {
            sqlx::query(index).execute(&self.pool).await?;
        }

        Ok(())
    }

    /// Persist a new article
    pub async fn create_article(&self, article: &KnowledgeBaseArticle) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO kb_articles (
                id, title, content, category, tags, created_by, is_active, views,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(article.id.to_string())
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.category)
        .bind(serde_json::to_string(&article.tags)?)
        .bind(article.created_by.to_string())
        .bind(article.is_active)
        .bind(article.views)
        .bind(article.created_at)
        .bind(article.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get article by ID
    pub async fn get_article(&self, article_id: Uuid) -> Result<Option<KnowledgeBaseArticle>> {
        let row = sqlx::query("SELECT * FROM kb_articles WHERE id = $1")
            .bind(article_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_article).transpose()
    }

    /// Write the full current state of an article, refreshing `updated_at`
    pub async fn update_article(&self, article: &KnowledgeBaseArticle) -> Result<()> {
        sqlx::query(
            r"
            UPDATE kb_articles SET
                title = $2,
                content = $3,
                category = $4,
                tags = $5,
                is_active = $6,
                updated_at = $7
            WHERE id = $1
            ",
        )
        .bind(article.id.to_string())
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.category)
        .bind(serde_json::to_string(&article.tags)?)
        .bind(article.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove an article
    pub async fn delete_article(&self, article_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM kb_articles WHERE id = $1")
            .bind(article_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Increment the read counter for an article
    pub async fn increment_article_views(&self, article_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE kb_articles SET views = views + 1 WHERE id = $1")
            .bind(article_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// List active articles with optional category filter and text search
    /// over title, content, and tags, newest first
    pub async fn list_articles(
        &self,
        category: Option<&str>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<KnowledgeBaseArticle>> {
        let mut sql = String::from("SELECT * FROM kb_articles WHERE is_active = 1");
        if category.is_some() {
            sql.push_str(" AND category = ?");
        }
        if search.is_some() {
            sql.push_str(" AND (title LIKE ? OR content LIKE ? OR tags LIKE ?)");
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql);
        if let Some(category) = category {
            query = query.bind(category);
        }
        let pattern = search.map(|s| format!("%{s}%"));
        if let Some(pattern) = &pattern {
            query = query.bind(pattern).bind(pattern).bind(pattern);
        }
        let rows = query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        rows.iter().map(row_to_article).collect()
    }

    /// Count active articles matching the optional category filter and search
    pub async fn count_articles(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<i64> {
        let mut sql = String::from("SELECT COUNT(*) AS n FROM kb_articles WHERE is_active = 1");
        if category.is_some() {
            sql.push_str(" AND category = ?");
        }
        if search.is_some() {
            sql.push_str(" AND (title LIKE ? OR content LIKE ? OR tags LIKE ?)");
        }

        let mut query = sqlx::query(&sql);
        if let Some(category) = category {
            query = query.bind(category);
        }
        let pattern = search.map(|s| format!("%{s}%"));
        if let Some(pattern) = &pattern {
            query = query.bind(pattern).bind(pattern).bind(pattern);
        }
        let row = query.fetch_one(&self.pool).await?;
        Ok(row.try_get("n")?)
    }

    /// Active articles for a category in store order, capped at `limit`
    ///
    /// This is the read path of the AI context builder; no ranking is applied.
    pub async fn find_active_articles_by_category(
        &self,
        category: &str,
        limit: i64,
    ) -> Result<Vec<KnowledgeBaseArticle>> {
        let rows = sqlx::query(
            "SELECT * FROM kb_articles WHERE category = $1 AND is_active = 1 LIMIT $2",
        )
        .bind(category)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_article).collect()
    }
}
