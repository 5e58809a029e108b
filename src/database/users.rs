// ABOUTME: User management database operations
// ABOUTME: Handles account storage, lookup, and admin updates
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::Database;
use crate::models::{User, UserRole};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

fn row_to_user(row: &SqliteRow) -> Result<User> {
    let id: String = row.try_get("id")?;
    let role: String = row.try_get("role")?;
    Ok(User {
        id: Uuid::parse_str(&id)?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: role.parse().map_err(|e: String| anyhow!(e))?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        last_active: row.try_get::<DateTime<Utc>, _>("last_active")?,
    })
}

impl Database {
    /// Create the users table
    pub(super) async fn migrate_users(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'agent', 'admin')),
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at DATETIME NOT NULL,
                last_active DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Create a new user account
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already in use or the insert fails.
    pub async fn create_user(&self, user: &User) -> Result<Uuid> {
        if self.get_user_by_email(&user.email).await?.is_some() {
            return Err(anyhow!("Email already in use by another user"));
        }

        sqlx::query(
            r"
            INSERT INTO users (id, name, email, password_hash, role, is_active, created_at, last_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.last_active)
        .execute(&self.pool)
        .await?;

        Ok(user.id)
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Get user by email address
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Update the user's last-active timestamp
    pub async fn update_last_active(&self, user_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET last_active = $2 WHERE id = $1")
            .bind(user_id.to_string())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Update role and/or active flag for a user, returning the updated account
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the update fails.
    pub async fn update_user(
        &self,
        user_id: Uuid,
        role: Option<UserRole>,
        is_active: Option<bool>,
    ) -> Result<User> {
        let mut user = self
            .get_user(user_id)
            .await?
            .ok_or_else(|| anyhow!("User not found"))?;

        if let Some(role) = role {
            user.role = role;
        }
        if let Some(active) = is_active {
            user.is_active = active;
        }

        sqlx::query("UPDATE users SET role = $2, is_active = $3 WHERE id = $1")
            .bind(user_id.to_string())
            .bind(user.role.as_str())
            .bind(user.is_active)
            .execute(&self.pool)
            .await?;

        Ok(user)
    }

    /// List users with optional role and active filters, newest first
    pub async fn list_users(
        &self,
        role: Option<UserRole>,
        is_active: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>> {
        let mut sql = String::from("SELECT * FROM users WHERE 1=1");
        if role.is_some() {
            sql.push_str(" AND role = ?");
        }
        if is_active.is_some() {
            sql.push_str(" AND is_active = ?");
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql);
        if let Some(role) = role {
            query = query.bind(role.as_str());
        }
        if let Some(active) = is_active {
            query = query.bind(active);
        }
        let rows = query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        rows.iter().map(row_to_user).collect()
    }

    /// Count users matching the optional role and active filters
    pub async fn count_users(
        &self,
        role: Option<UserRole>,
        is_active: Option<bool>,
    ) -> Result<i64> {
        let mut sql = String::from("SELECT COUNT(*) AS n FROM users WHERE 1=1");
        if role.is_some() {
            sql.push_str(" AND role = ?");
        }
        if is_active.is_some() {
            sql.push_str(" AND is_active = ?");
        }

        let mut query = sqlx::query(&sql);
        if let Some(role) = role {
            query = query.bind(role.as_str());
        }
        if let Some(active) = is_active {
            query = query.bind(active);
        }
        let row = query.fetch_one(&self.pool).await?;
        Ok(row.try_get("n")?)
    }
}
