// ABOUTME: Integration tests for authentication and the request middleware
// ABOUTME: Covers bearer-token extraction, account checks, and role gating
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod common;

use anyhow::Result;
use axum::http::HeaderMap;
use common::{create_test_auth_manager, create_test_database, create_test_user};
use helpdesk_server::{
    database_plugins::DatabaseProvider,
    errors::ErrorCode,
    middleware::AuthMiddleware,
    models::UserRole,
};

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("authorization", format!("Bearer {token}").parse().unwrap());
    headers
}

#[tokio::test]
async fn test_authenticate_valid_token() -> Result<()> {
    let database = create_test_database().await?;
    let auth_manager = create_test_auth_manager();
    let middleware = AuthMiddleware::new(auth_manager.clone(), database.clone());

    let agent = create_test_user(&database, UserRole::Agent).await?;
    let token = auth_manager.generate_token(&agent)?;

    let auth = middleware.authenticate(&bearer(&token)).await.unwrap();
    assert_eq!(auth.user_id, agent.id);
    assert_eq!(auth.email, agent.email);
    assert_eq!(auth.role, UserRole::Agent);

    assert!(auth.require_staff().is_ok());
    assert!(auth.require_admin().is_err());
    Ok(())
}

#[tokio::test]
async fn test_role_is_read_from_store_not_token() -> Result<()> {
    let database = create_test_database().await?;
    let auth_manager = create_test_auth_manager();
    let middleware = AuthMiddleware::new(auth_manager.clone(), database.clone());

    let user = create_test_user(&database, UserRole::User).await?;
    let token = auth_manager.generate_token(&user)?;

    // Promote after the token was issued
    database
        .update_user(user.id, Some(UserRole::Admin), None)
        .await?;

    let auth = middleware.authenticate(&bearer(&token)).await.unwrap();
    assert_eq!(auth.role, UserRole::Admin);
    assert!(auth.require_admin().is_ok());
    Ok(())
}

#[tokio::test]
async fn test_deactivated_account_is_rejected() -> Result<()> {
    let database = create_test_database().await?;
    let auth_manager = create_test_auth_manager();
    let middleware = AuthMiddleware::new(auth_manager.clone(), database.clone());

    let user = create_test_user(&database, UserRole::User).await?;
    let token = auth_manager.generate_token(&user)?;
    database.update_user(user.id, None, Some(false)).await?;

    let error = middleware.authenticate(&bearer(&token)).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::AuthInvalid);
    Ok(())
}

#[tokio::test]
async fn test_missing_and_malformed_credentials() -> Result<()> {
    let database = create_test_database().await?;
    let middleware = AuthMiddleware::new(create_test_auth_manager(), database.clone());

    let error = middleware.authenticate(&HeaderMap::new()).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::AuthRequired);

    let mut headers = HeaderMap::new();
    headers.insert("authorization", "Basic dXNlcjpwdw==".parse().unwrap());
    let error = middleware.authenticate(&headers).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::AuthInvalid);

    let error = middleware
        .authenticate(&bearer("not-a-token"))
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::AuthInvalid);
    Ok(())
}

#[tokio::test]
async fn test_token_for_deleted_account_is_rejected() -> Result<()> {
    let database = create_test_database().await?;
    let auth_manager = create_test_auth_manager();
    let middleware = AuthMiddleware::new(auth_manager.clone(), database.clone());

    // Token for an account the store has never seen
    let ghost = helpdesk_server::models::User::new(
        "Ghost",
        "ghost@example.com",
        "hash",
        UserRole::Admin,
    );
    let token = auth_manager.generate_token(&ghost)?;

    let error = middleware.authenticate(&bearer(&token)).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::AuthInvalid);
    Ok(())
}
