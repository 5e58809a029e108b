// ABOUTME: End-to-end tests for the REST API surface
// ABOUTME: Drives the assembled router with in-memory store and scripted provider
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{create_test_resources, create_test_user, ScriptedProvider};
use helpdesk_server::models::UserRole;
use helpdesk_server::resources::ServerResources;
use helpdesk_server::server::router;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_req(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn register(app: &Router, name: &str) -> Result<(String, Value)> {
    let (status, body) = send(
        app,
        post_json(
            "/api/auth/register",
            None,
            &json!({
                "name": name,
                "email": format!("{name}@example.com"),
                "password": "password"
            }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let token = body["token"].as_str().unwrap().to_owned();
    Ok((token, body["user"].clone()))
}

/// Token for a persisted staff account
async fn staff_token(resources: &Arc<ServerResources>, role: UserRole) -> Result<String> {
    let user = create_test_user(&resources.database, role).await?;
    Ok(resources.auth_manager.generate_token(&user)?)
}

#[tokio::test]
async fn test_health_endpoints() -> Result<()> {
    let resources = create_test_resources(Arc::new(ScriptedProvider::with_confidence(0.9))).await?;
    let app = router(resources);

    let (status, body) = send(&app, get_req("/health", None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = send(&app, get_req("/ready", None)).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_json_404() -> Result<()> {
    let resources = create_test_resources(Arc::new(ScriptedProvider::with_confidence(0.9))).await?;
    let app = router(resources);

    let (status, body) = send(&app, get_req("/api/nope", None)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");
    Ok(())
}

#[tokio::test]
async fn test_register_login_and_create_ticket() -> Result<()> {
    let resources = create_test_resources(Arc::new(ScriptedProvider::with_confidence(0.92))).await?;
    let app = router(resources.clone());

    let (token, user) = register(&app, "ada").await?;
    assert_eq!(user["role"], "user");

    // Login with the same credentials
    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/login",
            None,
            &json!({"email": "ada@example.com", "password": "password"}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());

    // Wrong password is rejected
    let (status, _) = send(
        &app,
        post_json(
            "/api/auth/login",
            None,
            &json!({"email": "ada@example.com", "password": "wrong"}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Create a ticket; no knowledge base exists, so the degraded policy wins
    let (status, body) = send(
        &app,
        post_json(
            "/api/tickets",
            Some(&token),
            &json!({
                "title": "Payment missing",
                "description": "Paid but not reflected",
                "category": "billing",
                "priority": "high"
            }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ticket"]["status"], "in-progress");
    assert_eq!(body["ticket"]["aiConfidence"], 0.3);

    // Detail view returns the ticket and its audit trail, newest first
    let ticket_id = body["ticket"]["id"].as_str().unwrap().to_owned();
    let (status, body) = send(
        &app,
        get_req(&format!("/api/tickets/{ticket_id}"), Some(&token)),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let trail = body["auditLogs"].as_array().unwrap();
    assert_eq!(trail.len(), 2);
    assert_eq!(trail[0]["action"], "ai_analysis");
    assert_eq!(trail[1]["action"], "ticket_created");

    // Owner listing includes the new ticket
    let (status, body) = send(&app, get_req("/api/tickets/my-tickets", Some(&token))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tickets"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["current"], 1);
    Ok(())
}

#[tokio::test]
async fn test_ticket_validation_and_auth_errors() -> Result<()> {
    let resources = create_test_resources(Arc::new(ScriptedProvider::with_confidence(0.9))).await?;
    let app = router(resources.clone());
    let (token, _) = register(&app, "bob").await?;

    // Missing description
    let (status, body) = send(
        &app,
        post_json(
            "/api/tickets",
            Some(&token),
            &json!({"title": "t", "category": "billing", "priority": "high"}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MISSING_REQUIRED_FIELD");

    // No token at all
    let (status, _) = send(
        &app,
        post_json(
            "/api/tickets",
            None,
            &json!({"title": "t", "description": "d", "category": "billing", "priority": "high"}),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_role_gating() -> Result<()> {
    let resources = create_test_resources(Arc::new(ScriptedProvider::with_confidence(0.9))).await?;
    let app = router(resources.clone());
    let (user_token, _) = register(&app, "carol").await?;

    // Plain users cannot use the staff listing, audit log, or admin stats
    for uri in ["/api/tickets", "/api/audit", "/api/admin/stats"] {
        let (status, _) = send(&app, get_req(uri, Some(&user_token))).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "uri {uri}");
    }

    let agent_token = staff_token(&resources, UserRole::Agent).await?;
    let (status, _) = send(&app, get_req("/api/tickets", Some(&agent_token))).await?;
    assert_eq!(status, StatusCode::OK);

    // Agents are still not admins
    let (status, _) = send(&app, get_req("/api/admin/stats", Some(&agent_token))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_token = staff_token(&resources, UserRole::Admin).await?;
    let (status, body) = send(&app, get_req("/api/admin/stats", Some(&admin_token))).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["stats"]["tickets"]["total"].is_number());
    Ok(())
}

#[tokio::test]
async fn test_users_cannot_read_others_tickets() -> Result<()> {
    let resources = create_test_resources(Arc::new(ScriptedProvider::with_confidence(0.2))).await?;
    let app = router(resources.clone());

    let (owner_token, _) = register(&app, "dave").await?;
    let (other_token, _) = register(&app, "erin").await?;

    let (_, body) = send(
        &app,
        post_json(
            "/api/tickets",
            Some(&owner_token),
            &json!({
                "title": "Locked out",
                "description": "Cannot sign in",
                "category": "account",
                "priority": "medium"
            }),
        ),
    )
    .await?;
    let ticket_id = body["ticket"]["id"].as_str().unwrap().to_owned();

    let (status, _) = send(
        &app,
        get_req(&format!("/api/tickets/{ticket_id}"), Some(&other_token)),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // An agent may read it
    let agent_token = staff_token(&resources, UserRole::Agent).await?;
    let (status, _) = send(
        &app,
        get_req(&format!("/api/tickets/{ticket_id}"), Some(&agent_token)),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_knowledge_base_admin_crud() -> Result<()> {
    let resources = create_test_resources(Arc::new(ScriptedProvider::with_confidence(0.9))).await?;
    let app = router(resources.clone());

    let (user_token, _) = register(&app, "frank").await?;
    let admin_token = staff_token(&resources, UserRole::Admin).await?;

    // Plain users cannot create articles
    let article = json!({
        "title": "Billing FAQ",
        "content": "Check the transaction history page.",
        "category": "billing",
        "tags": ["billing", "payments"]
    });
    let (status, _) = send(
        &app,
        post_json("/api/knowledge-base", Some(&user_token), &article),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        post_json("/api/knowledge-base", Some(&admin_token), &article),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let article_id = body["article"]["id"].as_str().unwrap().to_owned();

    // Readers see it and views are counted
    let (status, body) = send(
        &app,
        get_req(&format!("/api/knowledge-base/{article_id}"), Some(&user_token)),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["article"]["views"], 1);

    // Search finds it; deactivation hides it
    let (_, body) = send(
        &app,
        get_req("/api/knowledge-base?search=transaction", Some(&user_token)),
    )
    .await?;
    assert_eq!(body["articles"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        Request::builder()
            .method("PUT")
            .uri(format!("/api/knowledge-base/{article_id}"))
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {admin_token}"))
            .body(Body::from(json!({"isActive": false}).to_string()))
            .unwrap(),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        get_req(&format!("/api/knowledge-base/{article_id}"), Some(&user_token)),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_admin_user_management() -> Result<()> {
    let resources = create_test_resources(Arc::new(ScriptedProvider::with_confidence(0.9))).await?;
    let app = router(resources.clone());

    let admin = create_test_user(&resources.database, UserRole::Admin).await?;
    let admin_token = resources.auth_manager.generate_token(&admin)?;
    let (_, user) = register(&app, "grace").await?;
    let user_id = user["id"].as_str().unwrap().to_owned();

    // Promote the user to agent
    let (status, body) = send(
        &app,
        Request::builder()
            .method("PUT")
            .uri(format!("/api/admin/users/{user_id}"))
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {admin_token}"))
            .body(Body::from(json!({"role": "agent"}).to_string()))
            .unwrap(),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "agent");

    // Admins cannot deactivate themselves
    let (status, _) = send(
        &app,
        Request::builder()
            .method("PUT")
            .uri(format!("/api/admin/users/{}", admin.id))
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {admin_token}"))
            .body(Body::from(json!({"isActive": false}).to_string()))
            .unwrap(),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Provision an agent account
    let (status, body) = send(
        &app,
        post_json(
            "/api/admin/users/agent",
            Some(&admin_token),
            &json!({
                "name": "Henry",
                "email": "henry@example.com",
                "password": "password",
                "confirmPassword": "password"
            }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["agent"]["role"], "agent");

    // Mismatched confirmation is rejected
    let (status, _) = send(
        &app,
        post_json(
            "/api/admin/users/agent",
            Some(&admin_token),
            &json!({
                "name": "Iris",
                "email": "iris@example.com",
                "password": "password",
                "confirmPassword": "different"
            }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Filtered listing sees the provisioned agents
    let (status, body) = send(
        &app,
        get_req("/api/admin/users?role=agent", Some(&admin_token)),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_agent_updates_ticket_over_http() -> Result<()> {
    let resources = create_test_resources(Arc::new(ScriptedProvider::with_confidence(0.4))).await?;
    let app = router(resources.clone());

    let (user_token, _) = register(&app, "judy").await?;
    let (_, body) = send(
        &app,
        post_json(
            "/api/tickets",
            Some(&user_token),
            &json!({
                "title": "Slow dashboard",
                "description": "Pages take 30s to load",
                "category": "technical",
                "priority": "low"
            }),
        ),
    )
    .await?;
    let ticket_id = body["ticket"]["id"].as_str().unwrap().to_owned();

    let agent_token = staff_token(&resources, UserRole::Agent).await?;
    let (status, body) = send(
        &app,
        Request::builder()
            .method("PUT")
            .uri(format!("/api/tickets/{ticket_id}"))
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {agent_token}"))
            .body(Body::from(
                json!({"status": "closed", "resolution": "Cleared a stuck cache."}).to_string(),
            ))
            .unwrap(),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticket"]["status"], "closed");
    assert_eq!(body["ticket"]["resolvedBy"], "agent");

    // The audit endpoint shows the manual update first
    let (status, body) = send(
        &app,
        get_req(&format!("/api/audit/ticket/{ticket_id}"), Some(&user_token)),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let trail = body["auditLogs"].as_array().unwrap();
    assert_eq!(trail[0]["action"], "status_updated");
    Ok(())
}
