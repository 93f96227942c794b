//! Integration tests for forced logout on 401 responses.
//!
//! However many requests fail with 401 at once, the credentials are cleared
//! and the user is redirected to the login view only once per cooldown.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use bookstore_core::UserRole;
use bookstore_integration_tests::TestContext;
use bookstore_storefront::navigation::Navigator;
use serde_json::{Value, json};
use tokio::sync::broadcast;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn drain(rx: &mut broadcast::Receiver<String>) -> Vec<String> {
    let mut seen = Vec::new();
    while let Ok(path) = rx.try_recv() {
        seen.push(path);
    }
    seen
}

async fn mount_get(ctx: &TestContext, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/api{route}")))
        .respond_with(response)
        .mount(&ctx.server)
        .await;
}

#[tokio::test]
async fn test_one_unauthorized_among_concurrent_calls() {
    let ctx = TestContext::new().await;
    ctx.sign_in(UserRole::Unspecified);
    let mut locations = ctx.navigator.subscribe();

    mount_get(
        &ctx,
        "/books",
        ResponseTemplate::new(200)
            .set_body_json(json!([]))
            .set_delay(Duration::from_millis(150)),
    )
    .await;
    mount_get(
        &ctx,
        "/orders",
        ResponseTemplate::new(401).set_body_json(json!({"error": "Token expired"})),
    )
    .await;
    mount_get(
        &ctx,
        "/genres",
        ResponseTemplate::new(200)
            .set_body_json(json!([]))
            .set_delay(Duration::from_millis(150)),
    )
    .await;

    let (books, orders, genres) = tokio::join!(
        ctx.client.get::<Value>("/books"),
        ctx.client.get::<Value>("/orders"),
        ctx.client.get::<Value>("/genres"),
    );

    assert!(books.is_ok());
    assert!(genres.is_ok());
    let err = orders.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.message_or("Session expired"), "Token expired");

    assert!(!ctx.client.session().is_authenticated().unwrap());
    assert_eq!(ctx.navigator.current_path(), "/login");
    assert_eq!(drain(&mut locations), vec!["/login".to_string()]);
    assert_eq!(ctx.client.pending_requests(), 0);
}

#[tokio::test]
async fn test_simultaneous_unauthorized_navigate_once() {
    let ctx = TestContext::new().await;
    ctx.sign_in(UserRole::Admin);
    let mut locations = ctx.navigator.subscribe();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(5)
        .mount(&ctx.server)
        .await;

    let calls = (0..5).map(|i| {
        let client = ctx.client.clone();
        tokio::spawn(async move { client.get::<Value>(&format!("/orders/{i}")).await })
    });
    for call in calls.collect::<Vec<_>>() {
        assert!(call.await.unwrap().unwrap_err().is_unauthorized());
    }

    assert_eq!(drain(&mut locations).len(), 1);
    assert!(ctx.client.is_handling_logout());
}

#[tokio::test]
async fn test_late_unauthorized_within_cooldown_is_ignored() {
    let ctx = TestContext::new().await;
    ctx.sign_in(UserRole::Unspecified);
    let mut locations = ctx.navigator.subscribe();

    let late = || ResponseTemplate::new(401).set_delay(Duration::from_millis(150));
    mount_get(&ctx, "/books", late()).await;
    mount_get(&ctx, "/orders", ResponseTemplate::new(401)).await;
    mount_get(&ctx, "/genres", late()).await;

    // the user signs back in and moves on before the slower calls fail
    let user_returns = async {
        assert_eq!(locations.recv().await.unwrap(), "/login");
        ctx.sign_in(UserRole::Unspecified);
        ctx.navigator.navigate_replacing("/books");
    };
    let (books, orders, genres, ()) = tokio::join!(
        ctx.client.get::<Value>("/books"),
        ctx.client.get::<Value>("/orders"),
        ctx.client.get::<Value>("/genres"),
        user_returns,
    );

    for result in [books, orders, genres] {
        assert!(result.unwrap_err().is_unauthorized());
    }
    assert!(ctx.client.session().is_authenticated().unwrap());
    assert_eq!(ctx.navigator.current_path(), "/books");
    assert!(drain(&mut locations).is_empty());
    assert_eq!(ctx.client.pending_requests(), 0);
}

#[tokio::test]
async fn test_cooldown_rearms_latch() {
    let ctx = TestContext::with_config(|c| c.with_logout_cooldown(Duration::from_millis(100))).await;
    mount_get(&ctx, "/orders", ResponseTemplate::new(401)).await;
    let mut locations = ctx.navigator.subscribe();

    ctx.sign_in(UserRole::Unspecified);
    ctx.client.get::<Value>("/orders").await.unwrap_err();
    assert_eq!(drain(&mut locations).len(), 1);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(!ctx.client.is_handling_logout());

    ctx.sign_in(UserRole::Unspecified);
    ctx.navigator.navigate_replacing("/cart");
    ctx.client.get::<Value>("/orders").await.unwrap_err();

    assert_eq!(drain(&mut locations), vec!["/login".to_string()]);
    assert!(!ctx.client.session().is_authenticated().unwrap());
}

#[tokio::test]
async fn test_unauthorized_on_login_view_clears_without_redirect() {
    let ctx = TestContext::new().await;
    ctx.sign_in(UserRole::Unspecified);
    ctx.navigator.navigate_replacing("/login");
    let mut locations = ctx.navigator.subscribe();
    mount_get(&ctx, "/users", ResponseTemplate::new(401)).await;

    ctx.client.get::<Value>("/users").await.unwrap_err();

    assert!(ctx.client.session().token().unwrap().is_none());
    assert!(drain(&mut locations).is_empty());
}

#[tokio::test]
async fn test_forbidden_is_not_a_logout() {
    let ctx = TestContext::new().await;
    ctx.sign_in(UserRole::Unspecified);
    mount_get(
        &ctx,
        "/users",
        ResponseTemplate::new(403).set_body_json(json!({"error": "Admins only"})),
    )
    .await;

    let err = ctx.client.get::<Value>("/users").await.unwrap_err();

    assert_eq!(err.server_message(), Some("Admins only"));
    assert!(ctx.client.session().is_authenticated().unwrap());
    assert_eq!(ctx.navigator.current_path(), "/orders");
}
