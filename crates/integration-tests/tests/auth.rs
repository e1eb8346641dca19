//! Registration, login and token handling over HTTP.

#![allow(clippy::unwrap_used)]

use enzi_integration_tests::{TestContext, test_config};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn register_login_and_me() {
    let ctx = TestContext::spawn().await.unwrap();

    let registered = ctx
        .post(
            "/api/auth/register",
            None,
            &json!({ "email": "New.Barista@Enzi.Coffee", "password": "hunter22", "name": "  Ada  " }),
        )
        .await
        .unwrap();
    assert_eq!(registered.status, StatusCode::CREATED);
    assert_eq!(registered.body["data"]["user"]["email"], "new.barista@enzi.coffee");
    assert_eq!(registered.body["data"]["user"]["name"], "Ada");
    assert!(registered.body["data"]["user"].get("passwordHash").is_none());

    let login = ctx
        .post(
            "/api/auth/login",
            None,
            &json!({ "email": "new.barista@enzi.coffee", "password": "hunter22" }),
        )
        .await
        .unwrap();
    assert_eq!(login.status, StatusCode::OK);
    let token = login.body["data"]["token"].as_str().unwrap();

    let me = ctx.get("/api/auth/me", Some(token)).await.unwrap();
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["user"]["id"], registered.body["data"]["user"]["id"]);
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let ctx = TestContext::spawn().await.unwrap();
    ctx.register("barista@enzi.coffee").await.unwrap().unwrap();

    let wrong_password = ctx
        .post(
            "/api/auth/login",
            None,
            &json!({ "email": "barista@enzi.coffee", "password": "nope-nope" }),
        )
        .await
        .unwrap();
    let unknown = ctx
        .post(
            "/api/auth/login",
            None,
            &json!({ "email": "ghost@enzi.coffee", "password": "hunter22" }),
        )
        .await
        .unwrap();

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown.body);
    assert_eq!(unknown.body["error"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let ctx = TestContext::spawn().await.unwrap();
    assert!(ctx.register("barista@enzi.coffee").await.unwrap().is_some());

    let again = ctx
        .post(
            "/api/auth/register",
            None,
            &json!({ "email": "BARISTA@enzi.coffee", "password": "hunter22", "name": "Dup" }),
        )
        .await
        .unwrap();
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.body["error"], "EMAIL_EXISTS");
}

#[tokio::test]
async fn logout_is_acknowledged() {
    let ctx = TestContext::spawn().await.unwrap();

    let reply = ctx.post("/api/auth/logout", None, &json!({})).await.unwrap();
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["success"], true);
}

#[tokio::test]
async fn auth_endpoints_are_rate_limited() {
    let mut config = test_config();
    config.auth_rate_limit = true;
    let ctx = TestContext::spawn_with(config).await.unwrap();

    let body = json!({ "email": "ghost@enzi.coffee", "password": "hunter22" });
    let mut limited = None;
    for _ in 0..10 {
        let reply = ctx.post("/api/auth/login", None, &body).await.unwrap();
        if reply.status == StatusCode::TOO_MANY_REQUESTS {
            limited = Some(reply);
            break;
        }
    }

    let limited = limited.unwrap();
    assert_eq!(limited.body["error"], "RATE_LIMITED");

    let menu = ctx.get("/api/menu", None).await.unwrap();
    assert_eq!(menu.status, StatusCode::OK);
}

#[tokio::test]
async fn rotating_forwarded_for_does_not_evade_rate_limit() {
    let mut config = test_config();
    config.auth_rate_limit = true;
    let ctx = TestContext::spawn_with(config).await.unwrap();

    let body = json!({ "email": "ghost@enzi.coffee", "password": "hunter22" });
    let mut statuses = Vec::new();
    for n in 0..10u8 {
        let response = ctx
            .client
            .post(ctx.url("/api/auth/login"))
            .header("x-forwarded-for", format!("203.0.113.{n}"))
            .json(&body)
            .send()
            .await
            .unwrap();
        statuses.push(response.status());
    }

    assert!(
        statuses.contains(&StatusCode::TOO_MANY_REQUESTS),
        "{statuses:?}"
    );
}
