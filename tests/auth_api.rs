mod common;

use common::{TestServer, ADMIN_EMAIL};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn login(server: &TestServer, email: &str, password: &str) -> reqwest::Response {
    server
        .client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap()
}

async fn profile(server: &TestServer, token: &str) -> reqwest::Response {
    server
        .client
        .get(server.url("/api/auth/me"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn register_returns_token_for_normalized_email() {
    let server = TestServer::spawn().await;

    let res = server.register("  Rookie@Example.COM ", "rookie", "secret1").await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["email"], "rookie@example.com");
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let server = TestServer::spawn().await;
    server.token_for("twice@example.com", "first").await;

    let res = server.register("TWICE@example.com", "second", "secret1").await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Email already in use");
}

#[tokio::test]
async fn usernames_are_unique_ignoring_case() {
    let server = TestServer::spawn().await;
    server.token_for("a@example.com", "Ghost").await;

    let res = server.register("b@example.com", "ghost", "secret1").await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Username already taken");
}

#[tokio::test]
async fn register_validates_input() {
    let server = TestServer::spawn().await;

    let short = server.register("short@example.com", "shorty", "12345").await;
    assert_eq!(short.status(), StatusCode::BAD_REQUEST);

    let bad_email = server.register("not-an-email", "nobody", "secret1").await;
    assert_eq!(bad_email.status(), StatusCode::BAD_REQUEST);

    let no_username = server.register("anon@example.com", "  ", "secret1").await;
    assert_eq!(no_username.status(), StatusCode::BAD_REQUEST);

    let missing_fields = server
        .client
        .post(server.url("/api/auth/register"))
        .json(&json!({ "email": "x@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_fields.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_checks_password() {
    let server = TestServer::spawn().await;
    server.token_for("sniper@example.com", "sniper").await;

    let wrong = login(&server, "sniper@example.com", "wrong-pass").await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let body: Value = wrong.json().await.unwrap();
    assert_eq!(body["error"], "Invalid email or password");

    let unknown = login(&server, "nobody@example.com", "hunter22").await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

    let blank = login(&server, "", "").await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let ok = login(&server, "Sniper@Example.com", "hunter22").await;
    assert_eq!(ok.status(), StatusCode::OK);
    let body: Value = ok.json().await.unwrap();
    let token = body["token"].as_str().unwrap();

    let me = profile(&server, token).await;
    assert_eq!(me.status(), StatusCode::OK);
    let body: Value = me.json().await.unwrap();
    assert_eq!(body["email"], "sniper@example.com");
    assert_eq!(body["username"], "sniper");
    assert_eq!(body["airsoft_club"], "No Club/Freelancer");
    assert_eq!(body["is_admin"], false);
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn me_requires_a_valid_token() {
    let server = TestServer::spawn().await;

    let missing = server
        .client
        .get(server.url("/api/auth/me"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["error"], "Missing bearer token");

    let garbage = profile(&server, "not.a.jwt").await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);

    let wrong_scheme = server
        .client
        .get(server.url("/api/auth/me"))
        .header("authorization", "Basic Zm9vOmJhcg==")
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_scheme.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn configured_admin_registers_as_admin() {
    let server = TestServer::spawn().await;
    let token = server.token_for(ADMIN_EMAIL, "boss").await;

    let body: Value = profile(&server, &token).await.json().await.unwrap();

    assert_eq!(body["is_admin"], true);
}

#[tokio::test]
async fn profile_update_changes_username_and_club() {
    let server = TestServer::spawn().await;
    let token = server.token_for("medic@example.com", "medic").await;
    server.token_for("taken@example.com", "Taken").await;

    let res = server
        .client
        .put(server.url("/api/auth/me"))
        .bearer_auth(&token)
        .json(&json!({ "username": "field-medic", "airsoftClub": "Red Wolves" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["username"], "field-medic");
    assert_eq!(body["airsoft_club"], "Red Wolves");

    // Keeping your own name is not a conflict.
    let same = server
        .client
        .put(server.url("/api/auth/me"))
        .bearer_auth(&token)
        .json(&json!({ "username": "Field-Medic" }))
        .send()
        .await
        .unwrap();
    assert_eq!(same.status(), StatusCode::OK);
    let body: Value = same.json().await.unwrap();
    assert_eq!(body["airsoft_club"], "No Club/Freelancer");

    let clash = server
        .client
        .put(server.url("/api/auth/me"))
        .bearer_auth(&token)
        .json(&json!({ "username": "taken" }))
        .send()
        .await
        .unwrap();
    assert_eq!(clash.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn saved_events_round_trip() {
    let server = TestServer::spawn().await;
    let token = server.token_for("scout@example.com", "scout").await;
    let (_, body) = server
        .create_event(json!({ "name": "Recon", "date": "2024-06-01" }))
        .await;
    let id = body["id"].as_i64().unwrap();
    let save_url = server.url(&format!("/api/events/{id}/save"));

    for _ in 0..2 {
        let res = server
            .client
            .post(&save_url)
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    let saved: Value = server
        .client
        .get(server.url("/api/saved-events"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let saved = saved.as_array().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0]["name"], "Recon");

    let res = server
        .client
        .delete(&save_url)
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let saved: Value = server
        .client
        .get(server.url("/api/saved-events"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(saved.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn saving_requires_auth_and_an_existing_event() {
    let server = TestServer::spawn().await;
    let token = server.token_for("grunt@example.com", "grunt").await;

    let anonymous = server
        .client
        .post(server.url("/api/events/1/save"))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let missing = server
        .client
        .post(server.url("/api/events/777/save"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_an_event_drops_it_from_saved_lists() {
    let server = TestServer::spawn().await;
    let token = server.token_for("ops@example.com", "ops").await;
    let (_, body) = server.create_event(json!({ "name": "Doomed op" })).await;
    let id = body["id"].as_i64().unwrap();

    server
        .client
        .post(server.url(&format!("/api/events/{id}/save")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    server
        .client
        .delete(server.url(&format!("/api/events/{id}")))
        .send()
        .await
        .unwrap();

    let saved: Value = server
        .client
        .get(server.url("/api/saved-events"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(saved.as_array().unwrap().is_empty());
}
