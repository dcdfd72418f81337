#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use casting_agency_api::{
    AppState,
    auth::{StaticKeys, TokenVerifier},
    config::AuthSettings,
    router,
};
use casting_agency_service::sea_orm::{Database, DatabaseConnection};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use migration::{Migrator, MigratorTrait};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const SIGNING_KEY: &[u8] = include_bytes!("../fixtures/signing_key.pem");
pub const ROGUE_KEY: &[u8] = include_bytes!("../fixtures/rogue_key.pem");
pub const JWKS: &str = include_str!("../fixtures/jwks.json");

pub const KID: &str = "casting-test-key";
pub const ISSUER: &str = "https://casting.test/";
pub const AUDIENCE: &str = "casting";

pub const ASSISTANT: &[&str] = &[
    "get:movies",
    "get:movies-details",
    "get:actors",
    "get:actors-details",
];

pub const DIRECTOR: &[&str] = &[
    "get:movies",
    "get:movies-details",
    "get:actors",
    "get:actors-details",
    "post:actors",
    "patch:actors",
    "post:movies",
    "patch:movies",
];

pub const PRODUCER: &[&str] = &[
    "get:movies",
    "get:movies-details",
    "post:movies",
    "patch:movies",
    "delete:movies",
    "get:actors",
    "get:actors-details",
    "post:actors",
    "patch:actors",
    "delete:actors",
];

pub fn settings() -> AuthSettings {
    AuthSettings {
        issuer: ISSUER.to_string(),
        audience: AUDIENCE.to_string(),
        jwks_url: format!("{ISSUER}.well-known/jwks.json"),
        algorithms: vec![Algorithm::RS256],
        jwks_refresh: Duration::from_secs(3600),
    }
}

pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Claims of a valid token granting `permissions`.
pub fn claims(permissions: &[&str]) -> Value {
    json!({
        "sub": "auth0|casting-test",
        "iss": ISSUER,
        "aud": [AUDIENCE, "https://casting.test/userinfo"],
        "iat": now(),
        "exp": now() + 3600,
        "permissions": permissions,
    })
}

pub fn sign_with(pem: &[u8], kid: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    encode(&header, claims, &EncodingKey::from_rsa_pem(pem).unwrap()).unwrap()
}

pub fn sign(claims: &Value) -> String {
    sign_with(SIGNING_KEY, KID, claims)
}

pub fn token(permissions: &[&str]) -> String {
    sign(&claims(permissions))
}

/// The full router over a fresh in-memory database.
pub async fn test_app() -> Router {
    let conn = test_db().await;
    let keys = StaticKeys::from_jwks_json(JWKS).unwrap();
    let verifier = Arc::new(TokenVerifier::new(&settings(), Arc::new(keys)));

    router(AppState { conn, verifier })
}

pub async fn test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

pub async fn create_actor(app: &Router, name: &str, age: i32, gender: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/actors",
        Some(&token(PRODUCER)),
        Some(json!({ "name": name, "age": age, "gender": gender })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["actor_id"].as_i64().unwrap()
}

pub async fn create_movie(app: &Router, title: &str, release_date: &str, cast: &[&str]) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/movies",
        Some(&token(PRODUCER)),
        Some(json!({ "title": title, "release_date": release_date, "cast": cast })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["movie_id"].as_i64().unwrap()
}
