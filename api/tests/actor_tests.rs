mod common;

use axum::http::{Method, StatusCode};
use common::*;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

async fn get_actor(app: &axum::Router, id: i64) -> (StatusCode, Value) {
    send(
        app,
        Method::GET,
        &format!("/actors/{id}"),
        Some(&token(ASSISTANT)),
        None,
    )
    .await
}

#[tokio::test]
async fn created_actor_reads_back() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/actors",
        Some(&token(DIRECTOR)),
        Some(json!({ "name": "Emma Stone", "age": 32, "gender": "female" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let id = body["actor_id"].as_i64().unwrap();

    let (status, body) = get_actor(&app, id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "actor": {
                "id": id,
                "name": "Emma Stone",
                "age": 32,
                "gender": "female",
                "movies": [],
            }
        })
    );
}

#[tokio::test]
async fn gender_is_stored_lowercased() {
    let app = test_app().await;
    let id = create_actor(&app, "Mark Strong", 58, "M").await;

    let (_, body) = get_actor(&app, id).await;
    assert_eq!(body["actor"]["gender"], "m");
}

#[tokio::test]
async fn invalid_actors_are_rejected() {
    let app = test_app().await;

    for body in [
        json!({ "age": 32, "gender": "female" }),
        json!({ "name": "", "age": 32, "gender": "female" }),
        json!({ "name": "Emma Stone", "gender": "female" }),
        json!({ "name": "Emma Stone", "age": 0, "gender": "female" }),
        json!({ "name": "Emma Stone", "age": -4, "gender": "female" }),
        json!({ "name": "Emma Stone", "age": "32", "gender": "female" }),
        json!({ "name": "Emma Stone", "age": 32 }),
        json!({ "name": "Emma Stone", "age": 32, "gender": "X" }),
    ] {
        let (status, response) = send(
            &app,
            Method::POST,
            "/actors",
            Some(&token(PRODUCER)),
            Some(body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        assert_eq!(response["error"], 422);
    }

    let (_, body) = send(&app, Method::GET, "/actors", Some(&token(ASSISTANT)), None).await;
    assert_eq!(body["actors"], json!([]));
}

#[tokio::test]
async fn unknown_gender_patch_is_rejected() {
    let app = test_app().await;
    let id = create_actor(&app, "Emma Stone", 32, "female").await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/actors/{id}"),
        Some(&token(DIRECTOR)),
        Some(json!({ "gender": "X" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);

    let (_, body) = get_actor(&app, id).await;
    assert_eq!(body["actor"]["gender"], "female");
}

#[tokio::test]
async fn partial_patch_changes_only_supplied_fields() {
    let app = test_app().await;
    let id = create_actor(&app, "Emma Stone", 32, "female").await;
    create_movie(&app, "Cruella", "2021-05-22", &["Emma Stone"]).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/actors/{id}"),
        Some(&token(DIRECTOR)),
        Some(json!({ "age": 35 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["actor"],
        json!({
            "id": id,
            "name": "Emma Stone",
            "age": 35,
            "gender": "female",
            "movies": ["Cruella"],
        })
    );

    for patch in [json!({}), json!({ "name": " " }), json!({ "age": 0 })] {
        let (status, _) = send(
            &app,
            Method::PATCH,
            &format!("/actors/{id}"),
            Some(&token(DIRECTOR)),
            Some(patch.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{patch}");
    }
}

#[tokio::test]
async fn renamed_actor_is_cast_under_new_name() {
    let app = test_app().await;
    let id = create_actor(&app, "Emma Stone", 32, "female").await;
    let movie = create_movie(&app, "Cruella", "2021-05-22", &["Emma Stone"]).await;

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/actors/{id}"),
        Some(&token(DIRECTOR)),
        Some(json!({ "name": "Emily Stone" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/movies/{movie}"),
        Some(&token(ASSISTANT)),
        None,
    )
    .await;
    assert_eq!(body["movie"]["cast"], json!(["Emily Stone"]));

    let (status, _) = send(
        &app,
        Method::POST,
        "/movies",
        Some(&token(PRODUCER)),
        Some(json!({ "title": "Easy A", "release_date": "2010-09-17", "cast": ["Emma Stone"] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn shared_names_cannot_be_cast() {
    let app = test_app().await;
    create_actor(&app, "Chris Evans", 42, "male").await;
    create_actor(&app, "Chris Evans", 51, "male").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/movies",
        Some(&token(PRODUCER)),
        Some(json!({ "title": "Knives Out", "release_date": "2019-11-27", "cast": ["Chris Evans"] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn delete_removes_actor_from_casts() {
    let app = test_app().await;
    let emma = create_actor(&app, "Emma Stone", 32, "female").await;
    create_actor(&app, "Ryan Gosling", 43, "male").await;
    let movie = create_movie(&app, "La La Land", "2016-12-09", &["Emma Stone", "Ryan Gosling"]).await;

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/actors/{emma}"),
        Some(&token(PRODUCER)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "actor_id": emma }));

    let (status, _) = get_actor(&app, emma).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/movies/{movie}"),
        Some(&token(ASSISTANT)),
        None,
    )
    .await;
    assert_eq!(body["movie"]["cast"], json!(["Ryan Gosling"]));

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/actors/{emma}"),
        Some(&token(PRODUCER)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = test_app().await;
    let producer = token(PRODUCER);

    for (method, uri, body) in [
        (Method::GET, "/actors/7", None),
        (Method::PATCH, "/actors/7", Some(json!({ "age": 40 }))),
        (Method::PATCH, "/actors/7", Some(json!({ "gender": "X" }))),
        (Method::DELETE, "/actors/7", None),
        (Method::GET, "/actors/emma", None),
        (Method::PATCH, "/actors/1.5", Some(json!({ "age": 40 }))),
    ] {
        let (status, response) = send(&app, method.clone(), uri, Some(&producer), body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(response["message"], "Resource not found");
    }
}
