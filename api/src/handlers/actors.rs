use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use casting_agency_service::{
    ActorChanges, Mutation as MutationCore, NewActor, Query as QueryCore,
};
use serde_json::{Value, json};
use tracing::info;

use super::ActorView;
use crate::{AppState, auth::Claims, error::ApiError};

pub async fn list(state: State<AppState>) -> Result<Json<Value>, ApiError> {
    let actors: Vec<ActorView> = QueryCore::list_actors(&state.conn)
        .await?
        .into_iter()
        .map(ActorView::from)
        .collect();

    Ok(Json(json!({ "success": true, "actors": actors })))
}

pub async fn show(
    state: State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let actor = QueryCore::find_actor_by_id(&state.conn, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(
        json!({ "success": true, "actor": ActorView::from(actor) }),
    ))
}

pub async fn create(
    state: State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<NewActor>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(form) = body?;
    let actor = MutationCore::create_actor(&state.conn, form).await?;

    info!(actor_id = actor.id, sub = ?claims.sub, "Actor created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "actor_id": actor.id })),
    ))
}

pub async fn update(
    state: State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<ActorChanges>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let changes = match body {
        Ok(Json(changes)) => changes,
        // an unknown id outranks a bad body
        Err(rejection) => {
            QueryCore::find_actor_by_id(&state.conn, id)
                .await?
                .ok_or(ApiError::NotFound)?;
            return Err(rejection.into());
        }
    };
    let actor = MutationCore::update_actor_by_id(&state.conn, id, changes).await?;

    Ok(Json(
        json!({ "success": true, "actor": ActorView::from(actor) }),
    ))
}

pub async fn delete(
    state: State<AppState>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    MutationCore::delete_actor(&state.conn, id).await?;

    info!(actor_id = id, sub = ?claims.sub, "Actor deleted");

    Ok(Json(json!({ "success": true, "actor_id": id })))
}
