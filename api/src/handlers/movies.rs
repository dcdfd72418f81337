use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use casting_agency_service::{
    MovieChanges, Mutation as MutationCore, NewMovie, Query as QueryCore,
};
use serde_json::{Value, json};
use tracing::info;

use super::MovieView;
use crate::{AppState, auth::Claims, error::ApiError};

pub async fn list(state: State<AppState>) -> Result<Json<Value>, ApiError> {
    let movies: Vec<MovieView> = QueryCore::list_movies(&state.conn)
        .await?
        .into_iter()
        .map(MovieView::from)
        .collect();

    Ok(Json(json!({ "success": true, "movies": movies })))
}

pub async fn show(
    state: State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let movie = QueryCore::find_movie_by_id(&state.conn, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(
        json!({ "success": true, "movie": MovieView::from(movie) }),
    ))
}

pub async fn create(
    state: State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<NewMovie>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(form) = body?;
    let created = MutationCore::create_movie(&state.conn, form).await?;

    info!(
        movie_id = created.movie.id,
        sub = ?claims.sub,
        cast = created.cast.len(),
        "Movie created"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "movie_id": created.movie.id })),
    ))
}

pub async fn update(
    state: State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<MovieChanges>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let changes = match body {
        Ok(Json(changes)) => changes,
        // an unknown id outranks a bad body
        Err(rejection) => {
            QueryCore::find_movie_by_id(&state.conn, id)
                .await?
                .ok_or(ApiError::NotFound)?;
            return Err(rejection.into());
        }
    };
    let movie = MutationCore::update_movie_by_id(&state.conn, id, changes).await?;

    Ok(Json(
        json!({ "success": true, "movie": MovieView::from(movie) }),
    ))
}

pub async fn delete(
    state: State<AppState>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    MutationCore::delete_movie(&state.conn, id).await?;

    info!(movie_id = id, sub = ?claims.sub, "Movie deleted");

    Ok(Json(json!({ "success": true, "movie_id": id })))
}
