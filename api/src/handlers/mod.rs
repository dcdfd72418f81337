//! Request handlers. Permission checks happen in the gate layered in front
//! of each handler, never here.

pub mod actors;
pub mod movies;

use axum::Json;
use casting_agency_service::{ActorWithMovies, MovieWithCast};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::ApiError;

pub async fn health() -> Json<Value> {
    Json(json!({ "success": true }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// A movie as clients see it: the cast is listed by name.
#[derive(Debug, Serialize)]
pub struct MovieView {
    pub id: i32,
    pub title: String,
    pub release_date: String,
    pub cast: Vec<String>,
}

impl From<MovieWithCast> for MovieView {
    fn from(MovieWithCast { movie, cast }: MovieWithCast) -> Self {
        Self {
            id: movie.id,
            title: movie.title,
            release_date: movie.release_date.to_string(),
            cast: cast.into_iter().map(|actor| actor.name).collect(),
        }
    }
}

/// An actor as clients see it: movies are listed by title.
#[derive(Debug, Serialize)]
pub struct ActorView {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub movies: Vec<String>,
}

impl From<ActorWithMovies> for ActorView {
    fn from(ActorWithMovies { actor, movies }: ActorWithMovies) -> Self {
        Self {
            id: actor.id,
            name: actor.name,
            age: actor.age,
            gender: actor.gender,
            movies: movies.into_iter().map(|movie| movie.title).collect(),
        }
    }
}
