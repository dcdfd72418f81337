use std::collections::{HashMap, HashSet};

use ::entity::{actor, actor::Entity as Actor, movie, movie::Entity as Movie, movie_actor};
use sea_orm::*;

use crate::error::{Result, ServiceError};

/// A movie together with the actors cast in it, ordered by actor id.
#[derive(Clone, Debug, PartialEq)]
pub struct MovieWithCast {
    pub movie: movie::Model,
    pub cast: Vec<actor::Model>,
}

/// An actor together with the movies they appear in, ordered by movie id.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorWithMovies {
    pub actor: actor::Model,
    pub movies: Vec<movie::Model>,
}

pub struct Query;

impl Query {
    pub async fn list_movies(db: &DbConn) -> Result<Vec<MovieWithCast>> {
        let movies = Movie::find()
            .order_by_asc(movie::Column::Id)
            .all(db)
            .await?;
        let casts = movies
            .load_many_to_many(Actor, movie_actor::Entity, db)
            .await?;

        Ok(movies
            .into_iter()
            .zip(casts)
            .map(|(movie, mut cast)| {
                cast.sort_by_key(|a| a.id);
                MovieWithCast { movie, cast }
            })
            .collect())
    }

    pub async fn find_movie_by_id<C>(db: &C, id: i32) -> Result<Option<MovieWithCast>>
    where
        C: ConnectionTrait,
    {
        let Some(movie) = Movie::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        let cast = Self::cast_of(db, &movie).await?;

        Ok(Some(MovieWithCast { movie, cast }))
    }

    pub async fn list_actors(db: &DbConn) -> Result<Vec<ActorWithMovies>> {
        let actors = Actor::find()
            .order_by_asc(actor::Column::Id)
            .all(db)
            .await?;
        let movies = actors
            .load_many_to_many(Movie, movie_actor::Entity, db)
            .await?;

        Ok(actors
            .into_iter()
            .zip(movies)
            .map(|(actor, mut movies)| {
                movies.sort_by_key(|m| m.id);
                ActorWithMovies { actor, movies }
            })
            .collect())
    }

    pub async fn find_actor_by_id<C>(db: &C, id: i32) -> Result<Option<ActorWithMovies>>
    where
        C: ConnectionTrait,
    {
        let Some(actor) = Actor::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        let movies = Self::movies_of(db, &actor).await?;

        Ok(Some(ActorWithMovies { actor, movies }))
    }

    /// Resolves every name to exactly one actor, or fails without resolving any.
    ///
    /// Matching is exact and case-sensitive. A name that matches no actor, a
    /// name shared by several actors, and a name listed twice are all rejected.
    /// The returned actors follow the order of `names`.
    pub async fn resolve_actors_by_names<C>(db: &C, names: &[String]) -> Result<Vec<actor::Model>>
    where
        C: ConnectionTrait,
    {
        let mut seen = HashSet::with_capacity(names.len());
        if let Some(dup) = names.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(ServiceError::validation(format!(
                "cast lists {dup:?} more than once"
            )));
        }

        let candidates = Actor::find()
            .filter(actor::Column::Name.is_in(names.iter().cloned()))
            .order_by_asc(actor::Column::Id)
            .all(db)
            .await?;

        // Some backends compare case-insensitively; keep only exact matches.
        let mut by_name: HashMap<&str, Vec<&actor::Model>> = HashMap::new();
        for candidate in &candidates {
            by_name
                .entry(candidate.name.as_str())
                .or_default()
                .push(candidate);
        }

        names
            .iter()
            .map(|name| match by_name.get(name.as_str()).map(Vec::as_slice) {
                Some([actor]) => Ok((*actor).clone()),
                Some(matches) if matches.len() > 1 => Err(ServiceError::validation(format!(
                    "cast member {name:?} matches {} actors",
                    matches.len()
                ))),
                _ => Err(ServiceError::validation(format!(
                    "cast member {name:?} is not a known actor"
                ))),
            })
            .collect()
    }

    pub(crate) async fn cast_of<C>(db: &C, movie: &movie::Model) -> Result<Vec<actor::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(movie
            .find_related(Actor)
            .order_by_asc(actor::Column::Id)
            .all(db)
            .await?)
    }

    pub(crate) async fn movies_of<C>(db: &C, actor: &actor::Model) -> Result<Vec<movie::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(actor
            .find_related(Movie)
            .order_by_asc(movie::Column::Id)
            .all(db)
            .await?)
    }
}
