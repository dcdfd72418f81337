use ::entity::{actor, actor::Entity as Actor, movie, movie::Entity as Movie, movie_actor};
use sea_orm::*;
use tracing::debug;

use crate::error::{Result, ServiceError};
use crate::input::{ActorChanges, MovieChanges, NewActor, NewMovie};
use crate::query::{ActorWithMovies, MovieWithCast, Query};

/// Transactional writes.
///
/// Each operation opens its own transaction and commits only after every
/// step succeeded; an early return drops the transaction, which rolls it back.
pub struct Mutation;

impl Mutation {
    pub async fn create_actor(db: &DbConn, form_data: NewActor) -> Result<actor::Model> {
        let fields = form_data.validate()?;

        let actor = actor::ActiveModel {
            name: Set(fields.name),
            age: Set(fields.age),
            gender: Set(fields.gender.as_str().to_owned()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        debug!(actor_id = actor.id, "inserted actor");
        Ok(actor)
    }

    pub async fn update_actor_by_id(
        db: &DbConn,
        id: i32,
        form_data: ActorChanges,
    ) -> Result<ActorWithMovies> {
        let txn = db.begin().await?;

        let actor = Actor::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::actor_not_found(id))?;
        let patch = form_data.validate()?;

        let mut active: actor::ActiveModel = actor.clone().into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(age) = patch.age {
            active.age = Set(age);
        }
        if let Some(gender) = patch.gender {
            active.gender = Set(gender.as_str().to_owned());
        }
        let actor = if active.is_changed() {
            active.update(&txn).await?
        } else {
            actor
        };

        let movies = Query::movies_of(&txn, &actor).await?;
        txn.commit().await?;

        Ok(ActorWithMovies { actor, movies })
    }

    /// Removes the actor and every cast link naming them.
    pub async fn delete_actor(db: &DbConn, id: i32) -> Result<()> {
        let txn = db.begin().await?;

        let actor = Actor::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::actor_not_found(id))?;

        let unlinked = movie_actor::Entity::delete_many()
            .filter(movie_actor::Column::ActorId.eq(actor.id))
            .exec(&txn)
            .await?;
        actor.delete(&txn).await?;
        txn.commit().await?;

        debug!(actor_id = id, links = unlinked.rows_affected, "deleted actor");
        Ok(())
    }

    /// Inserts a movie and links its cast, all or nothing.
    pub async fn create_movie(db: &DbConn, form_data: NewMovie) -> Result<MovieWithCast> {
        let fields = form_data.validate()?;
        let txn = db.begin().await?;

        let mut cast = Query::resolve_actors_by_names(&txn, &fields.cast).await?;
        let movie = movie::ActiveModel {
            title: Set(fields.title),
            release_date: Set(fields.release_date),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        Self::link_cast(&txn, movie.id, &cast).await?;
        txn.commit().await?;

        debug!(movie_id = movie.id, cast = cast.len(), "inserted movie");
        cast.sort_by_key(|a| a.id);
        Ok(MovieWithCast { movie, cast })
    }

    /// Applies the supplied fields only; a supplied cast replaces the old one.
    pub async fn update_movie_by_id(
        db: &DbConn,
        id: i32,
        form_data: MovieChanges,
    ) -> Result<MovieWithCast> {
        let txn = db.begin().await?;

        let movie = Movie::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::movie_not_found(id))?;
        let patch = form_data.validate()?;

        if let Some(names) = &patch.cast {
            let cast = Query::resolve_actors_by_names(&txn, names).await?;
            movie_actor::Entity::delete_many()
                .filter(movie_actor::Column::MovieId.eq(movie.id))
                .exec(&txn)
                .await?;
            Self::link_cast(&txn, movie.id, &cast).await?;
        }

        let mut active: movie::ActiveModel = movie.clone().into();
        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        if let Some(release_date) = patch.release_date {
            active.release_date = Set(release_date);
        }
        let movie = if active.is_changed() {
            active.update(&txn).await?
        } else {
            movie
        };

        let cast = Query::cast_of(&txn, &movie).await?;
        txn.commit().await?;

        Ok(MovieWithCast { movie, cast })
    }

    /// Removes the movie and its cast links; the actors themselves remain.
    pub async fn delete_movie(db: &DbConn, id: i32) -> Result<()> {
        let txn = db.begin().await?;

        let movie = Movie::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::movie_not_found(id))?;

        let unlinked = movie_actor::Entity::delete_many()
            .filter(movie_actor::Column::MovieId.eq(movie.id))
            .exec(&txn)
            .await?;
        movie.delete(&txn).await?;
        txn.commit().await?;

        debug!(movie_id = id, links = unlinked.rows_affected, "deleted movie");
        Ok(())
    }

    async fn link_cast<C>(db: &C, movie_id: i32, cast: &[actor::Model]) -> Result<()>
    where
        C: ConnectionTrait,
    {
        if cast.is_empty() {
            return Ok(());
        }

        movie_actor::Entity::insert_many(cast.iter().map(|actor| movie_actor::ActiveModel {
            movie_id: Set(movie_id),
            actor_id: Set(actor.id),
        }))
        .exec_without_returning(db)
        .await?;

        Ok(())
    }
}
