use sea_orm::DbErr;

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Failure of an Entity Store operation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No record with the given primary key
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// Input rejected before anything was written
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Db(#[from] DbErr),
}

impl ServiceError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn movie_not_found(id: i32) -> Self {
        Self::NotFound { entity: "movie", id }
    }

    pub(crate) fn actor_not_found(id: i32) -> Self {
        Self::NotFound { entity: "actor", id }
    }
}
