use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::TokenVerifier;
use crate::error::ApiError;

/// Permission strings granted by the identity provider.
pub mod permissions {
    pub const GET_MOVIES: &str = "get:movies";
    pub const GET_MOVIE_DETAILS: &str = "get:movies-details";
    pub const POST_MOVIES: &str = "post:movies";
    pub const PATCH_MOVIES: &str = "patch:movies";
    pub const DELETE_MOVIES: &str = "delete:movies";

    pub const GET_ACTORS: &str = "get:actors";
    pub const GET_ACTOR_DETAILS: &str = "get:actors-details";
    pub const POST_ACTORS: &str = "post:actors";
    pub const PATCH_ACTORS: &str = "patch:actors";
    pub const DELETE_ACTORS: &str = "delete:actors";
}

/// State of one gated route: who verifies, and what must be granted.
#[derive(Clone)]
pub struct PermissionGate {
    pub verifier: Arc<TokenVerifier>,
    pub permission: &'static str,
}

/// Lets the request through only if it carries a valid token granting the
/// gate's permission. The verified [`Claims`](super::Claims) are left in the
/// request extensions.
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let verified = {
        let headers = req.headers();
        gate.verifier.verify_headers(headers)
    };
    let claims = verified.await?;
    claims.require(gate.permission)?;

    debug!(sub = ?claims.sub, permission = gate.permission, "Permission granted");

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
