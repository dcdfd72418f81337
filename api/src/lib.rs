pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;

use std::process::ExitCode;
use std::sync::Arc;

use axum::{
    Router,
    handler::Handler,
    http::{Method, header},
    middleware,
    routing::get,
};
use casting_agency_service::sea_orm::{Database, DatabaseConnection};
use migration::{Migrator, MigratorTrait};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use auth::{JwksCache, PermissionGate, TokenVerifier, permissions::*, require_permission};
use config::Config;
use handlers::{actors, health, movies, not_found};

#[derive(Clone)]
pub struct AppState {
    pub conn: DatabaseConnection,
    pub verifier: Arc<TokenVerifier>,
}

/// Builds the HTTP surface. Every route but `/` sits behind a permission gate.
pub fn router(state: AppState) -> Router {
    let verifier = state.verifier.clone();
    let gate = move |permission: &'static str| {
        middleware::from_fn_with_state(
            PermissionGate {
                verifier: verifier.clone(),
                permission,
            },
            require_permission,
        )
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/", get(health))
        .route(
            "/movies",
            get(movies::list.layer(gate(GET_MOVIES))).post(movies::create.layer(gate(POST_MOVIES))),
        )
        .route(
            "/movies/{id}",
            get(movies::show.layer(gate(GET_MOVIE_DETAILS)))
                .patch(movies::update.layer(gate(PATCH_MOVIES)))
                .delete(movies::delete.layer(gate(DELETE_MOVIES))),
        )
        .route(
            "/actors",
            get(actors::list.layer(gate(GET_ACTORS))).post(actors::create.layer(gate(POST_ACTORS))),
        )
        .route(
            "/actors/{id}",
            get(actors::show.layer(gate(GET_ACTOR_DETAILS)))
                .patch(actors::update.layer(gate(PATCH_ACTORS)))
                .delete(actors::delete.layer(gate(DELETE_ACTORS))),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn start() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let conn = Database::connect(&config.database_url).await?;
    Migrator::up(&conn, None).await?;

    let keys = JwksCache::new(config.auth.jwks_url.clone(), config.auth.jwks_refresh)?;
    if let Err(e) = keys.refresh().await {
        warn!(error = %e, "JWKS not reachable at start-up, fetching on first request");
    }
    let verifier = Arc::new(TokenVerifier::new(&config.auth, Arc::new(keys)));

    let app = router(AppState { conn, verifier });

    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    info!(addr = %listener.local_addr()?, issuer = %config.auth.issuer, "Casting agency listening");
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn main() -> ExitCode {
    exit_code(start())
}

fn exit_code(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
