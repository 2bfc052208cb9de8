use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::{Router, routing::get};

use super::handlers;
use super::handlers::probes::{healthz, livez};
use super::state::AppState;
use crate::conf::Settings;
use crate::prelude::Result;

/// Four 10 MiB slots plus the text fields and multipart framing.
const REQUEST_BODY_LIMIT: usize = 48 * 1024 * 1024;

pub fn build_routes(settings: Settings) -> Result<Router> {
    let state = AppState::new(&settings)?;
    let app = Router::new()
        .route("/submit-incoming", post(handlers::registration::submit))
        .route("/healthz", get(healthz))
        .route("/livez", get(livez))
        .layer(DefaultBodyLimit::max(REQUEST_BODY_LIMIT))
        .with_state(state);

    Ok(app)
}
