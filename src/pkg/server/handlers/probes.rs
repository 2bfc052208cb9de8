//! Liveness and readiness probes for the registration service.

use axum::extract::State;
use sqlx::query;

use crate::{pkg::server::state::AppState, prelude::Result};

pub async fn livez() -> Result<()> {
    tracing::debug!("registration service is live");
    Ok(())
}

/// Readiness means the registration database answers; a failed
/// round-trip surfaces as a 500 and takes the pod out of rotation.
pub async fn healthz(State(state): State<AppState>) -> Result<()> {
    query("select 1").execute(&*state.db_pool).await?;
    tracing::debug!("registration database reachable");
    Ok(())
}
