use axum::extract::State;

use crate::{AppState, db::errors::DbError, errors::Error};

/// Liveness check that also proves the database answers
#[tracing::instrument(skip_all)]
pub async fn healthz(State(state): State<AppState>) -> Result<&'static str, Error> {
    sqlx::query("SELECT 1").execute(&state.db).await.map_err(DbError::from)?;
    Ok("ok")
}
