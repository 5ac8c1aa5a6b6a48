use std::sync::Arc;

use axum::{debug_handler, extract::{rejection::JsonRejection, State}, Json};
use serde_json::{json, Value};
use tower_sessions::Session;

use crate::{session::USERNAME, users::UserDirectory, AppResult};

use super::Credentials;

#[debug_handler(state = crate::AppState)]
pub(crate) async fn login(
    State(users): State<Arc<UserDirectory>>,
    session: Session,
    body: Result<Json<Credentials>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(credentials) = body?;
    let (username, password) = credentials.required()?;

    if let Err(e) = users.verify(&username, &password).await {
        tracing::info!(username = %username, reason = %e, "login rejected");
        return Err(e.into());
    }

    session.insert(USERNAME, &username).await?;
    tracing::info!(username = %username, "logged in");

    Ok(Json(json!({ "success": true })))
}
