use std::sync::Arc;

use axum::{debug_handler, extract::{rejection::JsonRejection, State}, Json};
use serde_json::{json, Value};

use crate::{users::UserDirectory, AppResult};

use super::Credentials;

#[debug_handler(state = crate::AppState)]
pub(crate) async fn register(
    State(users): State<Arc<UserDirectory>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(credentials) = body?;
    let (username, password) = credentials.required()?;

    users.create(&username, &password).await?;

    Ok(Json(json!({ "success": true })))
}
