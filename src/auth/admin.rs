use std::sync::Arc;

use axum::{debug_handler, extract::{rejection::JsonRejection, State}, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{users::UserDirectory, AdminKey, AppError, AppResult};

use super::Credentials;

#[derive(Deserialize)]
pub(crate) struct AddUserRequest {
    #[serde(rename = "adminKey")]
    admin_key: Option<String>,
    #[serde(flatten)]
    credentials: Credentials,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn add_user(
    State(users): State<Arc<UserDirectory>>,
    State(AdminKey(admin_key)): State<AdminKey>,
    body: Result<Json<AddUserRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(AddUserRequest { admin_key: given, credentials }) = body?;

    if given.as_deref() != Some(&*admin_key) {
        tracing::warn!("admin request with wrong key");
        return Err(AppError::Forbidden("invalid admin key".to_owned()));
    }

    let (username, password) = credentials.required()?;
    users.create(&username, &password).await?;
    tracing::info!(username = %username, "user added by admin");

    Ok(Json(json!({ "success": true })))
}
